use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use clap::Parser;
use probe_hash::HashTable;
use probe_hash::hash_table::Entry;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "capacity", default_value_t = 1000)]
    capacity: usize,

    /// Percentage of slots kept live during churn
    #[arg(short = 'l', long = "load", default_value_t = 50)]
    load_percent: usize,

    /// Number of insert/remove pairs run after the initial fill
    #[arg(short = 'r', long = "rounds", default_value_t = 10_000)]
    rounds: u64,
}

fn hash_u64(value: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn insert(table: &mut HashTable<u64>, value: u64) {
    match table.entry(hash_u64(value), |&v| v == value) {
        Entry::Vacant(entry) => {
            entry.insert(value);
        }
        Entry::Occupied(_) => panic!("value already exists in table: {value}"),
    }
}

fn main() {
    let args = Args::parse();
    let capacity = args.capacity.max(2);
    let live = (capacity * args.load_percent / 100).clamp(1, capacity - 1);

    println!("Creating HashTable with capacity: {capacity}");
    let mut table: HashTable<u64> = HashTable::with_capacity(capacity);

    println!("Filling table with {live} values...");
    for value in 0..live as u64 {
        insert(&mut table, value);
    }
    table.print_probe_histogram(|&v| hash_u64(v));
    table.debug_stats(|&v| hash_u64(v)).print();

    println!("Running {} insert/remove rounds...", args.rounds);
    let mut next = live as u64;
    for oldest in 0..args.rounds {
        table.remove(hash_u64(oldest), |&v| v == oldest);
        insert(&mut table, next);
        next += 1;
    }

    table.print_probe_histogram(|&v| hash_u64(v));
    table.debug_stats(|&v| hash_u64(v)).print();
    println!(
        "Tombstones now occupy {:.02}% of the table",
        table.tombstones() as f64 / table.capacity() as f64 * 100.0
    );
}
