//! A fixed-capacity hash table using open addressing with linear probing.
//!
//! [`HashTable`] is the engine behind both [`HashSet`](crate::HashSet) and
//! [`StringSet`](crate::StringSet). Like a raw table, it never hashes or
//! compares values itself: every operation takes a precomputed `u64` hash and
//! an equality predicate.
//!
//! Each slot carries a tag that is one of:
//!
//! - `Empty`: never used. A probe sequence stops here.
//! - `Filled`: holds a live value and counts toward [`HashTable::len`].
//! - `Deleted`: a tombstone left by a removal. A probe sequence walks past it,
//!   and insertion may reuse it.
//!
//! A slot only ever moves `Empty -> Filled`, `Filled -> Deleted` or
//! `Deleted -> Filled`. Tombstones are never turned back into empty slots and
//! the table never rehashes, so a long run of insertions and removals can fill
//! most of the array with tombstones. Every miss then walks the whole array,
//! and lookups degrade from O(1) toward O(capacity). Results stay correct.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::mem::MaybeUninit;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
enum Tag {
    Empty,
    Filled,
    Deleted,
}

/// Errors reported by the fallible constructors and insertion methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A table was requested with a capacity of zero.
    #[error("table capacity must be greater than zero")]
    ZeroCapacity,
    /// An insertion was attempted while every slot holds a live value.
    #[error("table is full")]
    CapacityExceeded,
}

/// Outcome of walking a probe sequence.
///
/// Returned by [`HashTable::search`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Probe {
    /// A matching value lives in the slot at this index.
    Found(usize),
    /// No matching value. Holds the slot an insertion would use: the first
    /// tombstone on the sequence if there was one, otherwise the empty slot
    /// that ended it. `None` only when every slot is filled.
    Vacant(Option<usize>),
}

/// Probe-length statistics for a table.
///
/// Only available in tests or with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of filled slots
    pub populated: usize,
    /// Total number of slots
    pub capacity: usize,
    /// Number of tombstones
    pub tombstones: usize,
    /// Number of slots never used
    pub empty_slots: usize,
    /// populated / capacity
    pub load_factor: f64,
    /// (populated + tombstones) / capacity
    pub used_ratio: f64,
    /// Longest distance from a value's home slot to where it is stored
    pub max_probe: usize,
    /// Mean distance from a value's home slot to where it is stored
    pub mean_probe: f64,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Probe Table Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Tombstones: {} ({:.2}% of slots used or dead)",
            self.tombstones,
            self.used_ratio * 100.0
        );
        println!("Empty: {} slots", self.empty_slots);
        println!(
            "Probe length: max {}, mean {:.02}",
            self.max_probe, self.mean_probe
        );
    }
}

/// A fixed-capacity hash table using linear probing and tombstone deletion.
///
/// `HashTable<V>` stores up to `capacity` values of type `V`. Callers provide
/// the hash value and an equality predicate for each operation.
///
/// The capacity is set at construction and never changes. Inserting into a
/// table whose every slot is filled panics; use
/// [`VacantEntry::try_insert_with`] to get an error instead.
///
/// ## Example
///
/// ```rust
/// use probe_hash::hash_table::Entry;
/// use probe_hash::hash_table::HashTable;
/// use probe_hash::string_set::str_hash;
///
/// #[derive(Debug, PartialEq)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// let mut table = HashTable::with_capacity(16);
/// let hash = str_hash("alice") as u64;
///
/// match table.entry(hash, |p: &Person| p.name == "alice") {
///     Entry::Vacant(entry) => {
///         entry.insert(Person {
///             name: "alice".to_string(),
///             age: 30,
///         });
///     }
///     Entry::Occupied(_) => {
///         println!("alice already exists");
///     }
/// }
///
/// assert_eq!(table.find(hash, |p| p.name == "alice").unwrap().age, 30);
/// ```
pub struct HashTable<V> {
    tags: Box<[Tag]>,
    buckets: Box<[MaybeUninit<V>]>,

    populated: usize,
    tombstones: usize,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::string::String;

        f.debug_struct("HashTable")
            .field(
                "tags",
                &self
                    .tags
                    .chunks(16)
                    .map(|w| {
                        w.iter()
                            .map(|t| match t {
                                Tag::Empty => '.',
                                Tag::Filled => 'F',
                                Tag::Deleted => 'D',
                            })
                            .collect::<String>()
                    })
                    .collect::<Vec<_>>(),
            )
            .field("populated", &self.populated)
            .field("tombstones", &self.tombstones)
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl<V> Clone for HashTable<V>
where
    V: Clone,
{
    fn clone(&self) -> Self {
        let mut new_table = Self::with_capacity(self.capacity());

        for (index, tag) in self.tags.iter().enumerate() {
            if *tag == Tag::Filled {
                // SAFETY: A filled tag guarantees the bucket is initialized.
                let value = unsafe { self.buckets[index].assume_init_ref() }.clone();
                new_table.buckets[index].write(value);
                new_table.populated += 1;
            }
            // The tag is written after the value so a panicking `clone` leaves
            // `new_table` dropping only what it actually holds.
            new_table.tags[index] = *tag;
        }
        new_table.tombstones = self.tombstones;

        debug_assert_eq!(new_table.populated, self.populated);
        new_table
    }
}

impl<V> Drop for HashTable<V> {
    fn drop(&mut self) {
        if !core::mem::needs_drop::<V>() || self.populated == 0 {
            return;
        }

        for (index, tag) in self.tags.iter().enumerate() {
            if *tag == Tag::Filled {
                // SAFETY: A filled tag guarantees the bucket is initialized, and
                // deleted buckets were already moved out by `take_at`, so every
                // value is dropped exactly once.
                unsafe { self.buckets[index].assume_init_drop() };
            }
        }
    }
}

impl<V> HashTable<V> {
    /// Creates a table with exactly `capacity` slots, all empty.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::with_capacity(100);
    /// assert_eq!(table.capacity(), 100);
    /// assert!(table.is_empty());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "table capacity must be greater than zero");

        Self {
            tags: vec![Tag::Empty; capacity].into_boxed_slice(),
            buckets: Box::new_uninit_slice(capacity),
            populated: 0,
            tombstones: 0,
        }
    }

    /// Creates a table with exactly `capacity` slots, or returns
    /// [`Error::ZeroCapacity`] if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::Error;
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// assert!(HashTable::<u32>::try_with_capacity(8).is_ok());
    /// assert_eq!(
    ///     HashTable::<u32>::try_with_capacity(0).unwrap_err(),
    ///     Error::ZeroCapacity
    /// );
    /// ```
    pub fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        Ok(Self::with_capacity(capacity))
    }

    /// Returns the number of slots, which is also the most values the table
    /// can ever hold.
    pub fn capacity(&self) -> usize {
        self.tags.len()
    }

    /// Returns the number of values in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table holds no values.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of tombstones left behind by removals.
    ///
    /// Tombstones are only ever recycled by later insertions, so this never
    /// goes down except when an insertion lands on one.
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Walks the probe sequence for `hash` and reports where a matching value
    /// lives, or where one would be inserted.
    ///
    /// The walk starts at `hash % capacity` and advances one slot at a time,
    /// wrapping at the end, for at most `capacity` steps. It stops at the first
    /// filled slot whose value satisfies `eq`, or at the first empty slot.
    /// Tombstones never stop the walk; the first one seen is remembered and
    /// preferred over the empty slot as the insertion point.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// # use probe_hash::hash_table::Probe;
    /// #
    /// let mut table = HashTable::with_capacity(8);
    /// table.entry(3, |&v: &u32| v == 30).or_insert(30);
    /// table.entry(3, |&v: &u32| v == 31).or_insert(31);
    ///
    /// assert_eq!(table.search(3, |&v| v == 31), Probe::Found(4));
    ///
    /// table.remove(3, |&v| v == 30);
    /// assert_eq!(table.search(3, |&v| v == 32), Probe::Vacant(Some(3)));
    /// ```
    pub fn search(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Probe {
        let capacity = self.capacity();
        let start = (hash % capacity as u64) as usize;
        let mut first_tombstone = None;

        for step in 0..capacity {
            let index = (start + step) % capacity;
            match self.tags[index] {
                Tag::Deleted => {
                    if first_tombstone.is_none() {
                        first_tombstone = Some(index);
                    }
                }
                Tag::Empty => return Probe::Vacant(first_tombstone.or(Some(index))),
                Tag::Filled => {
                    // SAFETY: A filled tag guarantees the bucket is initialized.
                    if eq(unsafe { self.buckets[index].assume_init_ref() }) {
                        return Probe::Found(index);
                    }
                }
            }
        }

        Probe::Vacant(first_tombstone)
    }

    /// Returns a reference to the value matching `eq`, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(8);
    /// table.entry(42, |&v: &u64| v == 42).or_insert(42);
    ///
    /// assert_eq!(table.find(42, |&v| v == 42), Some(&42));
    /// assert_eq!(table.find(7, |&v| v == 7), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        match self.search(hash, eq) {
            // SAFETY: `search` only reports filled slots as found.
            Probe::Found(index) => Some(unsafe { self.buckets[index].assume_init_ref() }),
            Probe::Vacant(_) => None,
        }
    }

    /// Returns a mutable reference to the value matching `eq`, if any.
    ///
    /// The caller must not change the value in a way that changes its hash or
    /// equality; later lookups would then miss it.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        match self.search(hash, eq) {
            // SAFETY: `search` only reports filled slots as found.
            Probe::Found(index) => Some(unsafe { self.buckets[index].assume_init_mut() }),
            Probe::Vacant(_) => None,
        }
    }

    /// Removes and returns the value matching `eq`, if any.
    ///
    /// The slot it occupied becomes a tombstone.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(8);
    /// table.entry(42, |&v: &u64| v == 42).or_insert(42);
    ///
    /// assert_eq!(table.remove(42, |&v| v == 42), Some(42));
    /// assert!(table.is_empty());
    /// assert_eq!(table.tombstones(), 1);
    ///
    /// assert_eq!(table.remove(42, |&v| v == 42), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        match self.search(hash, eq) {
            Probe::Found(index) => Some(self.take_at(index)),
            Probe::Vacant(_) => None,
        }
    }

    /// Gets the entry for the given hash and equality predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::Entry;
    /// # use probe_hash::hash_table::HashTable;
    /// # use probe_hash::string_set::str_hash;
    /// #
    /// let mut table = HashTable::with_capacity(10);
    /// let hash = str_hash("hello") as u64;
    ///
    /// match table.entry(hash, |s: &String| s == "hello") {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert("hello".to_string());
    ///     }
    ///     Entry::Occupied(_) => unreachable!(),
    /// }
    ///
    /// assert!(matches!(
    ///     table.entry(hash, |s: &String| s == "hello"),
    ///     Entry::Occupied(_)
    /// ));
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        match self.search(hash, eq) {
            Probe::Found(index) => Entry::Occupied(OccupiedEntry { table: self, index }),
            Probe::Vacant(slot) => Entry::Vacant(VacantEntry { table: self, slot }),
        }
    }

    /// Returns an iterator over all values in ascending slot order.
    ///
    /// Slot order is neither insertion order nor sorted order; it follows
    /// from the hashes and the collision history.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            table: self,
            index: 0,
            remaining: self.populated,
        }
    }

    fn take_at(&mut self, index: usize) -> V {
        debug_assert_eq!(self.tags[index], Tag::Filled);
        self.tags[index] = Tag::Deleted;
        self.populated -= 1;
        self.tombstones += 1;

        // SAFETY: The slot was filled, and it is now tagged as deleted, so the
        // value is never read or dropped through the table again.
        unsafe { self.buckets[index].assume_init_read() }
    }

    fn write_at(&mut self, index: usize, value: V) -> &mut V {
        match self.tags[index] {
            Tag::Empty => {}
            Tag::Deleted => self.tombstones -= 1,
            Tag::Filled => unreachable!("insertion slot {index} is already filled"),
        }
        self.tags[index] = Tag::Filled;
        self.populated += 1;
        self.buckets[index].write(value)
    }

    #[cfg(any(test, feature = "stats"))]
    fn probe_distance(&self, index: usize, hash: u64) -> usize {
        let capacity = self.capacity();
        let home = (hash % capacity as u64) as usize;
        (index + capacity - home) % capacity
    }

    /// Computes a histogram of probe lengths for the current table state.
    ///
    /// Only available in tests or with the `stats` feature. The table does not
    /// store hashes, so `hasher` must recompute the hash each value was
    /// inserted with.
    ///
    /// `hist[d]` is the number of values stored `d` slots past their home slot.
    /// The result is empty when the table is.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self, hasher: impl Fn(&V) -> u64) -> Vec<usize> {
        let mut hist = Vec::new();

        for (index, value) in self.slots() {
            let distance = self.probe_distance(index, hasher(value));
            if hist.len() <= distance {
                hist.resize(distance + 1, 0);
            }
            hist[distance] += 1;
        }

        hist
    }

    /// Returns occupancy and probe-length statistics.
    ///
    /// Only available in tests or with the `stats` feature. `hasher` must
    /// recompute the hash each value was inserted with.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self, hasher: impl Fn(&V) -> u64) -> DebugStats {
        let capacity = self.capacity();
        let hist = self.probe_histogram(hasher);
        let total_probe: usize = hist.iter().enumerate().map(|(d, n)| d * n).sum();

        DebugStats {
            populated: self.populated,
            capacity,
            tombstones: self.tombstones,
            empty_slots: capacity - self.populated - self.tombstones,
            load_factor: self.populated as f64 / capacity as f64,
            used_ratio: (self.populated + self.tombstones) as f64 / capacity as f64,
            max_probe: hist.len().saturating_sub(1),
            mean_probe: if self.populated == 0 {
                0.0
            } else {
                total_probe as f64 / self.populated as f64
            },
        }
    }

    /// Pretty-prints the probe-length histogram horizontally using stdout.
    ///
    /// Requires the `std` feature and either tests or the `stats` feature.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_probe_histogram(&self, hasher: impl Fn(&V) -> u64) {
        let hist = self.probe_histogram(hasher);
        let max = hist.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!("probe histogram ({} entries):", self.populated);
        for (distance, &count) in hist.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>4} | {} ({})", distance, "█".repeat(width), count);
        }
    }

    #[cfg(any(test, feature = "stats"))]
    fn slots(&self) -> impl Iterator<Item = (usize, &V)> {
        self.tags
            .iter()
            .enumerate()
            .filter(|(_, tag)| **tag == Tag::Filled)
            // SAFETY: A filled tag guarantees the bucket is initialized.
            .map(|(index, _)| (index, unsafe { self.buckets[index].assume_init_ref() }))
    }
}

/// A view into a single entry in the table, which may be vacant or occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V> {
    /// A vacant entry - no value matched
    Vacant(VacantEntry<'a, V>),
    /// An occupied entry - a value matched
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value in the entry.
    ///
    /// # Panics
    ///
    /// Panics if the entry is vacant and the table is full.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(4);
    /// *table.entry(1, |&(k, _): &(u8, u32)| k == 1).or_insert((1, 10)) = (1, 11);
    /// assert_eq!(table.entry(1, |&(k, _)| k == 1).or_insert((1, 99)).1, 11);
    /// ```
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the value in the entry.
    ///
    /// # Panics
    ///
    /// Panics if the entry is vacant and the table is full.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }
}

/// A view into a vacant entry in a [`HashTable`].
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    slot: Option<usize>,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Returns the slot index the value would be written to.
    ///
    /// This is the first tombstone on the probe sequence if there was one,
    /// otherwise the empty slot that ended it. `None` only when the table is
    /// full.
    pub fn slot(&self) -> Option<usize> {
        self.slot
    }

    /// Inserts `value` and returns a mutable reference to it.
    ///
    /// # Panics
    ///
    /// Panics if the table is full. Nothing is modified in that case.
    pub fn insert(self, value: V) -> &'a mut V {
        assert!(
            self.table.populated < self.table.capacity(),
            "cannot insert into a full table (capacity {})",
            self.table.capacity()
        );
        self.write(value)
    }

    /// Inserts the result of `value`, or returns
    /// [`Error::CapacityExceeded`] without calling it if the table is full.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::Entry;
    /// # use probe_hash::hash_table::Error;
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(1);
    /// table.entry(0, |&v: &u8| v == 0).or_insert(0);
    ///
    /// match table.entry(1, |&v| v == 1) {
    ///     Entry::Vacant(entry) => {
    ///         assert_eq!(entry.try_insert_with(|| 1).unwrap_err(), Error::CapacityExceeded);
    ///     }
    ///     Entry::Occupied(_) => unreachable!(),
    /// }
    /// ```
    pub fn try_insert_with(self, value: impl FnOnce() -> V) -> Result<&'a mut V, Error> {
        if self.table.populated >= self.table.capacity() {
            return Err(Error::CapacityExceeded);
        }
        Ok(self.write(value()))
    }

    fn write(self, value: V) -> &'a mut V {
        // While a slot is not filled, `search` either hits an empty slot or
        // walks every slot and so passes a tombstone.
        let Some(index) = self.slot else {
            unreachable!("non-full table produced no insertion slot");
        };
        self.table.write_at(index, value)
    }
}

/// A view into an occupied entry in a [`HashTable`].
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Returns the slot index holding the value.
    pub fn slot(&self) -> usize {
        self.index
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        // SAFETY: An occupied entry always points at a filled slot.
        unsafe { self.table.buckets[self.index].assume_init_ref() }
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        // SAFETY: An occupied entry always points at a filled slot.
        unsafe { self.table.buckets[self.index].assume_init_mut() }
    }

    /// Converts the entry into a mutable reference with the table's lifetime.
    pub fn into_mut(self) -> &'a mut V {
        // SAFETY: An occupied entry always points at a filled slot.
        unsafe { self.table.buckets[self.index].assume_init_mut() }
    }

    /// Removes the value, leaving a tombstone, and returns it.
    pub fn remove(self) -> V {
        self.table.take_at(self.index)
    }
}

/// An iterator over the values of a [`HashTable`] in ascending slot order.
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a, V> {
    table: &'a HashTable<V>,
    index: usize,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        while self.index < self.table.capacity() {
            let index = self.index;
            self.index += 1;
            if self.table.tags[index] == Tag::Filled {
                self.remaining -= 1;
                // SAFETY: A filled tag guarantees the bucket is initialized.
                return Some(unsafe { self.table.buckets[index].assume_init_ref() });
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
