use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::hash_table::Entry;
use crate::hash_table::Error;
use crate::hash_table::HashTable;

/// Hashes a string with the polynomial rolling hash used by [`StringSet`].
///
/// Folds `hash = hash * 31 + byte` over the UTF-8 bytes of `s`, starting from
/// zero. Arithmetic wraps on overflow; the wrapped value is the hash.
///
/// # Examples
///
/// ```rust
/// use probe_hash::string_set::str_hash;
///
/// assert_eq!(str_hash(""), 0);
/// assert_eq!(str_hash("a"), 97);
/// assert_eq!(str_hash("ab"), 97 * 31 + 98);
/// ```
pub fn str_hash(s: &str) -> u32 {
    s.bytes()
        .fold(0u32, |hash, byte| hash.wrapping_mul(31).wrapping_add(byte as u32))
}

/// A fixed-capacity set of strings that owns a copy of every key.
///
/// `StringSet` hashes with [`str_hash`] and compares keys byte-wise. Inserting
/// copies the key into the set; removing it, or dropping the set, frees that
/// copy. Each copy is freed exactly once.
///
/// The capacity never changes. Removals leave tombstones that are reused by
/// later insertions but never reclaimed otherwise, so long add/remove cycles
/// push lookups toward a full scan of the table. See the
/// [`hash_table`](crate::hash_table) module docs.
///
/// # Examples
///
/// ```rust
/// use probe_hash::StringSet;
///
/// let mut set = StringSet::with_capacity(8);
/// set.insert("cat");
/// set.insert("dog");
///
/// assert_eq!(set.find("dog"), Some("dog"));
/// assert!(set.remove("cat"));
/// assert_eq!(set.find("cat"), None);
/// assert_eq!(set.len(), 1);
/// ```
#[derive(Clone)]
pub struct StringSet {
    table: HashTable<Box<str>>,
}

impl Debug for StringSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl StringSet {
    /// Creates a set with exactly `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
        }
    }

    /// Creates a set with exactly `capacity` slots, or returns
    /// [`Error::ZeroCapacity`] if `capacity` is zero.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        Ok(Self {
            table: HashTable::try_with_capacity(capacity)?,
        })
    }

    /// Returns the number of keys in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no keys.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the fixed number of slots, the most keys the set can hold.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Adds a copy of `key`. Returns `false`, copying nothing, if the key is
    /// already present.
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent and the set is full.
    pub fn insert(&mut self, key: &str) -> bool {
        match self.table.entry(str_hash(key) as u64, |k| **k == *key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(Box::from(key));
                true
            }
        }
    }

    /// Adds a copy of `key`, or returns [`Error::CapacityExceeded`] if it is
    /// absent and the set is full. Nothing is copied on error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::StringSet;
    /// use probe_hash::hash_table::Error;
    ///
    /// let mut set = StringSet::with_capacity(1);
    /// assert_eq!(set.try_insert("a"), Ok(true));
    /// assert_eq!(set.try_insert("a"), Ok(false));
    /// assert_eq!(set.try_insert("b"), Err(Error::CapacityExceeded));
    /// ```
    pub fn try_insert(&mut self, key: &str) -> Result<bool, Error> {
        match self.table.entry(str_hash(key) as u64, |k| **k == *key) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => entry.try_insert_with(|| Box::from(key)).map(|_| true),
        }
    }

    /// Returns the set's own copy of `key`, if present.
    pub fn find(&self, key: &str) -> Option<&str> {
        self.table
            .find(str_hash(key) as u64, |k| **k == *key)
            .map(|k| &**k)
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Removes `key`, freeing the set's copy. Returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.take(key).is_some()
    }

    /// Removes `key` and hands the set's copy to the caller.
    pub fn take(&mut self, key: &str) -> Option<String> {
        self.table
            .remove(str_hash(key) as u64, |k| **k == *key)
            .map(String::from)
    }

    /// Returns an iterator over the keys in ascending slot order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns a newly allocated vector of every key, in ascending slot order.
    ///
    /// The vector borrows the set's own copies of the keys rather than
    /// duplicating them, so the set cannot be modified or dropped while the
    /// vector is alive. Collect into owned strings first to keep the keys
    /// past the next removal.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::StringSet;
    ///
    /// let mut set = StringSet::with_capacity(8);
    /// set.insert("cat");
    /// set.insert("bird");
    ///
    /// let mut keys = set.elements();
    /// keys.sort_unstable();
    /// assert_eq!(keys, ["bird", "cat"]);
    /// ```
    pub fn elements(&self) -> Vec<&str> {
        self.iter().collect()
    }

    /// Returns probe-length statistics for the set.
    ///
    /// Only available in tests or with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats(|k| str_hash(k) as u64)
    }
}

impl<'a> Extend<&'a str> for StringSet {
    /// # Panics
    ///
    /// Panics if the set fills up before `iter` is exhausted.
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a> IntoIterator for &'a StringSet {
    type IntoIter = Iter<'a>;
    type Item = &'a str;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the keys of a `StringSet` in ascending slot order.
pub struct Iter<'a> {
    inner: crate::hash_table::Iter<'a, Box<str>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|k| &**k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::ToString;
    use alloc::vec;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::hash_table::Probe;

    fn slot_of(set: &StringSet, key: &str) -> Option<usize> {
        match set.table.search(str_hash(key) as u64, |k| **k == *key) {
            Probe::Found(index) => Some(index),
            Probe::Vacant(_) => None,
        }
    }

    #[test]
    fn test_str_hash_values() {
        assert_eq!(str_hash("cat"), 98262);
        assert_eq!(str_hash("dog"), 99644);
        assert_eq!(str_hash("hello"), 99162322);
    }

    #[test]
    fn test_str_hash_wraps() {
        let long = "a".repeat(20);
        let expected = long
            .bytes()
            .fold(0u64, |h, b| (h * 31 + b as u64) % (1u64 << 32)) as u32;
        assert_eq!(str_hash(&long), expected);
        assert_eq!(str_hash(&long), 1542361408);
    }

    #[test]
    fn test_str_hash_non_ascii_bytes_are_unsigned() {
        // "é" is 0xC3 0xA9 in UTF-8.
        assert_eq!(str_hash("é"), 195 * 31 + 169);
        assert_eq!(str_hash("é"), 6214);
        assert_eq!(str_hash("aé"), (97 * 31 + 195) * 31 + 169);
    }

    #[test]
    fn test_collision_and_tombstone_scenario() {
        // "cat", "gnu" and "ape" all hash to 6 mod 8; "bird" hashes to 1.
        for key in ["cat", "gnu", "ape"] {
            assert_eq!(str_hash(key) % 8, 6, "{key}");
        }
        assert_eq!(str_hash("bird") % 8, 1);

        let mut set = StringSet::with_capacity(8);
        assert!(set.insert("cat"));
        assert!(set.insert("gnu"));
        assert!(set.insert("bird"));
        assert_eq!(slot_of(&set, "cat"), Some(6));
        assert_eq!(slot_of(&set, "gnu"), Some(7));

        assert_eq!(set.find("gnu"), Some("gnu"));

        assert!(set.remove("cat"));
        assert_eq!(set.find("cat"), None);
        assert_eq!(set.len(), 2);

        assert!(set.insert("ape"));
        assert_eq!(slot_of(&set, "ape"), Some(6));
        assert_eq!(set.len(), 3);
        assert_eq!(set.table.tombstones(), 0);

        assert_eq!(set.elements(), vec!["bird", "ape", "gnu"]);
    }

    #[test]
    fn test_find_returns_owned_copy() {
        let mut set = StringSet::with_capacity(4);
        let key = "owl".to_string();
        set.insert(&key);

        let stored = set.find("owl").unwrap();
        assert_eq!(stored, key);
        assert!(!core::ptr::eq(stored.as_ptr(), key.as_ptr()));
    }

    #[test]
    fn test_duplicate_insert_is_noop() {
        let mut set = StringSet::with_capacity(4);
        assert!(set.insert("yak"));
        let first = set.find("yak").unwrap().as_ptr();

        assert!(!set.insert("yak"));
        assert_eq!(set.len(), 1);
        assert!(core::ptr::eq(set.find("yak").unwrap().as_ptr(), first));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut set = StringSet::with_capacity(4);
        set.insert("elk");
        assert!(!set.remove("emu"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.table.tombstones(), 0);
    }

    #[test]
    fn test_take_hands_back_key() {
        let mut set = StringSet::with_capacity(4);
        set.insert("hen");
        assert_eq!(set.take("hen"), Some("hen".to_string()));
        assert_eq!(set.take("hen"), None);
    }

    #[test]
    fn test_capacity_boundary() {
        let mut set = StringSet::with_capacity(4);
        for key in ["a", "b", "c"] {
            set.insert(key);
        }
        assert_eq!(set.len(), set.capacity() - 1);

        assert_eq!(set.try_insert("d"), Ok(true));
        assert_eq!(set.len(), set.capacity());
        assert_eq!(set.try_insert("e"), Err(Error::CapacityExceeded));
        assert!(!set.contains("e"));
        assert_eq!(set.len(), 4);
    }

    #[test]
    #[should_panic(expected = "cannot insert into a full table")]
    fn test_insert_into_full_set_panics() {
        let mut set = StringSet::with_capacity(2);
        set.extend(["x", "y", "z"]);
    }

    #[test]
    fn test_zero_capacity() {
        assert_eq!(StringSet::try_with_capacity(0).err(), Some(Error::ZeroCapacity));
    }

    #[test]
    fn test_empty_key() {
        let mut set = StringSet::with_capacity(3);
        assert!(set.insert(""));
        assert!(set.contains(""));
        assert_eq!(slot_of(&set, ""), Some(0));
    }

    #[test]
    fn test_aged_table_still_correct() {
        let mut rng = SmallRng::seed_from_u64(31);
        let capacity = 128;
        let mut set = StringSet::with_capacity(capacity);
        let mut live: Vec<String> = Vec::new();

        for round in 0..20_000u32 {
            if live.len() < 48 && (live.is_empty() || rng.random_bool(0.5)) {
                let key = format!("key-{round}");
                assert!(set.insert(&key));
                live.push(key);
            } else {
                let key = live.swap_remove(rng.random_range(0..live.len()));
                assert!(set.remove(&key));
                assert!(!set.contains(&key));
            }
        }

        assert_eq!(set.len(), live.len());
        for key in &live {
            assert_eq!(set.find(key), Some(key.as_str()));
        }
        assert!(!set.contains("key-never-inserted"));

        let mut elements: Vec<String> = set.elements().into_iter().map(String::from).collect();
        let mut expected = live.clone();
        elements.sort();
        expected.sort();
        assert_eq!(elements, expected);

        let stats = set.debug_stats();
        assert_eq!(stats.populated, live.len());
        assert!(
            stats.tombstones > capacity / 2,
            "tombstones should pile up: {stats:?}"
        );
    }

    #[test]
    fn test_debug_format() {
        let mut set = StringSet::with_capacity(8);
        set.insert("bird");
        set.insert("cat");
        assert_eq!(format!("{set:?}"), r#"{"bird", "cat"}"#);
    }
}
