use core::cmp::Ordering;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use alloc::vec::Vec;

use crate::hash_table::Entry;
use crate::hash_table::Error;
use crate::hash_table::HashTable;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used by [`Hashed::new`].
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used by [`Hashed::new`].
        pub type DefaultHashBuilder = std::hash::RandomState;
    }
}

/// The hash and comparison behavior a [`HashSet`] dispatches through.
///
/// Implementations must be consistent: two elements for which `compare`
/// returns [`Ordering::Equal`] must produce the same `hash`. The set never
/// checks this. An inconsistent behavior makes lookups miss or admit
/// duplicates, but never causes undefined behavior.
pub trait Behavior<T: ?Sized> {
    /// Hashes an element. Must depend only on the element.
    fn hash(&self, value: &T) -> u64;

    /// Three-way compares two elements. Only `Ordering::Equal` versus
    /// anything else is significant to the set.
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// A [`Behavior`] made of two caller-supplied functions.
///
/// # Examples
///
/// ```rust
/// use probe_hash::hash_set::Callbacks;
/// use probe_hash::hash_set::Behavior;
///
/// let behavior = Callbacks::new(|v: &u32| *v as u64, |a: &u32, b: &u32| a.cmp(b));
/// assert_eq!(Behavior::<u32>::hash(&behavior, &7), 7);
/// assert!(Behavior::<u32>::compare(&behavior, &7, &7).is_eq());
/// ```
#[derive(Clone, Copy)]
pub struct Callbacks<H, C> {
    hash: H,
    compare: C,
}

impl<H, C> Callbacks<H, C> {
    /// Wraps a hash function and a comparison function.
    pub fn new(hash: H, compare: C) -> Self {
        Self { hash, compare }
    }
}

impl<T, H, C> Behavior<T> for Callbacks<H, C>
where
    T: ?Sized,
    H: Fn(&T) -> u64,
    C: Fn(&T, &T) -> Ordering,
{
    fn hash(&self, value: &T) -> u64 {
        (self.hash)(value)
    }

    fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.compare)(a, b)
    }
}

/// A [`Behavior`] derived from `T: Hash + Ord` and a hasher builder.
#[derive(Clone, Default)]
pub struct Hashed<S> {
    hash_builder: S,
}

impl<S> Hashed<S> {
    /// Hashes with `hash_builder` and compares with `Ord`.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self { hash_builder }
    }
}

#[cfg(any(feature = "foldhash", feature = "std"))]
impl Hashed<DefaultHashBuilder> {
    /// Hashes with a freshly seeded [`DefaultHashBuilder`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T, S> Behavior<T> for Hashed<S>
where
    T: ?Sized + Hash + Ord,
    S: BuildHasher,
{
    fn hash(&self, value: &T) -> u64 {
        self.hash_builder.hash_one(value)
    }

    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// A fixed-capacity set over caller-described elements.
///
/// `HashSet<T, B>` stores up to `capacity` elements and finds them through the
/// hash and comparison of a [`Behavior`] `B` supplied at construction. It owns
/// the elements it stores, but for a typical handle type such as `&'a U` or a
/// `Copy` id that only means owning the handle: the data it refers to is the
/// caller's and must outlive the set.
///
/// The capacity never changes. Removals leave tombstones that are reused by
/// later insertions but never reclaimed otherwise, so long add/remove cycles
/// push lookups toward a full scan of the table. See the
/// [`hash_table`](crate::hash_table) module docs.
///
/// # Examples
///
/// ```rust
/// use probe_hash::HashSet;
///
/// #[derive(Debug)]
/// struct Employee {
///     id: u32,
///     name: &'static str,
/// }
///
/// let alice = Employee { id: 7, name: "alice" };
/// let bob = Employee { id: 9, name: "bob" };
/// let probe = Employee { id: 9, name: "" };
///
/// let mut set: HashSet<&Employee, _> = HashSet::with_callbacks(
///     8,
///     |e: &&Employee| e.id as u64,
///     |a: &&Employee, b: &&Employee| a.id.cmp(&b.id),
/// );
/// assert!(set.insert(&alice));
/// assert!(set.insert(&bob));
/// assert!(!set.insert(&alice));
///
/// assert_eq!(set.find(&&probe).unwrap().name, "bob");
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Clone)]
pub struct HashSet<T, B> {
    table: HashTable<T>,
    behavior: B,
}

impl<T, B> Debug for HashSet<T, B>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, H, C> HashSet<T, Callbacks<H, C>>
where
    H: Fn(&T) -> u64,
    C: Fn(&T, &T) -> Ordering,
{
    /// Creates a set with `capacity` slots that hashes with `hash` and
    /// compares with `compare`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_callbacks(capacity: usize, hash: H, compare: C) -> Self {
        Self::with_behavior(capacity, Callbacks::new(hash, compare))
    }
}

impl<T, S> HashSet<T, Hashed<S>>
where
    T: Hash + Ord,
    S: BuildHasher + Default,
{
    /// Creates a set with `capacity` slots using `T`'s own `Hash` and `Ord`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::hash_set::DefaultHashBuilder;
    /// use probe_hash::hash_set::Hashed;
    /// use probe_hash::HashSet;
    ///
    /// let mut set: HashSet<u32, Hashed<DefaultHashBuilder>> = HashSet::with_capacity(4);
    /// set.insert(1);
    /// assert!(set.contains(&1));
    /// assert_eq!(set.capacity(), 4);
    /// # }
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_behavior(capacity, Hashed::default())
    }
}

impl<T, B> HashSet<T, B> {
    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the fixed number of slots, the most elements the set can hold.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns an iterator over the elements in ascending slot order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns a newly allocated vector holding a copy of every element, in
    /// ascending slot order.
    ///
    /// The vector is independent of the set: later insertions and removals
    /// do not affect it. For handle types the copies are handles, so they
    /// still point at the caller's data.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::HashSet;
    ///
    /// let mut set: HashSet<u8, _> = HashSet::with_callbacks(8, |v: &u8| *v as u64, |a: &u8, b: &u8| a.cmp(b));
    /// set.insert(5);
    /// set.insert(2);
    /// set.insert(13);
    ///
    /// // 13 collides with 5 and lands in the next slot.
    /// assert_eq!(set.elements(), vec![2, 5, 13]);
    /// ```
    pub fn elements(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<T, B> HashSet<T, B>
where
    B: Behavior<T>,
{
    /// Creates a set with `capacity` slots dispatching through `behavior`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_behavior(capacity: usize, behavior: B) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            behavior,
        }
    }

    /// Creates a set with `capacity` slots, or returns
    /// [`Error::ZeroCapacity`] if `capacity` is zero.
    pub fn try_with_behavior(capacity: usize, behavior: B) -> Result<Self, Error> {
        Ok(Self {
            table: HashTable::try_with_capacity(capacity)?,
            behavior,
        })
    }

    /// Adds an element. Returns `false`, leaving the stored element in place,
    /// if an equal one is already present.
    ///
    /// # Panics
    ///
    /// Panics if `value` is absent and the set is full.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::HashSet;
    ///
    /// let mut set: HashSet<u8, _> = HashSet::with_callbacks(2, |v: &u8| *v as u64, |a: &u8, b: &u8| a.cmp(b));
    /// assert!(set.insert(1));
    /// assert!(!set.insert(1));
    /// assert!(set.insert(2));
    /// assert_eq!(set.len(), 2);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        let behavior = &self.behavior;
        let hash = behavior.hash(&value);
        match self
            .table
            .entry(hash, |v| behavior.compare(v, &value).is_eq())
        {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(value);
                true
            }
        }
    }

    /// Adds an element, or returns [`Error::CapacityExceeded`] if it is
    /// absent and the set is full. The set is unchanged on error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::HashSet;
    /// use probe_hash::hash_table::Error;
    ///
    /// let mut set: HashSet<u8, _> = HashSet::with_callbacks(1, |v: &u8| *v as u64, |a: &u8, b: &u8| a.cmp(b));
    /// assert_eq!(set.try_insert(1), Ok(true));
    /// assert_eq!(set.try_insert(1), Ok(false));
    /// assert_eq!(set.try_insert(2), Err(Error::CapacityExceeded));
    /// ```
    pub fn try_insert(&mut self, value: T) -> Result<bool, Error> {
        let behavior = &self.behavior;
        let hash = behavior.hash(&value);
        match self
            .table
            .entry(hash, |v| behavior.compare(v, &value).is_eq())
        {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => entry.try_insert_with(|| value).map(|_| true),
        }
    }

    /// Returns the stored element equal to `value`, if any.
    pub fn find(&self, value: &T) -> Option<&T> {
        let hash = self.behavior.hash(value);
        self.table
            .find(hash, |v| self.behavior.compare(v, value).is_eq())
    }

    /// Returns `true` if an element equal to `value` is present.
    pub fn contains(&self, value: &T) -> bool {
        self.find(value).is_some()
    }

    /// Removes the element equal to `value`. Returns whether one was present.
    ///
    /// The freed slot becomes a tombstone.
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes and returns the stored element equal to `value`, if any.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let behavior = &self.behavior;
        let hash = behavior.hash(value);
        self.table
            .remove(hash, |v| behavior.compare(v, value).is_eq())
    }

    /// Returns probe-length statistics for the set.
    ///
    /// Only available in tests or with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats(|v| self.behavior.hash(v))
    }
}

impl<T, B> Extend<T> for HashSet<T, B>
where
    B: Behavior<T>,
{
    /// # Panics
    ///
    /// Panics if the set fills up before `iter` is exhausted.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T, B> IntoIterator for &'a HashSet<T, B> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the elements of a `HashSet` in ascending slot order.
pub struct Iter<'a, T> {
    inner: crate::hash_table::Iter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
