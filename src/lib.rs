#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod hash_table;

/// A fixed-capacity set over caller-described elements.
///
/// This module provides a `HashSet` that wraps the `HashTable` and dispatches
/// hashing and comparison through a caller-supplied [`Behavior`].
///
/// [`Behavior`]: hash_set::Behavior
pub mod hash_set;

/// A fixed-capacity set of owned strings.
///
/// This module provides a `StringSet` that wraps the `HashTable`, owns a copy
/// of every key, and hashes with the public [`str_hash`] function.
///
/// [`str_hash`]: string_set::str_hash
pub mod string_set;

pub use hash_set::HashSet;
pub use hash_table::Error;
pub use hash_table::HashTable;
pub use string_set::StringSet;
pub use string_set::str_hash;
