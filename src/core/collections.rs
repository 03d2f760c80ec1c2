//! Collection aliases tuned for triangulation workloads.
//!
//! Internal maps and sets use `rustc_hash`'s Fx hashing: keys are slotmap
//! handles and canonical vertex tuples, never attacker-controlled data, so the
//! faster non-cryptographic hash is the right trade.

use rustc_hash::{FxHashMap, FxHashSet};

/// Fast `HashMap` for internal, trusted keys.
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Fast `HashSet` for internal, trusted keys.
pub type FastHashSet<K> = FxHashSet<K>;

/// Compact index of a facet within a cell (a tetrahedron has facets `0..=3`).
pub type FacetIndex = u8;
