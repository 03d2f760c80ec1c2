//! The ordered border queue.
//!
//! A totally ordered multiset of `(criteria, record)` entries; the front
//! always exposes the lowest-quality-value candidate. Entries with equal
//! criteria are disambiguated by the arena handle, so erasure is exact and
//! never drops a same-key sibling.

use crate::reconstruction::border::BorderKey;
use ordered_float::OrderedFloat;
use std::collections::BTreeSet;

/// Ordered queue of border-edge candidates.
#[derive(Clone, Debug, Default)]
pub struct BorderQueue {
    entries: BTreeSet<(OrderedFloat<f64>, BorderKey)>,
}

impl BorderQueue {
    /// An empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts an entry. Returns `false` if the exact entry was present.
    pub fn insert(&mut self, criteria: f64, key: BorderKey) -> bool {
        self.entries.insert((OrderedFloat(criteria), key))
    }

    /// Erases an exact entry. Returns whether it was present.
    pub fn erase(&mut self, criteria: f64, key: BorderKey) -> bool {
        self.entries.remove(&(OrderedFloat(criteria), key))
    }

    /// The current minimum, without removing it.
    #[must_use]
    pub fn peek_min(&self) -> Option<(f64, BorderKey)> {
        self.entries.first().map(|&(c, k)| (c.0, k))
    }

    /// Removes and returns the current minimum.
    pub fn pop_min(&mut self) -> Option<(f64, BorderKey)> {
        self.entries.pop_first().map(|(c, k)| (c.0, k))
    }

    /// Drains every entry in ascending order.
    pub fn drain(&mut self) -> Vec<(f64, BorderKey)> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .map(|(c, k)| (c.0, k))
            .collect()
    }

    /// Iterates over entries in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, BorderKey)> + '_ {
        self.entries.iter().map(|&(c, k)| (c.0, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn keys(n: usize) -> Vec<BorderKey> {
        let mut arena: SlotMap<BorderKey, ()> = SlotMap::with_key();
        (0..n).map(|_| arena.insert(())).collect()
    }

    #[test]
    fn min_order_and_duplicates() {
        let k = keys(3);
        let mut q = BorderQueue::new();
        q.insert(1.0, k[0]);
        q.insert(-2.0, k[1]);
        q.insert(-2.0, k[2]); // same criteria, distinct record
        assert_eq!(q.len(), 3);
        let (c, _) = q.peek_min().unwrap();
        assert_eq!(c, -2.0);

        // Erasing one same-key entry leaves its sibling.
        assert!(q.erase(-2.0, k[1]));
        assert!(!q.erase(-2.0, k[1]));
        let (c, id) = q.pop_min().unwrap();
        assert_eq!(c, -2.0);
        assert_eq!(id, k[2]);
        assert_eq!(q.pop_min().unwrap().0, 1.0);
        assert!(q.is_empty());
    }

    #[test]
    fn drain_is_sorted() {
        let k = keys(4);
        let mut q = BorderQueue::new();
        for (i, &key) in k.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            q.insert(4.0 - i as f64, key);
        }
        let drained = q.drain();
        assert!(q.is_empty());
        let crits: Vec<f64> = drained.iter().map(|&(c, _)| c).collect();
        assert_eq!(crits, vec![1.0, 2.0, 3.0, 4.0]);
    }
}
