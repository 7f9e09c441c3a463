//! Set algebra over sequences.
//!
//! All four operators produce distinct elements in first-sequence order. Each
//! builds its bank set at iteration time, inside the producer thread, so the
//! operands are read as of each fresh iteration.

use std::collections::HashSet;
use std::hash::Hash;

use crate::sequence::Sequence;

impl<T> Sequence<T>
where
    T: Clone + Send + Sync + Eq + Hash + 'static,
{
    /// Distinct elements, first occurrence wins.
    pub fn distinct(self) -> Sequence<T> {
        Sequence::generate(move |y| {
            let mut seen = HashSet::new();
            for item in self.iter() {
                if seen.insert(item.clone()) {
                    y.emit(item)?;
                }
            }
            Ok(())
        })
    }

    /// Distinct elements of this sequence, then of `other`.
    pub fn union(self, other: Sequence<T>) -> Sequence<T> {
        self.concat(other).distinct()
    }

    /// Distinct elements of this sequence that also appear in `other`.
    pub fn intersect(self, other: Sequence<T>) -> Sequence<T> {
        Sequence::generate(move |y| {
            let mut bank: HashSet<T> = other.iter().collect();
            for item in self.iter() {
                if bank.remove(&item) {
                    y.emit(item)?;
                }
            }
            Ok(())
        })
    }

    /// Distinct elements of this sequence that do not appear in `other`.
    pub fn except(self, other: Sequence<T>) -> Sequence<T> {
        Sequence::generate(move |y| {
            let mut bank: HashSet<T> = other.iter().collect();
            for item in self.iter() {
                if bank.insert(item.clone()) {
                    y.emit(item)?;
                }
            }
            Ok(())
        })
    }
}
