//! Terminal operators.
//!
//! Everything here consumes one full (or short-circuited) iteration on the
//! calling thread. Operators that require elements return
//! `Result<_, SequinError>`; use `.ok()` where an `Option` reads better.

use std::collections::HashMap;
use std::hash::Hash;

use crate::sequence::Sequence;
use sequin_core::{Result, SequinError};

impl<T: Clone + Send + Sync + 'static> Sequence<T> {
    /// Collects every element into a `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.snapshot()
    }

    /// Number of elements. Free for buffered sources; otherwise one full
    /// iteration.
    pub fn count(&self) -> usize {
        match self.known_len() {
            Some(len) => len,
            None => self.iter().count(),
        }
    }

    /// True if the sequence has at least one element. Pulls at most one
    /// value.
    pub fn any(&self) -> bool {
        self.iter().next().is_some()
    }

    /// True if any element satisfies `predicate`. Short-circuits.
    pub fn any_match<P: Fn(&T) -> bool>(&self, predicate: P) -> bool {
        self.iter().any(|item| predicate(&item))
    }

    /// Number of elements satisfying `predicate`. One full iteration.
    pub fn count_match<P: Fn(&T) -> bool>(&self, predicate: P) -> usize {
        self.iter().filter(|item| predicate(item)).count()
    }

    /// True if every element satisfies `predicate`. Short-circuits.
    pub fn all<P: Fn(&T) -> bool>(&self, predicate: P) -> bool {
        self.iter().all(|item| predicate(&item))
    }

    /// The first element.
    pub fn first(&self) -> Result<T> {
        self.iter().next().ok_or(SequinError::NoElements)
    }

    /// The first element satisfying `predicate`.
    pub fn first_match<P: Fn(&T) -> bool>(&self, predicate: P) -> Result<T> {
        self.iter()
            .find(|item| predicate(item))
            .ok_or(SequinError::NoMatch)
    }

    /// The last element. One full iteration.
    pub fn last(&self) -> Result<T> {
        self.iter().last().ok_or(SequinError::NoElements)
    }

    /// The last element satisfying `predicate`. One full iteration.
    pub fn last_match<P: Fn(&T) -> bool>(&self, predicate: P) -> Result<T> {
        self.iter()
            .filter(|item| predicate(item))
            .last()
            .ok_or(SequinError::NoMatch)
    }

    /// The only element; fails on empty or plural sequences.
    pub fn single(&self) -> Result<T> {
        let mut source = self.iter();
        let only = source.next().ok_or(SequinError::NoElements)?;
        if source.next().is_some() {
            return Err(SequinError::MultipleElements);
        }
        Ok(only)
    }

    /// The only element satisfying `predicate`.
    pub fn single_match<P: Fn(&T) -> bool>(&self, predicate: P) -> Result<T> {
        let mut matches = self.iter().filter(|item| predicate(item));
        let only = matches.next().ok_or(SequinError::NoMatch)?;
        if matches.next().is_some() {
            return Err(SequinError::MultipleElements);
        }
        Ok(only)
    }

    /// The element at `index`. Random access for buffered sources; a bounded
    /// iteration otherwise.
    pub fn element_at(&self, index: usize) -> Result<T> {
        if self.known_len().is_some() {
            return self
                .buffered_get(index)
                .ok_or(SequinError::IndexOutOfRange(index));
        }
        self.iter()
            .nth(index)
            .ok_or(SequinError::IndexOutOfRange(index))
    }

    /// Folds every element into `seed`.
    pub fn fold<S, F: Fn(S, T) -> S>(&self, seed: S, f: F) -> S {
        self.iter().fold(seed, f)
    }

    /// Folds the sequence onto its first element.
    pub fn reduce<F: Fn(T, T) -> T>(&self, f: F) -> Result<T> {
        self.iter().reduce(f).ok_or(SequinError::NoElements)
    }

    /// Sums the elements into any `Sum`-compatible accumulator.
    pub fn sum<S: std::iter::Sum<T>>(&self) -> S {
        self.iter().sum()
    }

    /// Arithmetic mean of the projected values.
    pub fn average<F: Fn(&T) -> f64>(&self, selector: F) -> Result<f64> {
        let (count, total) = self
            .iter()
            .fold((0usize, 0.0), |(n, sum), item| (n + 1, sum + selector(&item)));
        if count == 0 {
            return Err(SequinError::NoElements);
        }
        Ok(total / count as f64)
    }

    /// True when both sequences yield equal elements in the same order.
    pub fn sequence_eq(&self, other: &Sequence<T>) -> bool
    where
        T: PartialEq,
    {
        self.iter().eq(other.iter())
    }

    /// True if `value` appears in the sequence. Short-circuits.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|item| item == *value)
    }

    /// Smallest element by natural order.
    pub fn min(&self) -> Option<T>
    where
        T: Ord,
    {
        self.iter().min()
    }

    /// Largest element by natural order.
    pub fn max(&self) -> Option<T>
    where
        T: Ord,
    {
        self.iter().max()
    }

    /// Element with the smallest extracted key; first such element on ties.
    pub fn min_by_key<K: Ord, F: Fn(&T) -> K>(&self, selector: F) -> Option<T> {
        self.iter().min_by_key(|item| selector(item))
    }

    /// Element with the largest extracted key; first such element on ties.
    pub fn max_by_key<K: Ord, F: Fn(&T) -> K>(&self, selector: F) -> Option<T> {
        self.iter()
            .reduce(|best, item| if selector(&item) > selector(&best) { item } else { best })
    }

    /// Materializes into a map keyed by `key`; a later duplicate key replaces
    /// the earlier entry.
    pub fn to_map<K, KF>(&self, key: KF) -> HashMap<K, T>
    where
        K: Eq + Hash,
        KF: Fn(&T) -> K,
    {
        self.iter().map(|item| (key(&item), item)).collect()
    }

    /// Materializes into a map of projected values keyed by `key`; a later
    /// duplicate key replaces the earlier entry.
    pub fn to_map_select<K, V, KF, VF>(&self, key: KF, value: VF) -> HashMap<K, V>
    where
        K: Eq + Hash,
        KF: Fn(&T) -> K,
        VF: Fn(&T) -> V,
    {
        self.iter().map(|item| (key(&item), value(&item))).collect()
    }
}
