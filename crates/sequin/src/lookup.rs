//! Multimap containers backing grouping and join operators.
//!
//! A [`Lookup`] maps each key to every value that produced it, preserving
//! first-appearance key order so grouped results stream deterministically.
//! A [`Grouping`] is one immutable key/elements pairing.

use std::collections::HashMap;
use std::hash::Hash;

/// One key together with every element that mapped to it. Immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping<K, V> {
    key: K,
    elements: Vec<V>,
}

impl<K, V> Grouping<K, V> {
    pub(crate) fn new(key: K, elements: Vec<V>) -> Self {
        Grouping { key, elements }
    }

    /// The shared key of this group.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The grouped elements, in source order.
    pub fn elements(&self) -> &[V] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.elements.iter()
    }
}

impl<K, V> IntoIterator for Grouping<K, V> {
    type Item = V;
    type IntoIter = std::vec::IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a Grouping<K, V> {
    type Item = &'a V;
    type IntoIter = std::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

/// A collection of keys each mapped to one or more values.
///
/// Keys iterate in first-appearance order; values within a key keep source
/// order.
#[derive(Debug, Clone)]
pub struct Lookup<K, V> {
    order: Vec<K>,
    groups: HashMap<K, Vec<V>>,
}

impl<K: Eq + Hash + Clone, V> Lookup<K, V> {
    pub(crate) fn new() -> Self {
        Lookup {
            order: Vec::new(),
            groups: HashMap::new(),
        }
    }

    /// Builds a lookup from `(key, value)` pairs in source order.
    pub fn from_pairs<I: IntoIterator<Item = (K, V)>>(pairs: I) -> Self {
        let mut lookup = Lookup::new();
        for (key, value) in pairs {
            lookup.push(key, value);
        }
        lookup
    }

    pub(crate) fn push(&mut self, key: K, value: V) {
        let slot = self.groups.entry(key.clone()).or_default();
        if slot.is_empty() {
            self.order.push(key);
        }
        slot.push(value);
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.groups.contains_key(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The values recorded under `key`; empty for an absent key.
    pub fn get(&self, key: &K) -> &[V] {
        self.groups.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Consumes the lookup into groupings in first-appearance key order.
    pub fn into_groupings(self) -> Vec<Grouping<K, V>> {
        let mut groups = self.groups;
        self.order
            .into_iter()
            .filter_map(|key| {
                let elements = groups.remove(&key)?;
                Some(Grouping::new(key, elements))
            })
            .collect()
    }

    /// Iterates groups without consuming the lookup.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> + '_ {
        self.order.iter().map(|key| (key, self.get(key)))
    }
}
