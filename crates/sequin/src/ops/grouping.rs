//! Grouping operators and lookup conversion.

use std::hash::Hash;

use crate::lookup::{Grouping, Lookup};
use crate::sequence::Sequence;

impl<T: Clone + Send + Sync + 'static> Sequence<T> {
    /// Groups elements by `key`, streaming one [`Grouping`] per distinct key
    /// in first-appearance order.
    ///
    /// The lookup is built when iteration starts, not when the operator is
    /// defined; only the streaming of groups is lazy.
    pub fn group_by<K, KF>(self, key: KF) -> Sequence<Grouping<K, T>>
    where
        K: Clone + Send + Sync + Eq + Hash + 'static,
        KF: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.group_by_select(key, |item| item)
    }

    /// Groups projected values by `key`.
    pub fn group_by_select<K, V, KF, VF>(self, key: KF, value: VF) -> Sequence<Grouping<K, V>>
    where
        K: Clone + Send + Sync + Eq + Hash + 'static,
        V: Clone + Send + Sync + 'static,
        KF: Fn(&T) -> K + Send + Sync + 'static,
        VF: Fn(T) -> V + Send + Sync + 'static,
    {
        Sequence::generate(move |y| {
            let lookup = Lookup::from_pairs(self.iter().map(|item| (key(&item), value(item))));
            for group in lookup.into_groupings() {
                y.emit(group)?;
            }
            Ok(())
        })
    }

    /// Materializes the sequence into a [`Lookup`] keyed by `key`.
    pub fn to_lookup<K, KF>(&self, key: KF) -> Lookup<K, T>
    where
        K: Clone + Eq + Hash,
        KF: Fn(&T) -> K,
    {
        Lookup::from_pairs(self.iter().map(|item| (key(&item), item)))
    }

    /// Materializes the sequence into a [`Lookup`] of projected values.
    pub fn to_lookup_select<K, V, KF, VF>(&self, key: KF, value: VF) -> Lookup<K, V>
    where
        K: Clone + Eq + Hash,
        KF: Fn(&T) -> K,
        VF: Fn(T) -> V,
    {
        Lookup::from_pairs(self.iter().map(|item| (key(&item), value(item))))
    }
}
