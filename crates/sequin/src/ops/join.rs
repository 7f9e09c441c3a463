//! Equi-join operators.
//!
//! Both joins hash the inner sequence into a [`Lookup`](crate::Lookup) when
//! iteration starts, then stream the outer sequence against it, so outer
//! order is preserved and the inner side is read exactly once per iteration.

use std::hash::Hash;

use crate::lookup::Lookup;
use crate::sequence::Sequence;

impl<T: Clone + Send + Sync + 'static> Sequence<T> {
    /// Correlates this sequence with `inner` on matching keys, producing one
    /// result per matching pair. Outer elements without matches are dropped.
    pub fn join<I, K, R, OK, IK, RS>(
        self,
        inner: Sequence<I>,
        outer_key: OK,
        inner_key: IK,
        result: RS,
    ) -> Sequence<R>
    where
        I: Clone + Send + Sync + 'static,
        K: Clone + Send + Sync + Eq + Hash + 'static,
        R: Clone + Send + Sync + 'static,
        OK: Fn(&T) -> K + Send + Sync + 'static,
        IK: Fn(&I) -> K + Send + Sync + 'static,
        RS: Fn(&T, &I) -> R + Send + Sync + 'static,
    {
        Sequence::generate(move |y| {
            let lookup =
                Lookup::from_pairs(inner.iter().map(|item| (inner_key(&item), item)));
            for outer in self.iter() {
                let key = outer_key(&outer);
                for matched in lookup.get(&key) {
                    y.emit(result(&outer, matched))?;
                }
            }
            Ok(())
        })
    }

    /// Correlates this sequence with `inner` on matching keys, producing one
    /// result per outer element with the full (possibly empty) match slice.
    pub fn group_join<I, K, R, OK, IK, RS>(
        self,
        inner: Sequence<I>,
        outer_key: OK,
        inner_key: IK,
        result: RS,
    ) -> Sequence<R>
    where
        I: Clone + Send + Sync + 'static,
        K: Clone + Send + Sync + Eq + Hash + 'static,
        R: Clone + Send + Sync + 'static,
        OK: Fn(&T) -> K + Send + Sync + 'static,
        IK: Fn(&I) -> K + Send + Sync + 'static,
        RS: Fn(&T, &[I]) -> R + Send + Sync + 'static,
    {
        Sequence::generate(move |y| {
            let lookup =
                Lookup::from_pairs(inner.iter().map(|item| (inner_key(&item), item)));
            for outer in self.iter() {
                let key = outer_key(&outer);
                y.emit(result(&outer, lookup.get(&key)))?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owners() -> Sequence<(&'static str, u32)> {
        Sequence::from(vec![("ada", 1), ("brin", 2), ("cade", 3)])
    }

    fn pets() -> Sequence<(&'static str, u32)> {
        Sequence::from(vec![("rex", 1), ("milo", 1), ("iris", 3), ("nyx", 9)])
    }

    #[test]
    fn join_pairs_matching_keys_in_outer_order() {
        let pairs = owners()
            .join(
                pets(),
                |&(_, id)| id,
                |&(_, owner)| owner,
                |&(name, _), &(pet, _)| (name, pet),
            )
            .to_vec();
        assert_eq!(
            pairs,
            vec![("ada", "rex"), ("ada", "milo"), ("cade", "iris")]
        );
    }

    #[test]
    fn group_join_emits_every_outer_element() {
        let counts = owners()
            .group_join(
                pets(),
                |&(_, id)| id,
                |&(_, owner)| owner,
                |&(name, _), matches| (name, matches.len()),
            )
            .to_vec();
        assert_eq!(counts, vec![("ada", 2), ("brin", 0), ("cade", 1)]);
    }

    #[test]
    fn inner_side_is_read_at_iteration_time() {
        use std::sync::{Arc, Mutex};

        let store = Arc::new(Mutex::new(vec![("rex", 1u32)]));
        let shared = Arc::clone(&store);
        let inner = Sequence::generate(move |y| {
            let items = shared.lock().unwrap().clone();
            for item in items {
                y.emit(item)?;
            }
            Ok(())
        });
        let joined = owners().join(
            inner,
            |&(_, id)| id,
            |&(_, owner)| owner,
            |&(name, _), &(pet, _)| (name, pet),
        );

        assert_eq!(joined.to_vec(), vec![("ada", "rex")]);
        store.lock().unwrap().push(("ivy", 2));
        assert_eq!(joined.to_vec(), vec![("ada", "rex"), ("brin", "ivy")]);
    }
}
