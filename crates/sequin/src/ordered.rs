//! Deferred, chainable, stable multi-key ordering.
//!
//! An [`OrderedSequence`] records a chain of ordering rules without sorting
//! anything. At iteration time it materializes the source into a buffer,
//! compiles each rule into a key column (extracting every element's key
//! exactly once), sorts an index permutation by comparing columns
//! lexicographically with original index as the final tie-break, and streams
//! the permuted elements through a generator. One physical sort happens per
//! terminal iteration no matter how many `then_by` calls were chained.
//!
//! The tie-break makes the comparison a total order, so the permutation is
//! deterministic and equal-key elements keep their input order even though
//! the underlying comparison sort is unstable.

use std::cmp::Ordering;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::sequence::Sequence;
use sequin_core::Generator;

type Comparator<K> = Arc<dyn Fn(&K, &K) -> Ordering + Send + Sync>;

/// One fully-extracted key column over a sort buffer.
trait KeyColumn {
    fn compare(&self, a: usize, b: usize) -> Ordering;
}

struct ExtractedColumn<K> {
    keys: Vec<K>,
    compare: Comparator<K>,
    descending: bool,
}

impl<K> KeyColumn for ExtractedColumn<K> {
    fn compare(&self, a: usize, b: usize) -> Ordering {
        let ord = (self.compare)(&self.keys[a], &self.keys[b]);
        if self.descending {
            ord.reverse()
        } else {
            ord
        }
    }
}

/// One chained ordering key: given the sort buffer, extracts the key of every
/// element once and yields an index-comparable column.
pub(crate) struct OrderingRule<T> {
    build: Arc<dyn Fn(&[T]) -> Box<dyn KeyColumn> + Send + Sync>,
}

impl<T> Clone for OrderingRule<T> {
    fn clone(&self) -> Self {
        OrderingRule {
            build: Arc::clone(&self.build),
        }
    }
}

impl<T: 'static> OrderingRule<T> {
    fn new<K, S, C>(selector: S, compare: C, descending: bool) -> Self
    where
        K: 'static,
        S: Fn(&T) -> K + Send + Sync + 'static,
        C: Fn(&K, &K) -> Ordering + Send + Sync + 'static,
    {
        let compare: Comparator<K> = Arc::new(compare);
        OrderingRule {
            build: Arc::new(move |items: &[T]| {
                let keys: Vec<K> = items.iter().map(&selector).collect();
                Box::new(ExtractedColumn {
                    keys,
                    compare: Arc::clone(&compare),
                    descending,
                })
            }),
        }
    }
}

/// Sorts an index permutation of `data` by the chained rules.
///
/// The full sort completes before any element is streamed; only the post-sort
/// emission is on-demand.
fn sorted_permutation<T>(data: &[T], rules: &[OrderingRule<T>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..data.len()).collect();
    if data.len() < 2 {
        return order;
    }
    tracing::debug!(elements = data.len(), keys = rules.len(), "sorting buffer");
    let columns: Vec<Box<dyn KeyColumn>> = rules.iter().map(|rule| (rule.build)(data)).collect();
    order.sort_unstable_by(|&a, &b| {
        for column in &columns {
            match column.compare(a, b) {
                Ordering::Equal => continue,
                decided => return decided,
            }
        }
        // Full composite tie: original position decides, which keeps the
        // sort stable.
        a.cmp(&b)
    });
    order
}

/// A sequence with a pending multi-key ordering.
///
/// Produced by [`Sequence::order_by`] and friends; extend the composite key
/// with [`then_by`](OrderedSequence::then_by) before iterating.
pub struct OrderedSequence<T> {
    source: Sequence<T>,
    rules: SmallVec<[OrderingRule<T>; 2]>,
}

impl<T> Clone for OrderedSequence<T> {
    fn clone(&self) -> Self {
        OrderedSequence {
            source: self.source.clone(),
            rules: self.rules.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Sequence<T> {
    /// Orders ascending by a key's natural order.
    pub fn order_by<K, S>(self, selector: S) -> OrderedSequence<T>
    where
        K: Ord + 'static,
        S: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.order_by_with(selector, |a: &K, b: &K| a.cmp(b), false)
    }

    /// Orders descending by a key's natural order.
    pub fn order_by_descending<K, S>(self, selector: S) -> OrderedSequence<T>
    where
        K: Ord + 'static,
        S: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.order_by_with(selector, |a: &K, b: &K| a.cmp(b), true)
    }

    /// Orders by an extracted key under an explicit comparator.
    ///
    /// `descending` reverses this comparator only; keys chained on later are
    /// unaffected.
    pub fn order_by_with<K, S, C>(
        self,
        selector: S,
        compare: C,
        descending: bool,
    ) -> OrderedSequence<T>
    where
        K: 'static,
        S: Fn(&T) -> K + Send + Sync + 'static,
        C: Fn(&K, &K) -> Ordering + Send + Sync + 'static,
    {
        let mut rules = SmallVec::new();
        rules.push(OrderingRule::new(selector, compare, descending));
        OrderedSequence {
            source: self,
            rules,
        }
    }
}

impl<T: Clone + Send + Sync + 'static> OrderedSequence<T> {
    /// Appends an ascending subordinate key to the composite ordering.
    ///
    /// No independent re-sort happens: the new key only breaks ties left by
    /// the keys before it.
    pub fn then_by<K, S>(self, selector: S) -> OrderedSequence<T>
    where
        K: Ord + 'static,
        S: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.then_by_with(selector, |a: &K, b: &K| a.cmp(b), false)
    }

    /// Appends a descending subordinate key to the composite ordering.
    pub fn then_by_descending<K, S>(self, selector: S) -> OrderedSequence<T>
    where
        K: Ord + 'static,
        S: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.then_by_with(selector, |a: &K, b: &K| a.cmp(b), true)
    }

    /// Appends a subordinate key under an explicit comparator.
    pub fn then_by_with<K, S, C>(mut self, selector: S, compare: C, descending: bool) -> Self
    where
        K: 'static,
        S: Fn(&T) -> K + Send + Sync + 'static,
        C: Fn(&K, &K) -> Ordering + Send + Sync + 'static,
    {
        self.rules.push(OrderingRule::new(selector, compare, descending));
        self
    }

    /// Starts a fresh iteration: snapshots the source, sorts, then streams
    /// the permuted elements through a generator.
    ///
    /// Snapshotting, key extraction, and the sort itself run on the calling
    /// thread, so a panicking key selector or comparator faults here rather
    /// than at the first pull.
    pub fn iter(&self) -> Generator<T> {
        let data = self.source.snapshot_shared();
        let order = sorted_permutation(&data, &self.rules);
        Generator::spawn(move |y| {
            for &i in &order {
                y.emit(data[i].clone())?;
            }
            Ok(())
        })
    }

    /// Repackages the ordering as a plain sequence so further operators can
    /// be chained after it. The sort then runs inside the producer thread of
    /// each iteration.
    pub fn into_sequence(self) -> Sequence<T> {
        let OrderedSequence { source, rules } = self;
        let rules: Vec<OrderingRule<T>> = rules.into_vec();
        Sequence::generate(move |y| {
            let data = source.snapshot_shared();
            let order = sorted_permutation(&data, &rules);
            for &i in &order {
                y.emit(data[i].clone())?;
            }
            Ok(())
        })
    }

    /// Sorts and collects without going through a generator round-trip.
    pub fn to_vec(&self) -> Vec<T> {
        let data = self.source.snapshot_shared();
        let order = sorted_permutation(&data, &self.rules);
        order.into_iter().map(|i| data[i].clone()).collect()
    }
}

impl<T: Clone + Send + Sync + 'static> IntoIterator for &OrderedSequence<T> {
    type Item = T;
    type IntoIter = Generator<T>;

    fn into_iter(self) -> Generator<T> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_ascending_by_key() {
        let seq = Sequence::from(vec![3, 1, 4, 1, 5, 9, 2, 6]);
        assert_eq!(
            seq.order_by(|&n| n).to_vec(),
            vec![1, 1, 2, 3, 4, 5, 6, 9]
        );
    }

    #[test]
    fn equal_keys_preserve_input_order() {
        // Ties on 10 and on 11 each keep input order of the second component.
        let seq = Sequence::from(vec![(10, 1), (11, 2), (11, 3), (10, 4)]);
        let seconds: Vec<_> = seq
            .order_by(|&(first, _)| first)
            .iter()
            .map(|(_, second)| second)
            .collect();
        assert_eq!(seconds, vec![1, 4, 2, 3]);
    }

    #[test]
    fn then_by_breaks_ties_without_resorting() {
        let seq = Sequence::from(vec![("b", 2), ("a", 2), ("b", 1), ("a", 1)]);
        let sorted = seq
            .order_by(|&(_, n)| n)
            .then_by(|&(name, _)| name)
            .to_vec();
        assert_eq!(sorted, vec![("a", 1), ("b", 1), ("a", 2), ("b", 2)]);
    }

    #[test]
    fn descending_reverses_only_the_newest_key() {
        let seq = Sequence::from(vec![("b", 2), ("a", 2), ("b", 1), ("a", 1)]);
        let sorted = seq
            .order_by(|&(_, n)| n)
            .then_by_descending(|&(name, _)| name)
            .to_vec();
        assert_eq!(sorted, vec![("b", 1), ("a", 1), ("b", 2), ("a", 2)]);
    }

    #[test]
    fn explicit_comparator_is_honored() {
        let seq = Sequence::from(vec!["Beta", "alpha", "Gamma"]);
        let sorted = seq
            .order_by_with(
                |s: &&str| s.to_lowercase(),
                |a: &String, b: &String| a.cmp(b),
                false,
            )
            .to_vec();
        assert_eq!(sorted, vec!["alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn output_is_a_permutation_of_the_input() {
        let input = vec![5, 3, 5, 1, 3, 3, 9, 0];
        let mut sorted = Sequence::from(input.clone()).order_by(|&n| n).to_vec();
        let mut expected = input;
        expected.sort();
        assert_eq!(sorted, expected);
        sorted.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn empty_and_singleton_short_circuit() {
        assert!(Sequence::<i32>::empty().order_by(|&n| n).to_vec().is_empty());
        assert_eq!(Sequence::from(vec![7]).order_by(|&n| n).to_vec(), vec![7]);
    }

    #[test]
    fn ordering_composes_with_later_operators() {
        let seq = Sequence::from(vec![4, 2, 8, 6]);
        let first_two = seq.order_by(|&n| n).into_sequence().take(2).to_vec();
        assert_eq!(first_two, vec![2, 4]);
    }

    #[test]
    fn panicking_key_selector_faults_on_the_calling_thread() {
        use std::panic::{catch_unwind, AssertUnwindSafe};

        let ordered = Sequence::from(vec![2, 1]).order_by(|_: &i32| -> i32 {
            panic!("bad key");
        });
        // The sort runs before any producer thread exists, so the unwind
        // comes straight out of `iter`.
        let unwound = catch_unwind(AssertUnwindSafe(|| ordered.iter()));
        assert!(unwound.is_err());
    }

    #[test]
    fn panicking_key_selector_after_into_sequence_faults_at_first_pull() {
        use std::panic::{catch_unwind, AssertUnwindSafe};

        let seq = Sequence::from(vec![2, 1])
            .order_by(|_: &i32| -> i32 {
                panic!("bad key");
            })
            .into_sequence();
        // The sort now runs inside the producer; the definition and spawn
        // stay quiet and the fault surfaces at the first pull.
        let mut it = seq.iter();
        let unwound = catch_unwind(AssertUnwindSafe(|| it.next()));
        assert!(unwound.is_err());
    }

    #[test]
    fn buffered_sources_sort_without_an_extra_copy() {
        use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

        #[derive(Debug)]
        struct Tracked {
            id: i32,
            clones: Arc<AtomicUsize>,
        }

        impl Clone for Tracked {
            fn clone(&self) -> Self {
                self.clones.fetch_add(1, AtomicOrdering::Relaxed);
                Tracked {
                    id: self.id,
                    clones: Arc::clone(&self.clones),
                }
            }
        }

        let clones = Arc::new(AtomicUsize::new(0));
        let items: Vec<Tracked> = [3, 1, 2]
            .into_iter()
            .map(|id| Tracked {
                id,
                clones: Arc::clone(&clones),
            })
            .collect();

        let sorted = Sequence::from_vec(items).order_by(|t| t.id).to_vec();
        assert_eq!(sorted.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        // Only the three output elements are cloned; the sort itself works
        // over the shared backing store.
        assert_eq!(clones.load(AtomicOrdering::Relaxed), 3);
    }

    #[test]
    fn ordering_is_deferred_until_iteration() {
        use std::sync::{Arc, Mutex};

        let store = Arc::new(Mutex::new(vec![3, 1]));
        let shared = Arc::clone(&store);
        let ordered = Sequence::generate(move |y| {
            let items = shared.lock().unwrap().clone();
            for item in items {
                y.emit(item)?;
            }
            Ok(())
        })
        .order_by(|&n| n);

        assert_eq!(ordered.to_vec(), vec![1, 3]);
        store.lock().unwrap().push(2);
        assert_eq!(ordered.to_vec(), vec![1, 2, 3]);
    }
}
