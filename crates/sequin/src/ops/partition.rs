//! Partitioning operators: take, skip, and their predicate forms.
//!
//! The bounded operators end production through
//! [`Emitter::stop`](sequin_core::Emitter::stop), so the upstream routine is
//! unwound at its suspension point and never computes past the cut.

use crate::sequence::Sequence;

impl<T: Clone + Send + Sync + 'static> Sequence<T> {
    /// At most the first `count` elements.
    pub fn take(self, count: usize) -> Sequence<T> {
        Sequence::generate(move |y| {
            if count == 0 {
                return Ok(());
            }
            for (taken, item) in self.iter().enumerate() {
                y.emit(item)?;
                if taken + 1 == count {
                    return y.stop();
                }
            }
            Ok(())
        })
    }

    /// Elements up to, and not including, the first that fails `predicate`.
    pub fn take_while<P>(self, predicate: P) -> Sequence<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Sequence::generate(move |y| {
            for item in self.iter() {
                if !predicate(&item) {
                    return y.stop();
                }
                y.emit(item)?;
            }
            Ok(())
        })
    }

    /// Everything after the first `count` elements.
    pub fn skip(self, count: usize) -> Sequence<T> {
        Sequence::generate(move |y| {
            for item in self.iter().skip(count) {
                y.emit(item)?;
            }
            Ok(())
        })
    }

    /// Everything from the first element that fails `predicate` onward.
    pub fn skip_while<P>(self, predicate: P) -> Sequence<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Sequence::generate(move |y| {
            let mut skipping = true;
            for item in self.iter() {
                if skipping && predicate(&item) {
                    continue;
                }
                skipping = false;
                y.emit(item)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn take_bounds_the_sequence() {
        let seq = Sequence::from(vec![1, 2, 3, 4]);
        assert_eq!(seq.clone().take(2).to_vec(), vec![1, 2]);
        assert_eq!(seq.clone().take(0).to_vec(), Vec::<i32>::new());
        assert_eq!(seq.take(10).to_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn take_cancels_upstream_work() {
        let produced = Arc::new(AtomicUsize::new(0));
        let marker = Arc::clone(&produced);
        let seq = Sequence::generate(move |y| {
            for i in 0.. {
                marker.fetch_add(1, Ordering::SeqCst);
                y.emit(i)?;
            }
            Ok(())
        });
        assert_eq!(seq.take(3).to_vec(), vec![0, 1, 2]);
        // The producer may be one step ahead at most.
        assert!(produced.load(Ordering::SeqCst) <= 4);
    }

    #[test]
    fn take_while_stops_at_the_first_failure() {
        let seq = Sequence::from(vec![1, 2, 3, 10, 2, 1]);
        assert_eq!(seq.take_while(|&n| n < 5).to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn skip_variants() {
        let seq = Sequence::from(vec![1, 2, 3, 4, 1]);
        assert_eq!(seq.clone().skip(2).to_vec(), vec![3, 4, 1]);
        assert_eq!(seq.clone().skip(9).to_vec(), Vec::<i32>::new());
        assert_eq!(seq.skip_while(|&n| n < 3).to_vec(), vec![3, 4, 1]);
    }
}
