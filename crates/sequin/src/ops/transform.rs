//! Restriction and projection operators.

use crate::sequence::Sequence;

impl<T: Clone + Send + Sync + 'static> Sequence<T> {
    /// Keeps the elements satisfying `predicate`.
    pub fn filter<P>(self, predicate: P) -> Sequence<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Sequence::generate(move |y| {
            for item in self.iter() {
                if predicate(&item) {
                    y.emit(item)?;
                }
            }
            Ok(())
        })
    }

    /// Keeps the elements whose value and position satisfy `predicate`.
    pub fn filter_indexed<P>(self, predicate: P) -> Sequence<T>
    where
        P: Fn(&T, usize) -> bool + Send + Sync + 'static,
    {
        Sequence::generate(move |y| {
            for (index, item) in self.iter().enumerate() {
                if predicate(&item, index) {
                    y.emit(item)?;
                }
            }
            Ok(())
        })
    }

    /// Projects each element through `selector`.
    pub fn map<R, F>(self, selector: F) -> Sequence<R>
    where
        R: Clone + Send + Sync + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        Sequence::generate(move |y| {
            for item in self.iter() {
                y.emit(selector(item))?;
            }
            Ok(())
        })
    }

    /// Projects each element and its position through `selector`.
    pub fn map_indexed<R, F>(self, selector: F) -> Sequence<R>
    where
        R: Clone + Send + Sync + 'static,
        F: Fn(T, usize) -> R + Send + Sync + 'static,
    {
        Sequence::generate(move |y| {
            for (index, item) in self.iter().enumerate() {
                y.emit(selector(item, index))?;
            }
            Ok(())
        })
    }

    /// Projects each element to a sub-collection and flattens the results.
    pub fn flat_map<R, I, F>(self, selector: F) -> Sequence<R>
    where
        R: Clone + Send + Sync + 'static,
        I: IntoIterator<Item = R>,
        F: Fn(T) -> I + Send + Sync + 'static,
    {
        Sequence::generate(move |y| {
            for item in self.iter() {
                for sub in selector(item) {
                    y.emit(sub)?;
                }
            }
            Ok(())
        })
    }

    /// This sequence followed by `other`.
    pub fn concat(self, other: Sequence<T>) -> Sequence<T> {
        Sequence::generate(move |y| {
            for item in self.iter() {
                y.emit(item)?;
            }
            for item in other.iter() {
                y.emit(item)?;
            }
            Ok(())
        })
    }

    /// Pairs this sequence with `other` through `selector`, ending with the
    /// shorter of the two.
    pub fn zip<S, R, F>(self, other: Sequence<S>, selector: F) -> Sequence<R>
    where
        S: Clone + Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
        F: Fn(T, S) -> R + Send + Sync + 'static,
    {
        Sequence::generate(move |y| {
            let mut left = self.iter();
            let mut right = other.iter();
            while let (Some(a), Some(b)) = (left.next(), right.next()) {
                y.emit(selector(a, b))?;
            }
            Ok(())
        })
    }

    /// The elements in reverse order. Materializes the source per iteration.
    pub fn reverse(self) -> Sequence<T> {
        Sequence::generate(move |y| {
            let mut items = self.snapshot();
            items.reverse();
            for item in items {
                y.emit(item)?;
            }
            Ok(())
        })
    }

    /// The source itself, or a single `default` element when it is empty.
    pub fn default_if_empty(self, default: T) -> Sequence<T> {
        Sequence::generate(move |y| {
            let mut source = self.iter();
            match source.next() {
                None => y.emit(default.clone()),
                Some(first) => {
                    y.emit(first)?;
                    for item in source {
                        y.emit(item)?;
                    }
                    Ok(())
                }
            }
        })
    }
}
