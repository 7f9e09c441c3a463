//! Re-iterable sequence definitions.
//!
//! A [`Sequence`] pairs a production routine with the pull-iteration contract
//! from `sequin-core`. Cloning a sequence shares the definition, not any
//! produced values; every call to [`Sequence::iter`] starts an independent
//! producer thread running the routine from scratch.

use std::sync::Arc;

use sequin_core::{Emitter, Flow, Generator, Result, SequinError};

pub(crate) type Routine<T> = Arc<dyn Fn(&Emitter<T>) -> Flow + Send + Sync>;

/// How a sequence produces its elements.
///
/// The `Buffer` form is used when a materialized backing store already
/// exists; ordering and counting reuse it directly instead of going through a
/// producer thread.
pub(crate) enum Source<T> {
    Routine(Routine<T>),
    Buffer(Arc<[T]>),
}

/// A lazily-evaluated, re-iterable sequence of values.
///
/// All adaptor operators are deferred: they capture their source and run it
/// at iteration time. Terminal operators (in [`ops::aggregate`](crate::ops))
/// consume the sequence immediately.
///
/// Element types carry the `Clone + Send + Sync + 'static` bounds throughout:
/// values cross into producer threads, and buffered sources hand out clones
/// per iteration.
pub struct Sequence<T> {
    pub(crate) source: Source<T>,
}

impl<T> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        let source = match &self.source {
            Source::Routine(f) => Source::Routine(Arc::clone(f)),
            Source::Buffer(items) => Source::Buffer(Arc::clone(items)),
        };
        Sequence { source }
    }
}

impl<T: Clone + Send + Sync + 'static> Sequence<T> {
    /// Defines a sequence from a production routine.
    ///
    /// The routine runs on a dedicated thread once per iteration and emits
    /// values through the [`Emitter`]:
    ///
    /// ```
    /// use sequin::Sequence;
    ///
    /// let odds = Sequence::generate(|y| {
    ///     for i in (1..10).step_by(2) {
    ///         y.emit(i)?;
    ///     }
    ///     Ok(())
    /// });
    /// assert_eq!(odds.to_vec(), vec![1, 3, 5, 7, 9]);
    /// ```
    pub fn generate<F>(routine: F) -> Sequence<T>
    where
        F: Fn(&Emitter<T>) -> Flow + Send + Sync + 'static,
    {
        Sequence {
            source: Source::Routine(Arc::new(routine)),
        }
    }

    /// Defines a sequence over a materialized buffer. Each iteration emits
    /// clones of the buffered elements.
    pub fn from_vec(items: Vec<T>) -> Sequence<T> {
        Sequence {
            source: Source::Buffer(items.into()),
        }
    }

    /// The empty sequence.
    pub fn empty() -> Sequence<T> {
        Sequence {
            source: Source::Buffer(Arc::from(Vec::new())),
        }
    }

    /// Repeats `value` `count` times.
    pub fn repeat(value: T, count: usize) -> Sequence<T> {
        Sequence::generate(move |y| {
            for _ in 0..count {
                y.emit(value.clone())?;
            }
            Ok(())
        })
    }

    /// Starts a fresh iteration: spawns the producer thread and returns the
    /// pull iterator. Close it (or let it drop) to release the thread.
    pub fn iter(&self) -> Generator<T> {
        match &self.source {
            Source::Routine(f) => {
                let routine = Arc::clone(f);
                Generator::spawn(move |y| routine(y))
            }
            Source::Buffer(items) => {
                let items = Arc::clone(items);
                Generator::spawn(move |y| {
                    for item in items.iter() {
                        y.emit(item.clone())?;
                    }
                    Ok(())
                })
            }
        }
    }

    /// Materializes the current contents into an owned buffer, for callers
    /// that mutate or hand it out directly.
    pub(crate) fn snapshot(&self) -> Vec<T> {
        match &self.source {
            Source::Buffer(items) => items.to_vec(),
            Source::Routine(_) => self.iter().collect(),
        }
    }

    /// Materializes the current contents into a shared buffer, reusing an
    /// existing backing store without copying its elements.
    pub(crate) fn snapshot_shared(&self) -> Arc<[T]> {
        match &self.source {
            Source::Buffer(items) => Arc::clone(items),
            Source::Routine(_) => self.iter().collect::<Vec<_>>().into(),
        }
    }

    /// Length without iteration when the source is already materialized.
    pub(crate) fn known_len(&self) -> Option<usize> {
        match &self.source {
            Source::Buffer(items) => Some(items.len()),
            Source::Routine(_) => None,
        }
    }

    /// Random access without iteration when the source is already
    /// materialized.
    pub(crate) fn buffered_get(&self, index: usize) -> Option<T> {
        match &self.source {
            Source::Buffer(items) => items.get(index).cloned(),
            Source::Routine(_) => None,
        }
    }
}

impl Sequence<i32> {
    /// The integers `start, start + 1, ..` — `count` of them.
    ///
    /// Fails eagerly, before any thread starts, if the range would run past
    /// `i32::MAX`.
    pub fn range(start: i32, count: u32) -> Result<Sequence<i32>> {
        let last = i64::from(start) + i64::from(count) - 1;
        if last > i64::from(i32::MAX) {
            return Err(SequinError::InvalidArgument(format!(
                "range of {count} from {start} exceeds i32::MAX"
            )));
        }
        // Walk in i64 so a count past i32::MAX does not truncate the bound.
        Ok(Sequence::generate(move |y| {
            for i in i64::from(start)..=last {
                y.emit(i as i32)?;
            }
            Ok(())
        }))
    }
}

impl<T: Clone + Send + Sync + 'static> From<Vec<T>> for Sequence<T> {
    fn from(items: Vec<T>) -> Self {
        Sequence::from_vec(items)
    }
}

impl<T: Clone + Send + Sync + 'static> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Sequence::from_vec(iter.into_iter().collect())
    }
}

impl<T: Clone + Send + Sync + 'static> IntoIterator for &Sequence<T> {
    type Item = T;
    type IntoIter = Generator<T>;

    fn into_iter(self) -> Generator<T> {
        self.iter()
    }
}

impl<T> std::fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Source::Routine(_) => f.write_str("Sequence(<routine>)"),
            Source::Buffer(items) => write!(f, "Sequence(<buffer of {}>)", items.len()),
        }
    }
}
