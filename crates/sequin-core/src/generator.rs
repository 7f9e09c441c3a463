//! Generator instances: coroutine emulation over two handshaking threads.
//!
//! Stable Rust has no native generator syntax, so suspendable production is
//! emulated with a dedicated producer thread and the rendezvous pair from
//! [`channel`](crate::channel). The producer suspends inside
//! [`Emitter::emit`]; the consumer suspends inside [`Generator::has_next`].
//! No other blocking exists here.
//!
//! Threads are resources: every generator must be closed to reclaim its
//! producer. [`Generator`] closes itself on drop, so ordinary scoped use is
//! leak-free. A producer stuck in user logic that never reaches a suspension
//! point cannot be interrupted and leaks until process exit; that is a
//! documented limitation of this layer, not a hard failure.

use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crate::channel::{self, ConsumerEnd, Message};

/// Signal that a production routine must unwind to completion.
///
/// Returned (inside `Err`) by [`Emitter::emit`] when the consumer has closed,
/// and by [`Emitter::stop`] unconditionally. Propagating it with `?` unwinds
/// the routine straight to the `Completed` message; it is never surfaced to
/// the consumer as an error.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("production routine interrupted")]
pub struct Interrupted;

/// Outcome of a producer-side call; propagate with `?`.
///
/// `Ok(())` means the routine may keep producing; `Err(Interrupted)` means it
/// must unwind now.
pub type Flow = std::result::Result<(), Interrupted>;

/// Producer-side handle passed to a production routine.
///
/// A production routine is ordinary straight-line or looping logic that calls
/// [`emit`](Emitter::emit) once per value and returns when done:
///
/// ```
/// use sequin_core::{Emitter, Generator};
///
/// let gen = Generator::spawn(|y: &Emitter<i32>| {
///     for i in 1..=3 {
///         y.emit(i * 10)?;
///     }
///     Ok(())
/// });
/// assert_eq!(gen.collect::<Vec<_>>(), vec![10, 20, 30]);
/// ```
pub struct Emitter<T> {
    end: channel::ProducerEnd<T>,
}

impl<T> Emitter<T> {
    /// Publishes one value to the consumer, then blocks until the consumer
    /// requests the next one. This is the generator's suspend point.
    ///
    /// Returns `Err(Interrupted)` once the consumer has closed; the routine
    /// should propagate it with `?` so the producer thread is released.
    pub fn emit(&self, value: T) -> Flow {
        if self.end.publish(Message::Value(value)).is_err() {
            return Err(Interrupted);
        }
        if self.end.await_token().is_err() {
            return Err(Interrupted);
        }
        Ok(())
    }

    /// Ends production immediately, as if the routine had returned.
    ///
    /// Always returns `Err(Interrupted)`; call it as `return y.stop();` (or
    /// `y.stop()?;`) so the routine unwinds without performing any further
    /// work. Bounded operators such as take-while use this instead of
    /// threading a flag through every step.
    pub fn stop(&self) -> Flow {
        Err(Interrupted)
    }
}

/// One live producer/consumer pairing bound to a single iteration.
///
/// Created ("iterated") by [`Generator::spawn`]; exhausted, closed, or
/// dropped exactly once. Consumed through the standard [`Iterator`] contract.
/// Values arrive in exact emission order.
pub struct Generator<T> {
    link: Option<ConsumerEnd<T>>,
    current: Option<T>,
    on_close: Vec<Box<dyn FnOnce() + Send>>,
}

impl<T: Send + 'static> Generator<T> {
    /// Starts a new iteration of `routine` on a dedicated producer thread and
    /// returns the consumer handle.
    ///
    /// The routine does not run until the first value is requested, and it
    /// observes the state of whatever it closes over at that moment, not at
    /// definition time. Spawning the same definition again is a fully
    /// independent iteration with its own thread and channels.
    pub fn spawn<F>(routine: F) -> Generator<T>
    where
        F: FnOnce(&Emitter<T>) -> Flow + Send + 'static,
    {
        let (producer, consumer) = channel::handshake();
        thread::spawn(move || {
            let emitter = Emitter { end: producer };
            // Hold production until the consumer asks for the first value; a
            // generator that is dropped unconsumed never runs its routine.
            if emitter.end.await_token().is_err() {
                return;
            }
            tracing::trace!("producer thread running");
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| routine(&emitter)));
            // Ok covers both a finished routine and an Interrupted unwind;
            // either way the sequence is complete.
            let terminal = match outcome {
                Ok(_) => Message::Completed,
                Err(payload) => {
                    tracing::debug!("producer fault, re-raising on consumer thread");
                    Message::Fault(payload)
                }
            };
            // Fails only when the consumer closed first; nothing to do then.
            let _ = emitter.end.publish(terminal);
        });
        Generator {
            link: Some(consumer),
            current: None,
            on_close: Vec::new(),
        }
    }

    /// Returns true if another value is available, pulling one from the
    /// producer if none is buffered. Idempotent until the buffered value is
    /// consumed by `next`.
    ///
    /// A fault raised inside the production routine is re-raised here, on the
    /// consumer thread.
    pub fn has_next(&mut self) -> bool {
        if self.current.is_some() {
            return true;
        }
        let Some(link) = self.link.as_ref() else {
            return false;
        };
        if !link.request() {
            self.close();
            return false;
        }
        match link.receive() {
            Some(Message::Value(value)) => {
                self.current = Some(value);
                true
            }
            Some(Message::Completed) | None => {
                self.close();
                false
            }
            Some(Message::Fault(payload)) => {
                self.close();
                panic::resume_unwind(payload);
            }
        }
    }

}

impl<T> Generator<T> {
    /// Registers a hook to run exactly once when this generator completes or
    /// is closed.
    ///
    /// Tests use this to detect generators that were never released.
    pub fn on_close<F>(&mut self, hook: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_close.push(Box::new(hook));
    }

    /// Abandons the iteration. Idempotent; also runs on drop and on normal
    /// exhaustion.
    ///
    /// Dropping both channel halves wakes a producer blocked at a suspension
    /// point, which then unwinds and exits. A producer that never suspends
    /// again cannot be reclaimed.
    pub fn close(&mut self) {
        if self.link.take().is_some() {
            tracing::trace!("generator closed");
            for hook in self.on_close.drain(..) {
                hook();
            }
        }
    }
}

impl<T: Send + 'static> Iterator for Generator<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.has_next() {
            self.current.take()
        } else {
            None
        }
    }
}

impl<T> Drop for Generator<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T> std::fmt::Debug for Generator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("open", &self.link.is_some())
            .field("buffered", &self.current.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[test]
    fn yields_values_in_emission_order_then_exhausts() {
        let mut gen = Generator::spawn(|y| {
            y.emit("foo")?;
            y.emit("bar")?;
            Ok(())
        });
        assert_eq!(gen.next(), Some("foo"));
        assert_eq!(gen.next(), Some("bar"));
        assert_eq!(gen.next(), None);
        assert_eq!(gen.next(), None);
    }

    #[test]
    fn has_next_is_idempotent_before_next() {
        let mut gen = Generator::spawn(|y| y.emit(42));
        assert!(gen.has_next());
        assert!(gen.has_next());
        assert_eq!(gen.next(), Some(42));
        assert!(!gen.has_next());
    }

    #[test]
    fn respawning_a_definition_replays_it() {
        let routine = |y: &Emitter<&str>| {
            y.emit("foo")?;
            y.emit("bar")?;
            Ok(())
        };
        let first: Vec<_> = Generator::spawn(routine).collect();
        let second: Vec<_> = Generator::spawn(routine).collect();
        assert_eq!(first, vec!["foo", "bar"]);
        assert_eq!(second, vec!["foo", "bar"]);
    }

    #[test]
    fn stop_ends_production_without_running_later_steps() {
        let touched = Arc::new(AtomicUsize::new(0));
        let marker = Arc::clone(&touched);
        let gen = Generator::spawn(move |y| {
            for i in 1..=9 {
                if i == 6 {
                    return y.stop();
                }
                y.emit(i)?;
                marker.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        });
        assert_eq!(gen.collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        // Steps 6..=9 never ran.
        assert_eq!(touched.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn routine_does_not_run_until_first_request() {
        let ran = Arc::new(AtomicBool::new(false));
        let marker = Arc::clone(&ran);
        let mut gen = Generator::spawn(move |y| {
            marker.store(true, Ordering::SeqCst);
            y.emit(1)
        });
        std::thread::sleep(Duration::from_millis(50));
        assert!(!ran.load(Ordering::SeqCst));
        assert!(gen.has_next());
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn close_mid_iteration_releases_the_producer() {
        // The guard drops when the routine unwinds, even though the routine
        // itself would emit forever.
        struct Released(mpsc::Sender<()>);
        impl Drop for Released {
            fn drop(&mut self) {
                let _ = self.0.send(());
            }
        }

        let (tx, rx) = mpsc::channel();
        let mut gen = Generator::spawn(move |y| {
            let _guard = Released(tx);
            let mut i = 0u64;
            loop {
                y.emit(i)?;
                i += 1;
            }
        });
        assert_eq!(gen.next(), Some(0));
        assert_eq!(gen.next(), Some(1));
        gen.close();
        rx.recv_timeout(Duration::from_secs(5))
            .expect("producer thread was not released by close()");
    }

    #[test]
    fn drop_closes_and_runs_hooks() {
        let closed = Arc::new(AtomicBool::new(false));
        let marker = Arc::clone(&closed);
        {
            let mut gen = Generator::spawn(|y| y.emit(1));
            gen.on_close(move || marker.store(true, Ordering::SeqCst));
            assert_eq!(gen.next(), Some(1));
            // Dropped before exhaustion.
        }
        assert!(closed.load(Ordering::SeqCst));
    }

    #[test]
    fn close_hooks_run_exactly_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let marker = Arc::clone(&runs);
        let mut gen = Generator::spawn(|y| y.emit(1));
        gen.on_close(move || {
            marker.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(gen.next(), Some(1));
        assert_eq!(gen.next(), None); // exhaustion closes
        gen.close();
        drop(gen);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn producer_panic_is_reraised_on_the_consumer() {
        let mut gen = Generator::spawn(|y| {
            y.emit(1)?;
            panic!("boom");
        });
        assert_eq!(gen.next(), Some(1));
        let fault = panic::catch_unwind(AssertUnwindSafe(|| gen.next()))
            .expect_err("fault should propagate");
        let message = fault.downcast_ref::<&str>().copied();
        assert_eq!(message, Some("boom"));
        // The generator is closed after a fault.
        assert!(!gen.has_next());
    }

    #[test]
    fn values_delivered_before_a_fault_are_kept() {
        let mut gen = Generator::spawn(|y| {
            y.emit(10)?;
            y.emit(20)?;
            panic!("late fault");
        });
        let mut seen = Vec::new();
        seen.push(gen.next().unwrap());
        seen.push(gen.next().unwrap());
        assert_eq!(seen, vec![10, 20]);
        assert!(panic::catch_unwind(AssertUnwindSafe(|| gen.next())).is_err());
    }

    #[test]
    fn concurrent_iterations_are_independent() {
        let routine = |y: &Emitter<u32>| {
            for i in 0..100 {
                y.emit(i)?;
            }
            Ok(())
        };
        let mut a = Generator::spawn(routine);
        let mut b = Generator::spawn(routine);
        for expected in 0..100 {
            assert_eq!(a.next(), Some(expected));
            assert_eq!(b.next(), Some(expected));
        }
        assert_eq!(a.next(), None);
        assert_eq!(b.next(), None);
    }
}
