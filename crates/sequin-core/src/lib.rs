//! Sequin Core - Thread-backed generator protocol
//!
//! This crate provides the mechanism that makes deferred execution possible
//! for the sequin query layer:
//! - A rendezvous channel pair for strict producer/consumer handshaking
//! - A generator instance that runs a production routine on its own thread
//!   and exposes it through a pull iterator
//! - The shared error taxonomy for query operations
//!
//! Concurrency here exists solely to emulate single-threaded suspendable
//! generation; nothing in this crate parallelizes work.

mod channel;
pub mod error;
pub mod generator;

pub use error::{Result, SequinError};
pub use generator::{Emitter, Flow, Generator, Interrupted};
