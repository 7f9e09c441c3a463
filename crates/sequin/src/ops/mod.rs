//! Query operators over [`Sequence`](crate::Sequence).
//!
//! All adaptors here are mechanical consumers of the generator protocol: each
//! one wraps its source in a new production routine that runs at iteration
//! time and propagates downstream cancellation through `?` on every emit.
//! Terminal operators live in [`aggregate`] and consume the sequence on the
//! calling thread.

pub mod aggregate;
pub mod grouping;
pub mod join;
pub mod partition;
pub mod set;
pub mod transform;
