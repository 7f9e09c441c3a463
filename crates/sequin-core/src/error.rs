//! Error types for sequin sequences

use thiserror::Error;

/// Main error type for sequence operations.
///
/// Faults raised inside a production routine do not appear here: a producer
/// panic is re-raised on the consumer thread at its next blocking call, and
/// early termination via [`Emitter::stop`](crate::Emitter::stop) is a normal
/// path to completion, not an error.
#[derive(Debug, Error)]
pub enum SequinError {
    /// Malformed operator configuration, detected eagerly at construction
    /// before any producer thread starts
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A terminal operation required at least one element
    #[error("sequence contains no elements")]
    NoElements,

    /// No element satisfied the predicate
    #[error("no element satisfies the predicate")]
    NoMatch,

    /// A single-element operation found more than one candidate
    #[error("sequence contains more than one matching element")]
    MultipleElements,

    /// An index-based operation ran past the end of the sequence
    #[error("index {0} is out of range")]
    IndexOutOfRange(usize),
}

/// Result type alias for sequence operations
pub type Result<T> = std::result::Result<T, SequinError>;
