//! Sequin - Fluent, lazily-evaluated collection queries
//!
//! This crate provides the query layer over `sequin-core`'s thread-backed
//! generator protocol:
//! - [`Sequence`]: a cheaply-clonable, re-iterable generator definition with
//!   fluent operators (filter, project, join, group, set algebra)
//! - [`OrderedSequence`]: deferred, chainable, stable multi-key ordering
//! - [`Lookup`] and [`Grouping`]: insertion-ordered multimap containers
//!
//! Every lazy operator is deferred: it reads its source at iteration time,
//! not at definition time, so a sequence defined over shared state reflects
//! that state as of each fresh iteration.
//!
//! ```
//! use sequin::Sequence;
//!
//! let words = Sequence::from(vec!["ox", "owl", "ant", "bee", "elk"]);
//! let short: Vec<_> = words
//!     .filter(|w| w.len() == 3)
//!     .order_by(|w| *w)
//!     .iter()
//!     .collect();
//! assert_eq!(short, vec!["ant", "bee", "elk", "owl"]);
//! ```

pub mod lookup;
pub mod ops;
pub mod ordered;
pub mod sequence;

pub use lookup::{Grouping, Lookup};
pub use ordered::OrderedSequence;
pub use sequence::Sequence;
pub use sequin_core::{Emitter, Flow, Generator, Interrupted, Result, SequinError};
