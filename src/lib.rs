//! # `tightpack`: Bit-packed integer containers and interval sets in Rust
//!
//! `tightpack` contains a few space-conscious containers for integers and ranges.
//!
//! ## Data structures
//!
//! - [`TightVector`]
//!   - Updatable vector of unsigned or signed integers, each represented in a fixed number of bits.
//! - [`RunLengthVec`]
//!   - Run-length encoded integer sequence supporting update, insertion, and removal.
//! - [`Interval`]
//!   - Numeric range with independently open or closed endpoints.
//! - [`IntervalSet`]
//!   - Sorted set of disjoint intervals with merging insertion and splitting removal.
//!
//! [`utils`] provides the bit-width helpers used to size a [`TightVector`].
//!
//! ## Mutation and cursors
//!
//! Borrowing iterators keep their container immutable while alive. Detached
//! cursors, such as [`tight_vector::Cursor`](int_vectors::tight_vector::Cursor),
//! hold no borrow and fail with [`Error::InvalidatedIterator`] once the container
//! has been structurally modified.
//!
//! ## Logging
//!
//! Containers log nothing unless a [`log::LogSink`] is attached. With the
//! default `tracing` feature, [`log::TracingSink`] forwards to [`tracing`](https://docs.rs/tracing).
//!
//! ## Limitation
//!
//! This library is designed to run on 64-bit machines.
#![deny(missing_docs)]

#[cfg(not(target_pointer_width = "64"))]
compile_error!("`target_pointer_width` must be 64");

pub mod bit_vectors;
pub mod error;
pub mod generation;
pub mod int_vectors;
pub mod intervals;
pub mod log;
pub mod serial;
pub mod utils;

pub use error::{Error, Result};
pub use int_vectors::{RunLengthVec, TightVector};
pub use intervals::{Interval, IntervalSet};
pub use serial::Serializable;
