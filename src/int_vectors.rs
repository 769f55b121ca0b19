//! Top module for integer vectors.
//!
//! # Introduction
//!
//! Let $`A = (a_0, a_1, \dots, a_{n-1})`$ be a sequence of $`n`$ unsigned integers.
//! Our integer vectors support the following queries:
//!
//! - $`\textrm{Access}(i)`$ returns $`a_i`$ (implemented by [`Access`]).
//! - $`\textrm{Update}(i, x)`$ modifies $`a_i \gets x`$.
//! - $`\textrm{Insert}(i, x)`$ and $`\textrm{Remove}(i)`$ shift the following integers.
//!
//! # Data structures
//!
//! | Implementation | [Access](Access) | Update | Insert/Remove | Memory (bits) |
//! | --- | :-: | :-: | :-: | :-: |
//! | [`TightVector`] | $`O(1)`$ | $`O(1)`$ | $`O(n)`$ | $`n w`$ |
//! | [`RunLengthVec`] | $`O(\lg r)`$ | $`O(r)`$ | $`O(r)`$ | $`r (w + 64)`$ |
//!
//! Here $`w`$ is the number of bits per stored integer and $`r`$ is the number of runs,
//! i.e., maximal blocks of equal consecutive integers.
//!
//! ## Plain format
//!
//! [`TightVector`] represents each integer in a fixed number of bits, chosen
//! at construction. Values that do not fit are rejected rather than widened;
//! [`TightVector::repack()`] changes the width explicitly.
//!
//! ## Run-length format
//!
//! [`RunLengthVec`] stores one value and one cumulative end offset per run,
//! so long runs cost constant space. Run values can be kept in a
//! [`TightVector`] of a fixed width with [`RunLengthVec::with_tight_values()`].
//!
//! # Examples
//!
//! [`prelude`] imports the common traits.
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use tightpack::int_vectors::{RunLengthVec, TightVector, prelude::*};
//!
//! let tv = TightVector::build_from_slice(&[5, 5, 5, 0, 334])?;
//! let rl = RunLengthVec::build_from_slice(&[5, 5, 5, 0, 334])?;
//!
//! assert_eq!(tv.num_vals(), rl.num_vals());
//! assert_eq!(rl.num_runs(), 3);
//!
//! for i in 0..tv.num_vals() {
//!     assert_eq!(tv.access(i), rl.access(i));
//! }
//! assert_eq!(rl.access(5), None);
//! # Ok(())
//! # }
//! ```
pub mod prelude;
pub mod run_length;
pub mod tight_vector;

pub use run_length::{Run, RunLengthVec};
pub use tight_vector::TightVector;

use num_traits::ToPrimitive;

use crate::error::Result;

/// Interface for building integer vectors.
pub trait Build {
    /// Creates a new vector from a slice of integers `vals`.
    ///
    /// # Arguments
    ///
    ///  - `vals`: Slice of integers to be stored.
    ///
    /// # Errors
    ///
    /// An error is returned if `vals` contains an integer that cannot be cast to [`u64`].
    fn build_from_slice<T>(vals: &[T]) -> Result<Self>
    where
        T: ToPrimitive + std::fmt::Display,
        Self: Sized;
}

/// Interface for reporting basic statistics of integer vectors.
pub trait NumVals {
    /// Returns the number of integers stored.
    fn num_vals(&self) -> usize;
}

/// Interface for accessing elements on integer vectors.
pub trait Access {
    /// Returns the `pos`-th integer, or [`None`] if out of bounds.
    fn access(&self, pos: usize) -> Option<u64>;
}
