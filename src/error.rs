//! Error types shared by every data structure in the crate.

use thiserror::Error;

/// Result type used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors reported by the containers and interval types.
///
/// Every variant is a local condition detected by the operation that
/// returns it. Nothing is clamped or corrected behind the caller's back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A position was not smaller than the number of stored elements.
    #[error("index must be less than len={len}, but got {index}.")]
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Number of elements at the time of the request.
        len: usize,
    },

    /// A value needs more bits than the container stores per element.
    #[error("value must fit in width={width} bits, but got {value}.")]
    ValueOverflow {
        /// Rejected value.
        value: u64,
        /// Bits per element of the container.
        width: usize,
    },

    /// A value lies outside the range a container or conversion can represent.
    #[error("value must be in {min}..={max}, but got {value}.")]
    ValueOutOfRange {
        /// Rendering of the rejected value.
        value: String,
        /// Smallest representable value.
        min: String,
        /// Largest representable value.
        max: String,
    },

    /// The requested bits per element cannot be represented in a machine word.
    #[error("width must be in 0..={max}, but got {width}.")]
    UnsupportedWidth {
        /// Requested width.
        width: usize,
        /// Largest supported width.
        max: usize,
    },

    /// A run value does not fit the width of the tight storage backing the runs.
    #[error("run value {value} exceeds the {width}-bit run storage.")]
    CapacityExceeded {
        /// Rejected run value.
        value: u64,
        /// Bits per run value of the backing storage.
        width: usize,
    },

    /// Two intervals neither overlap nor touch at a shared point.
    #[error("intervals {left} and {right} are disjoint.")]
    Disjoint {
        /// Rendering of the left operand.
        left: String,
        /// Rendering of the right operand.
        right: String,
    },

    /// An arithmetic result left the domain of the endpoint type.
    #[error("arithmetic overflow in {op}.")]
    Overflow {
        /// Operation that overflowed.
        op: &'static str,
    },

    /// A cursor outlived a structural mutation of the structure it walks.
    #[error("cursor created at generation {expected} used at generation {found}.")]
    InvalidatedIterator {
        /// Generation captured when the cursor was created.
        expected: u64,
        /// Generation of the owner when the cursor was used.
        found: u64,
    },

    /// An unsigned computation received a negative input.
    #[error("value must be non-negative, but got {value}.")]
    NegativeValue {
        /// Rendering of the negative input.
        value: String,
    },
}
