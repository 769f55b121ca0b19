//! Top module for bit vectors.
//!
//! [`BitVector`] is the backing buffer of [`TightVector`](crate::int_vectors::TightVector).
//! Bits are stored in `u64` words, and chunks of up to [`WORD_LEN`] bits are
//! read and written with masked shifts over at most two adjacent words.
pub mod bit_vector;

pub use bit_vector::{BitVector, WORD_LEN};
