//! Generation counters for detecting structural mutation.
//!
//! Borrowing iterators such as [`TightVector::iter()`](crate::int_vectors::TightVector::iter)
//! are protected by the borrow checker. Cursors, on the other hand, hold no
//! borrow and may be kept across mutations; they capture the owner's
//! [`Generation`] when created and refuse to read once it has moved.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};

static NEXT: AtomicU64 = AtomicU64::new(0);

/// Version stamp of a data structure.
///
/// Stamps are drawn from a process-wide counter, so two structures never
/// reach the same stamp through different mutations. A clone starts with
/// the stamp of its source and leaves it on its first structural mutation.
///
/// Owners call [`Generation::bump()`] on every structural mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// Creates a fresh generation.
    pub fn new() -> Self {
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw counter.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Moves to a fresh stamp.
    #[inline(always)]
    pub fn bump(&mut self) {
        *self = Self::new();
    }

    /// Checks that `current` is still this generation.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidatedIterator`] if the owner has moved on.
    #[inline(always)]
    pub fn ensure(self, current: Self) -> Result<()> {
        if self == current {
            Ok(())
        } else {
            Err(Error::InvalidatedIterator {
                expected: self.0,
                found: current.0,
            })
        }
    }
}

impl Default for Generation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure() {
        let mut g = Generation::new();
        let snapshot = g;
        assert_eq!(snapshot.ensure(g), Ok(()));
        g.bump();
        assert_eq!(
            snapshot.ensure(g),
            Err(Error::InvalidatedIterator {
                expected: snapshot.get(),
                found: g.get()
            })
        );
        assert_ne!(snapshot, g);
    }

    #[test]
    fn test_diverged_copies_differ() {
        let mut a = Generation::new();
        let mut b = a;
        a.bump();
        b.bump();
        assert_ne!(a, b);
        assert!(a.ensure(b).is_err());
        assert_ne!(Generation::new(), Generation::default());
    }
}
