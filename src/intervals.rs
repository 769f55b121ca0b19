//! Top module for intervals.
//!
//! [`Interval`] is a range over a primitive integer type whose endpoints are
//! independently open or closed. Endpoints are points of a dense line, so
//! `[1, 2)` and `[2, 3]` touch while `[1, 2)` and `(2, 3]` leave the point 2
//! uncovered.
//!
//! [`IntervalSet`] keeps a sorted list of pairwise disjoint, non-touching
//! intervals with logarithmic point queries.
//!
//! # Examples
//!
//! ```
//! use tightpack::intervals::{Interval, IntervalSet};
//!
//! let mut set = IntervalSet::new();
//! set.insert(Interval::closed(1, 10));
//! set.remove(Interval::closed(2, 4));
//!
//! let members: Vec<_> = set.iter().map(|iv| iv.to_string()).collect();
//! assert_eq!(members, vec!["[1, 2)", "(4, 10]"]);
//! ```
pub mod interval;
pub mod interval_set;

pub use interval::Interval;
pub use interval_set::{IntervalSet, QueryRange, RangeCursor};
