//! Numeric range with independently open or closed endpoints.
use std::cmp::Ordering;
use std::fmt;

use num_traits::PrimInt;
use smallvec::{smallvec, SmallVec};

use crate::error::{Error, Result};

/// Position of an endpoint on the line.
///
/// An open lower endpoint at `v` starts just after `v` and an open upper
/// endpoint at `v` ends just before it, so every endpoint is `(v, offset)` with
/// `offset` in `{-1, 0, 1}` and tuples compare lexicographically.
pub(crate) type Key<T> = (T, i8);

/// Lower and upper candidate bounds, each with its closure.
type Corner<T> = ((T, bool), (T, bool));

/// Numeric range with independently open or closed endpoints.
///
/// The endpoints are points of a dense line: `(1, 2)` is not empty even for
/// integer `T`, and no rounding to neighbouring integers takes place.
/// Every empty interval is stored in one canonical form, so two intervals are
/// equal exactly when they contain the same points.
///
/// Intervals are ordered by lower endpoint, a closed one before an open one
/// at the same value, then by upper endpoint, an open one before a closed one.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use tightpack::intervals::Interval;
///
/// let a = Interval::closed(1, 5);
/// let b = Interval::closed(5, 9);
/// assert_eq!(a.union(&b)?, Interval::closed(1, 9));
///
/// let c = Interval::closed_open(1, 5);
/// let d = Interval::open_closed(5, 9);
/// assert!(!c.overlaps(&d));
/// assert!(c.union(&d).is_err());
/// assert!(c.intersect(&d).is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval<T>
where
    T: PrimInt,
{
    lower: T,
    upper: T,
    lower_closed: bool,
    upper_closed: bool,
}

impl<T> Interval<T>
where
    T: PrimInt,
{
    /// Creates a new interval from both endpoints and their closures.
    ///
    /// The result is the empty interval if no point lies between the endpoints.
    ///
    /// # Examples
    ///
    /// ```
    /// use tightpack::intervals::Interval;
    ///
    /// assert_eq!(Interval::new(1, true, 3, false), Interval::closed_open(1, 3));
    /// assert!(Interval::new(3, true, 1, true).is_empty());
    /// assert!(Interval::new(2, true, 2, false).is_empty());
    /// ```
    pub fn new(lower: T, lower_closed: bool, upper: T, upper_closed: bool) -> Self {
        let iv = Self {
            lower,
            upper,
            lower_closed,
            upper_closed,
        };
        if iv.lower_key() <= iv.upper_key() {
            iv
        } else {
            Self::empty()
        }
    }

    /// Creates `[lower, upper]`.
    pub fn closed(lower: T, upper: T) -> Self {
        Self::new(lower, true, upper, true)
    }

    /// Creates `(lower, upper)`.
    pub fn open(lower: T, upper: T) -> Self {
        Self::new(lower, false, upper, false)
    }

    /// Creates `[lower, upper)`.
    pub fn closed_open(lower: T, upper: T) -> Self {
        Self::new(lower, true, upper, false)
    }

    /// Creates `(lower, upper]`.
    pub fn open_closed(lower: T, upper: T) -> Self {
        Self::new(lower, false, upper, true)
    }

    /// Creates `[value, value]`.
    pub fn point(value: T) -> Self {
        Self::closed(value, value)
    }

    /// Creates the empty interval.
    pub fn empty() -> Self {
        Self {
            lower: T::max_value(),
            upper: T::min_value(),
            lower_closed: false,
            upper_closed: false,
        }
    }

    /// Returns the lower endpoint, which is meaningless for the empty interval.
    pub const fn lower(&self) -> T {
        self.lower
    }

    /// Returns the upper endpoint, which is meaningless for the empty interval.
    pub const fn upper(&self) -> T {
        self.upper
    }

    /// Checks if the lower endpoint belongs to the interval.
    pub const fn is_lower_closed(&self) -> bool {
        self.lower_closed
    }

    /// Checks if the upper endpoint belongs to the interval.
    pub const fn is_upper_closed(&self) -> bool {
        self.upper_closed
    }

    /// Checks if the interval contains no point.
    pub fn is_empty(&self) -> bool {
        self.lower_key() > self.upper_key()
    }

    /// Checks if `value` lies in the interval.
    pub fn contains(&self, value: T) -> bool {
        let key = (value, 0);
        self.lower_key() <= key && key <= self.upper_key()
    }

    /// Checks if every point of `other` lies in the interval.
    ///
    /// The empty interval is contained in every interval.
    pub fn contains_interval(&self, other: &Self) -> bool {
        if other.is_empty() {
            return true;
        }
        self.lower_key() <= other.lower_key() && other.upper_key() <= self.upper_key()
    }

    /// Checks if the two intervals share at least one point.
    pub fn overlaps(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let (lo, hi) = self.gap_key(other);
        lo <= hi
    }

    /// Checks if the union of the two intervals is a single interval.
    ///
    /// This holds when they overlap, or when they touch at a value that
    /// belongs to at least one of them. The empty interval is mergeable with
    /// every interval.
    ///
    /// # Examples
    ///
    /// ```
    /// use tightpack::intervals::Interval;
    ///
    /// assert!(Interval::closed(1, 3).is_mergeable(&Interval::open(3, 6)));
    /// assert!(Interval::closed_open(1, 3).is_mergeable(&Interval::closed(3, 6)));
    /// assert!(!Interval::closed_open(1, 3).is_mergeable(&Interval::open_closed(3, 6)));
    /// assert!(!Interval::closed(1, 2).is_mergeable(&Interval::closed(3, 4)));
    /// ```
    pub fn is_mergeable(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return true;
        }
        let (lo, hi) = self.gap_key(other);
        match lo.0.cmp(&hi.0) {
            Ordering::Less => true,
            Ordering::Equal => !(lo.1 == 1 && hi.1 == -1),
            Ordering::Greater => false,
        }
    }

    /// Returns the union of the two intervals.
    ///
    /// # Errors
    ///
    /// [`Error::Disjoint`] if the intervals are not [mergeable](Self::is_mergeable).
    pub fn union(&self, other: &Self) -> Result<Self>
    where
        T: fmt::Display,
    {
        if self.is_mergeable(other) {
            Ok(self.hull(other))
        } else {
            Err(Error::Disjoint {
                left: self.to_string(),
                right: other.to_string(),
            })
        }
    }

    /// Returns the points shared by the two intervals, or the empty interval.
    ///
    /// # Examples
    ///
    /// ```
    /// use tightpack::intervals::Interval;
    ///
    /// let a = Interval::closed(1, 5);
    /// let b = Interval::open(3, 8);
    /// assert_eq!(a.intersect(&b), Interval::open_closed(3, 5));
    /// ```
    pub fn intersect(&self, other: &Self) -> Self {
        if self.is_empty() || other.is_empty() {
            return Self::empty();
        }
        let (lo, hi) = self.gap_key(other);
        Self::from_keys(lo, hi)
    }

    /// Returns the points of `self` outside `other`, as up to two intervals in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use tightpack::intervals::Interval;
    ///
    /// let pieces = Interval::closed(1, 10).difference(&Interval::closed(2, 4));
    /// assert_eq!(
    ///     pieces.as_slice(),
    ///     &[Interval::closed_open(1, 2), Interval::open_closed(4, 10)]
    /// );
    /// assert!(Interval::closed(1, 10).difference(&Interval::closed(0, 20)).is_empty());
    /// ```
    pub fn difference(&self, other: &Self) -> SmallVec<[Self; 2]> {
        if self.is_empty() {
            return smallvec![];
        }
        if !self.overlaps(other) {
            return smallvec![*self];
        }
        let left = Self::new(self.lower, self.lower_closed, other.lower, !other.lower_closed);
        let right = Self::new(other.upper, !other.upper_closed, self.upper, self.upper_closed);
        [left, right].into_iter().filter(|iv| !iv.is_empty()).collect()
    }

    /// Returns the smallest interval containing both intervals.
    pub fn hull(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self::from_keys(
            self.lower_key().min(other.lower_key()),
            self.upper_key().max(other.upper_key()),
        )
    }

    /// Returns `upper - lower`, or zero for the empty interval.
    ///
    /// # Errors
    ///
    /// [`Error::Overflow`] if the distance does not fit in `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tightpack::intervals::Interval;
    ///
    /// assert_eq!(Interval::closed(-3i8, 4).length(), Ok(7));
    /// assert!(Interval::closed(i8::MIN, i8::MAX).length().is_err());
    /// ```
    pub fn length(&self) -> Result<T> {
        if self.is_empty() {
            return Ok(T::zero());
        }
        self.upper.checked_sub(&self.lower).ok_or(Error::Overflow {
            op: "Interval::length",
        })
    }

    /// Returns the interval of all sums `x + y` for `x` in `self` and `y` in `other`.
    ///
    /// An endpoint of the result is closed if both summed endpoints are closed.
    ///
    /// # Errors
    ///
    /// [`Error::Overflow`] if an endpoint does not fit in `T`.
    pub fn checked_add(&self, other: &Self) -> Result<Self> {
        if self.is_empty() || other.is_empty() {
            return Ok(Self::empty());
        }
        let overflow = Error::Overflow {
            op: "Interval::checked_add",
        };
        let lower = self
            .lower
            .checked_add(&other.lower)
            .ok_or_else(|| overflow.clone())?;
        let upper = self.upper.checked_add(&other.upper).ok_or(overflow)?;
        Ok(Self::new(
            lower,
            self.lower_closed && other.lower_closed,
            upper,
            self.upper_closed && other.upper_closed,
        ))
    }

    /// Returns the interval of all differences `x - y` for `x` in `self` and `y` in `other`.
    ///
    /// # Errors
    ///
    /// [`Error::Overflow`] if an endpoint does not fit in `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use tightpack::intervals::Interval;
    ///
    /// let a = Interval::closed(5, 10);
    /// let b = Interval::closed_open(1, 2);
    /// assert_eq!(a.checked_sub(&b)?, Interval::open_closed(3, 9));
    /// # Ok(())
    /// # }
    /// ```
    pub fn checked_sub(&self, other: &Self) -> Result<Self> {
        if self.is_empty() || other.is_empty() {
            return Ok(Self::empty());
        }
        let overflow = Error::Overflow {
            op: "Interval::checked_sub",
        };
        let lower = self
            .lower
            .checked_sub(&other.upper)
            .ok_or_else(|| overflow.clone())?;
        let upper = self.upper.checked_sub(&other.lower).ok_or(overflow)?;
        Ok(Self::new(
            lower,
            self.lower_closed && other.upper_closed,
            upper,
            self.upper_closed && other.lower_closed,
        ))
    }

    /// Returns the interval of all products `x * factor` for `x` in `self`.
    ///
    /// A negative factor swaps the endpoints together with their closures,
    /// and a zero factor collapses a non-empty interval to the point zero.
    ///
    /// # Errors
    ///
    /// [`Error::Overflow`] if an endpoint does not fit in `T`.
    pub fn checked_scale(&self, factor: T) -> Result<Self> {
        if self.is_empty() {
            return Ok(Self::empty());
        }
        if factor == T::zero() {
            return Ok(Self::point(T::zero()));
        }
        let overflow = Error::Overflow {
            op: "Interval::checked_scale",
        };
        let a = self
            .lower
            .checked_mul(&factor)
            .ok_or_else(|| overflow.clone())?;
        let b = self.upper.checked_mul(&factor).ok_or(overflow)?;
        if factor < T::zero() {
            Ok(Self::new(b, self.upper_closed, a, self.lower_closed))
        } else {
            Ok(Self::new(a, self.lower_closed, b, self.upper_closed))
        }
    }

    /// Returns the interval of all negations `-x` for `x` in `self`.
    ///
    /// The endpoints swap together with their closures.
    ///
    /// # Errors
    ///
    /// [`Error::Overflow`] if an endpoint has no negation in `T`, which is the
    /// case for `T::min_value()` of a signed type and for every positive
    /// endpoint of an unsigned type.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use tightpack::intervals::Interval;
    ///
    /// assert_eq!(Interval::closed_open(-2, 5).checked_neg()?, Interval::open_closed(-5, 2));
    /// assert!(Interval::closed(i8::MIN, 0).checked_neg().is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn checked_neg(&self) -> Result<Self> {
        if self.is_empty() {
            return Ok(Self::empty());
        }
        let overflow = Error::Overflow {
            op: "Interval::checked_neg",
        };
        let lower = T::zero()
            .checked_sub(&self.upper)
            .ok_or_else(|| overflow.clone())?;
        let upper = T::zero().checked_sub(&self.lower).ok_or(overflow)?;
        Ok(Self::new(lower, self.upper_closed, upper, self.lower_closed))
    }

    /// Returns the interval of all products `x * y` for `x` in `self` and `y` in `other`.
    ///
    /// The bounds are the extremes of the four endpoint products. A bound is
    /// closed if it is reached by two closed endpoints, or by a closed zero
    /// endpoint whatever the other factor.
    ///
    /// # Errors
    ///
    /// [`Error::Overflow`] if an endpoint product does not fit in `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use tightpack::intervals::Interval;
    ///
    /// let a = Interval::closed(-2, 3);
    /// let b = Interval::closed_open(4, 5);
    /// assert_eq!(a.checked_mul(&b)?, Interval::open(-10, 15));
    ///
    /// let c = Interval::closed(0, 2);
    /// assert_eq!(c.checked_mul(&Interval::open(1, 3))?, Interval::closed_open(0, 6));
    /// # Ok(())
    /// # }
    /// ```
    pub fn checked_mul(&self, other: &Self) -> Result<Self> {
        if self.is_empty() || other.is_empty() {
            return Ok(Self::empty());
        }
        let zero = T::zero();
        let product = |(x, xc): (T, bool), (y, yc): (T, bool)| -> Result<Corner<T>> {
            let v = x.checked_mul(&y).ok_or(Error::Overflow {
                op: "Interval::checked_mul",
            })?;
            let closed = (xc && yc) || (xc && x == zero) || (yc && y == zero);
            Ok(((v, closed), (v, closed)))
        };
        let [a, b] = self.ends();
        let [c, d] = other.ends();
        Ok(Self::from_corners([
            product(a, c)?,
            product(a, d)?,
            product(b, c)?,
            product(b, d)?,
        ]))
    }

    /// Returns an interval enclosing all quotients `x / y` for `x` in `self` and `y` in `other`.
    ///
    /// Quotients that are not integers are rounded outward: the lower bound
    /// down and the upper bound up, and such a bound is closed. Exact bounds
    /// keep the closure rule of [`Self::checked_mul()`]. A dividend equal to
    /// the point zero gives the point zero.
    ///
    /// # Errors
    ///
    /// [`Error::Overflow`] if the closure of `other` contains zero, since the
    /// quotients are then unbounded, or if a bound does not fit in `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use tightpack::intervals::Interval;
    ///
    /// let a = Interval::closed(6, 12);
    /// assert_eq!(a.checked_div(&Interval::closed(2, 3))?, Interval::closed(2, 6));
    /// assert_eq!(Interval::closed(1, 2).checked_div(&Interval::point(3))?, Interval::closed(0, 1));
    /// assert!(a.checked_div(&Interval::open_closed(0, 3)).is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn checked_div(&self, other: &Self) -> Result<Self> {
        if self.is_empty() || other.is_empty() {
            return Ok(Self::empty());
        }
        let zero = T::zero();
        if self.lower == zero && self.upper == zero {
            return Ok(*self);
        }
        let overflow = || Error::Overflow {
            op: "Interval::checked_div",
        };
        if other.lower <= zero && zero <= other.upper {
            return Err(overflow());
        }
        let quotient = |(x, xc): (T, bool), (y, yc): (T, bool)| -> Result<Corner<T>> {
            let q = x.checked_div(&y).ok_or_else(overflow)?;
            let r = x - q * y;
            if r == zero {
                let closed = (xc && yc) || (xc && x == zero);
                return Ok(((q, closed), (q, closed)));
            }
            // Truncation moved the quotient toward zero.
            if (r < zero) != (y < zero) {
                let floor = q.checked_sub(&T::one()).ok_or_else(overflow)?;
                Ok(((floor, true), (q, true)))
            } else {
                let ceil = q.checked_add(&T::one()).ok_or_else(overflow)?;
                Ok(((q, true), (ceil, true)))
            }
        };
        let [a, b] = self.ends();
        let [c, d] = other.ends();
        Ok(Self::from_corners([
            quotient(a, c)?,
            quotient(a, d)?,
            quotient(b, c)?,
            quotient(b, d)?,
        ]))
    }

    /// Returns the interval of all absolute values `|x|` for `x` in `self`.
    ///
    /// # Errors
    ///
    /// [`Error::Overflow`] if a negative endpoint has no negation in `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use tightpack::intervals::Interval;
    ///
    /// assert_eq!(Interval::closed(-5, -2).abs()?, Interval::closed(2, 5));
    /// assert_eq!(Interval::open(-5, 3).abs()?, Interval::closed_open(0, 5));
    /// # Ok(())
    /// # }
    /// ```
    pub fn abs(&self) -> Result<Self> {
        let zero = T::zero();
        if self.is_empty() || self.lower >= zero {
            return Ok(*self);
        }
        let negated = self.checked_neg()?;
        if self.upper <= zero {
            return Ok(negated);
        }
        Ok(Self::from_keys(
            (zero, 0),
            self.upper_key().max(negated.upper_key()),
        ))
    }

    /// Returns the interval of all values `x.clamp(min, max)` for `x` in `self`.
    ///
    /// Returns the empty interval if `self` is empty or `max < min`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tightpack::intervals::Interval;
    ///
    /// assert_eq!(Interval::open(-5, 3).clamp(0, 10), Interval::closed_open(0, 3));
    /// assert_eq!(Interval::closed(20, 30).clamp(0, 10), Interval::point(10));
    /// ```
    pub fn clamp(self, min: T, max: T) -> Self {
        if self.is_empty() || max < min {
            return Self::empty();
        }
        let (lo, hi) = ((min, 0), (max, 0));
        let pin = |key: Key<T>| key.max(lo).min(hi);
        Self::from_keys(pin(self.lower_key()), pin(self.upper_key()))
    }

    /// Returns `(lower + upper) / 2` rounded toward negative infinity,
    /// or [`None`] for the empty interval.
    ///
    /// The sum is never formed, so the midpoint of any interval is representable.
    ///
    /// # Examples
    ///
    /// ```
    /// use tightpack::intervals::Interval;
    ///
    /// assert_eq!(Interval::closed(2, 7).midpoint(), Some(4));
    /// assert_eq!(Interval::closed(u8::MAX - 1, u8::MAX).midpoint(), Some(254));
    /// assert_eq!(Interval::<i32>::empty().midpoint(), None);
    /// ```
    pub fn midpoint(&self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let (l, u) = (self.lower, self.upper);
        Some((l & u) + ((l ^ u) >> 1))
    }

    #[inline(always)]
    fn ends(&self) -> [(T, bool); 2] {
        [
            (self.lower, self.lower_closed),
            (self.upper, self.upper_closed),
        ]
    }

    /// Takes the smallest lower and the greatest upper candidate. A bound
    /// reached by several candidates is closed if any of them is.
    fn from_corners(corners: [Corner<T>; 4]) -> Self {
        let [first, rest @ ..] = corners;
        let (lower, upper) = rest.iter().fold(first, |(lower, upper), &(lo, hi)| {
            let lower = match lo.0.cmp(&lower.0) {
                Ordering::Less => lo,
                Ordering::Equal => (lower.0, lower.1 || lo.1),
                Ordering::Greater => lower,
            };
            let upper = match hi.0.cmp(&upper.0) {
                Ordering::Greater => hi,
                Ordering::Equal => (upper.0, upper.1 || hi.1),
                Ordering::Less => upper,
            };
            (lower, upper)
        });
        Self::new(lower.0, lower.1, upper.0, upper.1)
    }

    #[inline(always)]
    pub(crate) fn lower_key(&self) -> Key<T> {
        (self.lower, if self.lower_closed { 0 } else { 1 })
    }

    #[inline(always)]
    pub(crate) fn upper_key(&self) -> Key<T> {
        (self.upper, if self.upper_closed { 0 } else { -1 })
    }

    /// Returns the greater lower endpoint and the smaller upper endpoint.
    #[inline(always)]
    fn gap_key(&self, other: &Self) -> (Key<T>, Key<T>) {
        (
            self.lower_key().max(other.lower_key()),
            self.upper_key().min(other.upper_key()),
        )
    }

    fn from_keys(lower: Key<T>, upper: Key<T>) -> Self {
        Self::new(lower.0, lower.1 == 0, upper.0, upper.1 == 0)
    }
}

impl<T> Default for Interval<T>
where
    T: PrimInt,
{
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> PartialOrd for Interval<T>
where
    T: PrimInt,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Interval<T>
where
    T: PrimInt,
{
    fn cmp(&self, other: &Self) -> Ordering {
        self.lower_key()
            .cmp(&other.lower_key())
            .then_with(|| self.upper_key().cmp(&other.upper_key()))
    }
}

impl<T> fmt::Display for Interval<T>
where
    T: PrimInt + fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "()");
        }
        let open = if self.lower_closed { '[' } else { '(' };
        let close = if self.upper_closed { ']' } else { ')' };
        write!(f, "{open}{}, {}{close}", self.lower, self.upper)
    }
}
