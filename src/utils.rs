//! Bit-width allocation and small arithmetic helpers.
use num_traits::PrimInt;

use crate::error::{Error, Result};

/// Returns the number of bits to represent `x` at least.
///
/// # Examples
///
/// ```
/// use tightpack::utils::needed_bits;
///
/// assert_eq!(needed_bits(0), 1);
/// assert_eq!(needed_bits(1), 1);
/// assert_eq!(needed_bits(2), 2);
/// assert_eq!(needed_bits(255), 8);
/// assert_eq!(needed_bits(256), 9);
/// ```
#[inline(always)]
pub const fn needed_bits(x: u64) -> usize {
    if x == 0 {
        1
    } else {
        (u64::BITS - x.leading_zeros()) as usize
    }
}

/// Returns the number of bits so that every value in the inclusive range
/// between `min` and `max` can be stored.
///
/// The order of the arguments does not matter.
///
/// # Examples
///
/// ```
/// use tightpack::utils::needed_bits_range;
///
/// assert_eq!(needed_bits_range(0, 0), 1);
/// assert_eq!(needed_bits_range(3, 8), 4);
/// assert_eq!(needed_bits_range(8, 3), 4);
/// ```
#[inline(always)]
pub fn needed_bits_range(min: u64, max: u64) -> usize {
    needed_bits(min.max(max))
}

/// Returns the number of bits to represent a primitive integer `x`.
///
/// # Errors
///
/// [`Error::NegativeValue`] if `x` is negative.
///
/// # Examples
///
/// ```
/// use tightpack::utils::width_of;
///
/// assert_eq!(width_of(5u8), Ok(3));
/// assert_eq!(width_of(0i64), Ok(1));
/// assert!(width_of(-1i32).is_err());
/// ```
pub fn width_of<T>(x: T) -> Result<usize>
where
    T: PrimInt + std::fmt::Display,
{
    if x < T::zero() {
        return Err(Error::NegativeValue {
            value: x.to_string(),
        });
    }
    let x = x.to_u128().unwrap_or(u128::MAX);
    if x > u128::from(u64::MAX) {
        return Ok((u128::BITS - x.leading_zeros()) as usize);
    }
    Ok(needed_bits(x as u64))
}

/// Returns the number of bits so that every value in the inclusive range
/// between `min` and `max` can be stored.
///
/// # Errors
///
/// [`Error::NegativeValue`] if either endpoint is negative.
pub fn width_of_range<T>(min: T, max: T) -> Result<usize>
where
    T: PrimInt + std::fmt::Display,
{
    let lo = width_of(min)?;
    let hi = width_of(max)?;
    Ok(lo.max(hi))
}

/// Returns `ceil(x / y)`.
///
/// # Examples
///
/// ```
/// use tightpack::utils::ceiled_divide;
///
/// assert_eq!(ceiled_divide(10, 2), 5);
/// assert_eq!(ceiled_divide(10, 3), 4);
/// ```
///
/// # Panics
///
/// It will panic if `y == 0`.
pub const fn ceiled_divide(x: usize, y: usize) -> usize {
    x / y + (x % y != 0) as usize
}

/// Returns the number of bits to represent `x` in two's complement.
///
/// # Examples
///
/// ```
/// use tightpack::utils::signed_bits;
///
/// assert_eq!(signed_bits(0), 1);
/// assert_eq!(signed_bits(-1), 1);
/// assert_eq!(signed_bits(3), 3);
/// assert_eq!(signed_bits(-4), 3);
/// assert_eq!(signed_bits(i64::MIN), 64);
/// ```
#[inline(always)]
pub const fn signed_bits(x: i64) -> usize {
    let magnitude = if x < 0 { !x } else { x };
    (i64::BITS - magnitude.leading_zeros()) as usize + 1
}

/// Returns the smallest and largest values of a `width`-bit two's complement integer.
///
/// A zero width only holds zero.
///
/// # Panics
///
/// It will panic if `width` is greater than 64.
#[inline(always)]
pub const fn signed_range(width: usize) -> (i64, i64) {
    if width == 0 {
        (0, 0)
    } else {
        let shift = i64::BITS as usize - width;
        (i64::MIN >> shift, i64::MAX >> shift)
    }
}

/// Sign-extends the low `width` bits of `raw`.
#[inline(always)]
pub const fn sign_extend(raw: u64, width: usize) -> i64 {
    if width == 0 {
        0
    } else {
        let shift = u64::BITS as usize - width;
        ((raw << shift) as i64) >> shift
    }
}
