//! Updatable tight vector in which each integer is represented in a fixed number of bits.
use std::io::{Read, Write};
use std::sync::Arc;

use anyhow::anyhow;
use num_traits::ToPrimitive;

use crate::bit_vectors::{BitVector, WORD_LEN};
use crate::error::{Error, Result};
use crate::generation::Generation;
use crate::int_vectors::prelude::*;
use crate::log::{LogSink, Logger};
use crate::{utils, Serializable};

/// The largest number of bits per element.
pub const MAX_WIDTH: usize = WORD_LEN;

const SIGNED_FLAG: u8 = 0x80;

/// Updatable tight vector in which each integer is represented in a fixed number of bits.
///
/// Element `i` occupies the bits `[i * width, (i + 1) * width)` of the backing
/// [`BitVector`], so an element spans at most two machine words.
///
/// A width of zero is allowed: such a vector stores only zeros and uses no memory
/// for its elements.
///
/// A vector created with [`Self::new_signed()`] keeps each element as a
/// `width`-bit two's complement pattern, read back sign-extended through
/// [`Self::get_signed()`]. The unsigned accessors see the raw pattern.
///
/// # Memory usage
///
/// $`n \cdot w`$ bits for $`n`$ integers of $`w`$ bits.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use tightpack::int_vectors::TightVector;
///
/// // Four zeroed integers within 3 bits each.
/// let mut tv = TightVector::new(4, 3)?;
///
/// tv.set(0, 7)?;
/// tv.set(3, 2)?;
///
/// assert_eq!(tv.len(), 4);
/// assert_eq!(tv.get(0)?, 7);
/// assert_eq!(tv.iter().collect::<Vec<_>>(), vec![7, 0, 0, 2]);
///
/// assert!(tv.set(1, 8).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Default, Clone)]
pub struct TightVector {
    chunks: BitVector,
    len: usize,
    width: usize,
    signed: bool,
    generation: Generation,
    logger: Logger,
}

impl TightVector {
    /// Creates a new vector of `len` zeroed integers within `width` bits each.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedWidth`] if `width` is greater than [`MAX_WIDTH`], or
    /// - [`Error::Overflow`] if `len * width` bits cannot be addressed.
    pub fn new(len: usize, width: usize) -> Result<Self> {
        Self::check_width(width)?;
        let num_bits = len.checked_mul(width).ok_or(Error::Overflow {
            op: "TightVector::new",
        })?;
        Ok(Self {
            chunks: BitVector::zeros(num_bits)?,
            len,
            width,
            ..Self::default()
        })
    }

    /// Creates a new vector of `len` zeroed signed integers within `width` bits each.
    ///
    /// Each element holds a value in `-2^(width-1)..=2^(width-1)-1`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new()`].
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use tightpack::int_vectors::TightVector;
    ///
    /// let mut tv = TightVector::new_signed(2, 3)?;
    /// tv.set_signed(0, -4)?;
    /// tv.set_signed(1, 3)?;
    ///
    /// assert_eq!(tv.get_signed(0)?, -4);
    /// assert_eq!(tv.get(0)?, 0b100);
    /// assert!(tv.set_signed(1, 4).is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new_signed(len: usize, width: usize) -> Result<Self> {
        let mut tv = Self::new(len, width)?;
        tv.signed = true;
        Ok(tv)
    }

    /// Creates a new empty vector storing integers within `width` bits,
    /// where space for storing at least `capa` integers is reserved.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedWidth`] if `width` is greater than [`MAX_WIDTH`], or
    /// - [`Error::Overflow`] if `capa * width` bits cannot be reserved.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use tightpack::int_vectors::TightVector;
    ///
    /// let tv = TightVector::with_capacity(10, 3)?;
    ///
    /// assert_eq!(tv.len(), 0);
    /// assert_eq!(tv.width(), 3);
    ///
    /// // Space for storing 21 integers is reserved due to the word granularity.
    /// assert_eq!(tv.capacity(), 21);
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_capacity(capa: usize, width: usize) -> Result<Self> {
        Self::check_width(width)?;
        let num_bits = capa.checked_mul(width).ok_or(Error::Overflow {
            op: "TightVector::with_capacity",
        })?;
        Ok(Self {
            chunks: BitVector::with_capacity(num_bits)?,
            width,
            ..Self::default()
        })
    }

    /// Creates a new vector storing `len` copies of `val` in `width` bits each.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedWidth`] if `width` is greater than [`MAX_WIDTH`], or
    /// - [`Error::ValueOverflow`] if `val` cannot be represented in `width` bits.
    pub fn from_int(val: u64, len: usize, width: usize) -> Result<Self> {
        let mut tv = Self::with_capacity(len, width)?;
        tv.check_value(val)?;
        for _ in 0..len {
            tv.push(val)?;
        }
        Ok(tv)
    }

    /// Creates a new vector from a slice of integers `vals`.
    ///
    /// The width fits to the maximum value in `vals`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tightpack::int_vectors::TightVector;
    ///
    /// let tv = TightVector::from_slice(&[7u8, 2]);
    /// assert_eq!(tv.len(), 2);
    /// assert_eq!(tv.width(), 3);
    /// assert_eq!(tv.get(0), Ok(7));
    /// ```
    pub fn from_slice<T>(vals: &[T]) -> Self
    where
        T: Into<u64> + Copy,
    {
        let max_int = vals.iter().map(|&x| x.into()).max().unwrap_or(0);
        let width = utils::needed_bits(max_int);
        // Pushing grows the buffer past a failed reservation.
        let mut chunks =
            BitVector::with_capacity(vals.len().saturating_mul(width)).unwrap_or_default();
        for &x in vals {
            // Every value fits the width fitted to the maximum.
            let _ = chunks.push_bits(x.into(), width);
        }
        Self {
            chunks,
            len: vals.len(),
            width,
            ..Self::default()
        }
    }

    /// Creates a new signed vector from a slice of integers `vals`.
    ///
    /// The width fits to the value needing the most two's complement bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use tightpack::int_vectors::TightVector;
    ///
    /// let tv = TightVector::from_signed_slice(&[-3i8, 2]);
    /// assert!(tv.is_signed());
    /// assert_eq!(tv.width(), 3);
    /// assert_eq!(tv.get_signed(0), Ok(-3));
    /// ```
    pub fn from_signed_slice<T>(vals: &[T]) -> Self
    where
        T: Into<i64> + Copy,
    {
        let width = vals
            .iter()
            .map(|&x| utils::signed_bits(x.into()))
            .max()
            .unwrap_or(0);
        let mut chunks =
            BitVector::with_capacity(vals.len().saturating_mul(width)).unwrap_or_default();
        for &x in vals {
            let x: i64 = x.into();
            // Every pattern fits the width fitted to the widest value.
            let _ = chunks.push_bits(x as u64, width);
        }
        Self {
            chunks,
            len: vals.len(),
            width,
            signed: true,
            ..Self::default()
        }
    }

    /// Attaches a sink receiving structural events such as repacking.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.logger = Logger::new(sink);
        self
    }

    /// Returns the `index`-th integer.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] if `index` is not less than [`Self::len()`].
    ///
    /// # Complexity
    ///
    /// Constant
    #[inline(always)]
    pub fn get(&self, index: usize) -> Result<u64> {
        self.check_index(index)?;
        Ok(self.read(index))
    }

    /// Sets the `index`-th integer to `val`.
    ///
    /// This is not a structural mutation, so cursors stay valid.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexOutOfRange`] if `index` is out of bounds, or
    /// - [`Error::ValueOverflow`] if `val` cannot be represented in [`Self::width()`] bits.
    ///
    /// # Complexity
    ///
    /// Constant
    #[inline(always)]
    pub fn set(&mut self, index: usize, val: u64) -> Result<()> {
        self.check_index(index)?;
        self.check_value(val)?;
        self.write(index, val)
    }

    /// Returns the `index`-th integer as a signed value.
    ///
    /// Signed vectors sign-extend the stored pattern. Unsigned vectors
    /// convert the stored value.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexOutOfRange`] if `index` is out of bounds, or
    /// - [`Error::ValueOutOfRange`] if an unsigned value exceeds [`i64::MAX`].
    pub fn get_signed(&self, index: usize) -> Result<i64> {
        self.check_index(index)?;
        self.decode_signed(self.read(index))
    }

    /// Sets the `index`-th integer to the signed value `val`.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexOutOfRange`] if `index` is out of bounds,
    /// - [`Error::ValueOutOfRange`] if `val` is outside the signed range of
    ///   [`Self::width()`] bits, or
    /// - [`Error::NegativeValue`] if `val` is negative and the vector is unsigned.
    pub fn set_signed(&mut self, index: usize, val: i64) -> Result<()> {
        self.check_index(index)?;
        let raw = self.encode_signed(val)?;
        self.write(index, raw)
    }

    /// Pushes integer `val` at the end.
    ///
    /// # Errors
    ///
    /// [`Error::ValueOverflow`] if `val` cannot be represented in [`Self::width()`] bits.
    ///
    /// # Complexity
    ///
    /// Constant (Amortized)
    pub fn push(&mut self, val: u64) -> Result<()> {
        self.check_value(val)?;
        self.push_raw(val)
    }

    /// Pushes the signed value `val` at the end.
    ///
    /// # Errors
    ///
    /// Same as [`Self::set_signed()`], except for the index check.
    pub fn push_signed(&mut self, val: i64) -> Result<()> {
        let raw = self.encode_signed(val)?;
        self.push_raw(raw)
    }

    /// Inserts `val` at position `index`, shifting the following integers.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexOutOfRange`] if `index` is greater than [`Self::len()`], or
    /// - [`Error::ValueOverflow`] if `val` cannot be represented in [`Self::width()`] bits.
    ///
    /// # Complexity
    ///
    /// Linear in the number of following integers.
    pub fn insert(&mut self, index: usize, val: u64) -> Result<()> {
        if self.len < index {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        self.check_value(val)?;
        self.insert_raw(index, val)
    }

    /// Inserts the signed value `val` at position `index`, shifting the following integers.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexOutOfRange`] if `index` is greater than [`Self::len()`], or
    /// - the value errors of [`Self::set_signed()`].
    pub fn insert_signed(&mut self, index: usize, val: i64) -> Result<()> {
        if self.len < index {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        let raw = self.encode_signed(val)?;
        self.insert_raw(index, raw)
    }

    /// Removes and returns the integer at position `index`, shifting the following integers.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] if `index` is out of bounds.
    ///
    /// # Complexity
    ///
    /// Linear in the number of following integers.
    pub fn remove(&mut self, index: usize) -> Result<u64> {
        self.check_index(index)?;
        let removed = self.read(index);
        for i in index + 1..self.len {
            let x = self.read(i);
            self.write(i - 1, x)?;
        }
        self.truncate(self.len - 1)?;
        Ok(removed)
    }

    /// Resizes the vector to `len` integers, filling new slots with zero.
    ///
    /// # Errors
    ///
    /// [`Error::Overflow`] if `len * width` bits cannot be addressed or
    /// allocated. The vector is left unchanged in that case.
    pub fn resize(&mut self, len: usize) -> Result<()> {
        let num_bits = len.checked_mul(self.width).ok_or(Error::Overflow {
            op: "TightVector::resize",
        })?;
        self.chunks.resize(num_bits)?;
        self.len = len;
        self.generation.bump();
        Ok(())
    }

    /// Removes all integers, keeping the width.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.len = 0;
        self.generation.bump();
    }

    /// Re-encodes every integer with `width` bits.
    ///
    /// Widths are never changed implicitly; callers decide when to widen
    /// (or narrow) the storage.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedWidth`] if `width` is greater than [`MAX_WIDTH`],
    /// - [`Error::ValueOverflow`] if a stored integer does not fit in `width` bits,
    /// - [`Error::ValueOutOfRange`] if a signed integer leaves the signed range of `width` bits, or
    /// - [`Error::Overflow`] if the repacked bits cannot be allocated.
    ///
    /// The vector is left unchanged on error.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use tightpack::int_vectors::TightVector;
    ///
    /// let mut tv = TightVector::from_slice(&[3u8, 1]);
    /// assert!(tv.set(0, 9).is_err());
    ///
    /// tv.repack(4)?;
    /// tv.set(0, 9)?;
    /// assert_eq!(tv.iter().collect::<Vec<_>>(), vec![9, 1]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn repack(&mut self, width: usize) -> Result<()> {
        Self::check_width(width)?;
        if width == self.width {
            return Ok(());
        }
        let num_bits = self.len.checked_mul(width).ok_or(Error::Overflow {
            op: "TightVector::repack",
        })?;
        let mut chunks = BitVector::with_capacity(num_bits)?;
        for x in self.iter() {
            let raw = if self.signed {
                let val = utils::sign_extend(x, self.width);
                Self::check_signed(val, width)?;
                val as u64
            } else {
                if width < WORD_LEN && x >> width != 0 {
                    return Err(Error::ValueOverflow { value: x, width });
                }
                x
            };
            chunks.push_bits(raw, width)?;
        }
        self.logger.debug(format_args!(
            "repacked {} integers from {} to {} bits",
            self.len, self.width, width
        ));
        self.chunks = chunks;
        self.width = width;
        self.generation.bump();
        Ok(())
    }

    /// Creates an iterator for enumerating integers.
    ///
    /// The iterator is restartable by cloning it before consumption.
    ///
    /// # Examples
    ///
    /// ```
    /// use tightpack::int_vectors::TightVector;
    ///
    /// let tv = TightVector::from_slice(&[5u32, 256, 0]);
    /// let it = tv.iter();
    ///
    /// assert_eq!(it.clone().collect::<Vec<_>>(), vec![5, 256, 0]);
    /// assert_eq!(it.sum::<u64>(), 261);
    /// ```
    pub const fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Creates a cursor that reads integers without borrowing the vector.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use tightpack::int_vectors::TightVector;
    ///
    /// let mut tv = TightVector::from_slice(&[1u8, 2, 3]);
    /// let mut cursor = tv.cursor();
    ///
    /// assert_eq!(cursor.advance(&tv), Some(Ok(1)));
    /// tv.set(1, 0)?;
    /// assert_eq!(cursor.advance(&tv), Some(Ok(0)));
    ///
    /// tv.push(3)?;
    /// assert!(cursor.advance(&tv).unwrap().is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub const fn cursor(&self) -> Cursor {
        Cursor {
            pos: 0,
            generation: self.generation,
        }
    }

    /// Gets the number of integers.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the vector is empty.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the total number of integers it can hold without reallocating.
    ///
    /// Zero-width vectors never allocate and report [`usize::MAX`].
    pub fn capacity(&self) -> usize {
        if self.width == 0 {
            usize::MAX
        } else {
            self.chunks.capacity() / self.width
        }
    }

    /// Gets the number of bits to represent an integer.
    #[inline(always)]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Checks if the elements are two's complement patterns.
    pub const fn is_signed(&self) -> bool {
        self.signed
    }

    /// Returns the current generation, advanced by every structural mutation.
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// Returns the internal representation.
    pub const fn bit_vector(&self) -> &BitVector {
        &self.chunks
    }

    fn truncate(&mut self, len: usize) -> Result<()> {
        self.resize(len)
    }

    fn push_raw(&mut self, raw: u64) -> Result<()> {
        self.chunks.push_bits(raw, self.width)?;
        self.len += 1;
        self.generation.bump();
        Ok(())
    }

    fn insert_raw(&mut self, index: usize, raw: u64) -> Result<()> {
        self.push_raw(0)?;
        for i in (index..self.len - 1).rev() {
            let x = self.read(i);
            self.write(i + 1, x)?;
        }
        self.write(index, raw)
    }

    fn encode_signed(&self, val: i64) -> Result<u64> {
        if self.signed {
            Self::check_signed(val, self.width)?;
            // Keep only the low `width` bits of the two's complement pattern.
            Ok(match self.width {
                0 => 0,
                w if w < WORD_LEN => val as u64 & ((1 << w) - 1),
                _ => val as u64,
            })
        } else {
            let raw = u64::try_from(val).map_err(|_| Error::NegativeValue {
                value: val.to_string(),
            })?;
            self.check_value(raw)?;
            Ok(raw)
        }
    }

    fn decode_signed(&self, raw: u64) -> Result<i64> {
        if self.signed {
            Ok(utils::sign_extend(raw, self.width))
        } else {
            i64::try_from(raw).map_err(|_| Error::ValueOutOfRange {
                value: raw.to_string(),
                min: i64::MIN.to_string(),
                max: i64::MAX.to_string(),
            })
        }
    }

    fn check_signed(val: i64, width: usize) -> Result<()> {
        let (min, max) = utils::signed_range(width);
        if min <= val && val <= max {
            Ok(())
        } else {
            Err(Error::ValueOutOfRange {
                value: val.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            })
        }
    }

    #[inline(always)]
    fn read(&self, index: usize) -> u64 {
        self.chunks
            .get_bits(index * self.width, self.width)
            .unwrap_or_default()
    }

    #[inline(always)]
    fn write(&mut self, index: usize, val: u64) -> Result<()> {
        self.chunks.set_bits(index * self.width, val, self.width)
    }

    #[inline(always)]
    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.len {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index,
                len: self.len,
            })
        }
    }

    #[inline(always)]
    fn check_value(&self, val: u64) -> Result<()> {
        if self.width < WORD_LEN && val >> self.width != 0 {
            Err(Error::ValueOverflow {
                value: val,
                width: self.width,
            })
        } else {
            Ok(())
        }
    }

    fn check_width(width: usize) -> Result<()> {
        if width <= MAX_WIDTH {
            Ok(())
        } else {
            Err(Error::UnsupportedWidth {
                width,
                max: MAX_WIDTH,
            })
        }
    }
}

impl Build for TightVector {
    /// Creates a new vector from a slice of integers `vals`,
    /// fitting the width to the maximum value.
    ///
    /// # Errors
    ///
    /// - [`Error::NegativeValue`] if `vals` contains a negative integer, or
    /// - [`Error::ValueOutOfRange`] if an integer exceeds [`u64::MAX`].
    fn build_from_slice<T>(vals: &[T]) -> Result<Self>
    where
        T: ToPrimitive + std::fmt::Display,
    {
        let vals = to_u64s(vals)?;
        Ok(Self::from_slice(&vals))
    }
}

impl NumVals for TightVector {
    fn num_vals(&self) -> usize {
        self.len()
    }
}

impl Access for TightVector {
    fn access(&self, pos: usize) -> Option<u64> {
        self.get(pos).ok()
    }
}

impl PartialEq for TightVector {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self.width == other.width
            && self.signed == other.signed
            && self.chunks == other.chunks
    }
}

impl Eq for TightVector {}

impl std::fmt::Debug for TightVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut dbg = f.debug_struct("TightVector");
        if self.signed {
            let ints: Vec<i64> = self
                .iter()
                .map(|x| utils::sign_extend(x, self.width))
                .collect();
            dbg.field("ints", &ints);
        } else {
            let ints: Vec<u64> = self.iter().collect();
            dbg.field("ints", &ints);
        }
        dbg.field("len", &self.len)
            .field("width", &self.width)
            .field("signed", &self.signed)
            .finish()
    }
}

impl Serializable for TightVector {
    /// Writes `width` as one byte, the element count as eight little-endian
    /// bytes, and then the `ceil(len * width / 8)` packed bytes.
    ///
    /// The high bit of the width byte marks a signed vector.
    fn serialize_into<W: Write>(&self, mut writer: W) -> anyhow::Result<usize> {
        let tag = self.width as u8 | if self.signed { SIGNED_FLAG } else { 0 };
        let mut mem = tag.serialize_into(&mut writer)?;
        mem += (self.len as u64).serialize_into(&mut writer)?;
        let bytes = self.chunks.to_packed_bytes();
        writer.write_all(&bytes)?;
        Ok(mem + bytes.len())
    }

    fn deserialize_from<R: Read>(mut reader: R) -> anyhow::Result<Self> {
        let tag = u8::deserialize_from(&mut reader)?;
        let signed = tag & SIGNED_FLAG != 0;
        let width = usize::from(tag & !SIGNED_FLAG);
        Self::check_width(width)?;
        let len = usize::try_from(u64::deserialize_from(&mut reader)?)?;
        let num_bits = len
            .checked_mul(width)
            .ok_or_else(|| anyhow!("{len} integers of {width} bits overflow the address space."))?;
        let mut bytes = vec![0; utils::ceiled_divide(num_bits, 8)];
        reader.read_exact(&mut bytes)?;
        let chunks = BitVector::from_packed_bytes(&bytes, num_bits)?;
        Ok(Self {
            chunks,
            len,
            width,
            signed,
            ..Self::default()
        })
    }

    fn size_in_bytes(&self) -> usize {
        std::mem::size_of::<u8>()
            + std::mem::size_of::<u64>()
            + utils::ceiled_divide(self.chunks.len(), 8)
    }
}

/// Converts primitive integers into `u64`, rejecting negative ones and
/// ones beyond [`u64::MAX`].
pub(crate) fn to_u64s<T>(vals: &[T]) -> Result<Vec<u64>>
where
    T: ToPrimitive + std::fmt::Display,
{
    vals.iter()
        .map(|x| {
            x.to_u64().ok_or_else(|| {
                if x.to_i128().map_or(false, |v| v < 0) {
                    Error::NegativeValue {
                        value: x.to_string(),
                    }
                } else {
                    Error::ValueOutOfRange {
                        value: x.to_string(),
                        min: "0".to_string(),
                        max: u64::MAX.to_string(),
                    }
                }
            })
        })
        .collect()
}

/// Iterator for enumerating integers, created by [`TightVector::iter()`].
#[derive(Clone)]
pub struct Iter<'a> {
    tv: &'a TightVector,
    pos: usize,
}

impl<'a> Iter<'a> {
    /// Creates a new iterator.
    pub const fn new(tv: &'a TightVector) -> Self {
        Self { tv, pos: 0 }
    }
}

impl Iterator for Iter<'_> {
    type Item = u64;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.pos < self.tv.len() {
            let x = self.tv.read(self.pos);
            self.pos += 1;
            Some(x)
        } else {
            None
        }
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.tv.len() - self.pos;
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl std::iter::FusedIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a TightVector {
    type Item = u64;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Detached cursor over a [`TightVector`], created by [`TightVector::cursor()`].
///
/// The cursor remembers the generation of the vector it was created from and
/// fails with [`Error::InvalidatedIterator`] once the vector has been
/// structurally mutated (pushed, inserted, removed, resized, cleared, or repacked).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pos: usize,
    generation: Generation,
}

impl Cursor {
    /// Reads the next integer of `tv`, or [`None`] at the end.
    pub fn advance(&mut self, tv: &TightVector) -> Option<Result<u64>> {
        if let Err(e) = self.generation.ensure(tv.generation) {
            return Some(Err(e));
        }
        if self.pos < tv.len() {
            let x = tv.read(self.pos);
            self.pos += 1;
            Some(Ok(x))
        } else {
            None
        }
    }

    /// Moves the cursor back to the first integer.
    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    /// Returns the position of the next integer to read.
    pub const fn position(&self) -> usize {
        self.pos
    }
}
