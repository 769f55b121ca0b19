//! Updatable bit vector in a plain format, used as the backing buffer of tight vectors.
use crate::error::{Error, Result};
use crate::utils;

/// The number of bits in a machine word.
pub const WORD_LEN: usize = u64::BITS as usize;

/// Updatable bit vector in a plain format.
///
/// Bits are packed into `u64` words from the least significant bit.
/// Bits beyond [`Self::len()`] in the last word are always zero, which keeps
/// the derived equality and the packed byte image canonical.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use tightpack::bit_vectors::BitVector;
///
/// let mut bv = BitVector::new();
/// bv.push_bits(0b101, 3)?;
/// bv.push_bit(true);
///
/// assert_eq!(bv.len(), 4);
/// assert_eq!(bv.get_bits(0, 4), Some(0b1101));
///
/// bv.set_bit(0, false)?;
/// assert_eq!(bv.get_bit(0), Some(false));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BitVector {
    words: Vec<u64>,
    len: usize,
}

impl BitVector {
    /// Creates a new empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new vector that at least `capa` bits are reserved.
    ///
    /// # Errors
    ///
    /// [`Error::Overflow`] if the words for `capa` bits cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use tightpack::bit_vectors::BitVector;
    ///
    /// let bv = BitVector::with_capacity(40)?;
    /// assert_eq!(bv.len(), 0);
    /// assert_eq!(bv.capacity(), 64);
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_capacity(capa: usize) -> Result<Self> {
        let words = Self::alloc_words(Self::words_for(capa), "BitVector::with_capacity")?;
        Ok(Self { words, len: 0 })
    }

    /// Creates a new vector of `len` zero bits.
    ///
    /// # Errors
    ///
    /// [`Error::Overflow`] if the words for `len` bits cannot be allocated.
    pub fn zeros(len: usize) -> Result<Self> {
        let num_words = Self::words_for(len);
        let mut words = Self::alloc_words(num_words, "BitVector::zeros")?;
        words.resize(num_words, 0);
        Ok(Self { words, len })
    }

    /// Returns the `pos`-th bit, or [`None`] if out of bounds.
    pub fn get_bit(&self, pos: usize) -> Option<bool> {
        if pos < self.len {
            let (block, shift) = (pos / WORD_LEN, pos % WORD_LEN);
            Some((self.words[block] >> shift) & 1 == 1)
        } else {
            None
        }
    }

    /// Updates the `pos`-th bit to `bit`.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] if `self.len() <= pos`.
    pub fn set_bit(&mut self, pos: usize, bit: bool) -> Result<()> {
        self.set_bits(pos, bit as u64, 1)
    }

    /// Pushes `bit` at the end.
    pub fn push_bit(&mut self, bit: bool) {
        // A single bit always fits in a word.
        let _ = self.push_bits(bit as u64, 1);
    }

    /// Returns the `len` bits starting at the `pos`-th bit, or [`None`] if
    ///
    ///  - `len` is greater than [`WORD_LEN`], or
    ///  - `self.len() < pos + len`.
    ///
    /// The chunk is read with at most two word accesses.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use tightpack::bit_vectors::BitVector;
    ///
    /// let mut bv = BitVector::zeros(100)?;
    /// bv.set_bits(62, 0b11111, 5)?;
    /// assert_eq!(bv.get_bits(61, 7), Some(0b0111110));
    /// assert_eq!(bv.get_bits(99, 2), None);
    /// # Ok(())
    /// # }
    /// ```
    #[inline(always)]
    pub fn get_bits(&self, pos: usize, len: usize) -> Option<u64> {
        if WORD_LEN < len || self.len < pos.checked_add(len)? {
            return None;
        }
        if len == 0 {
            return Some(0);
        }
        let (block, shift) = (pos / WORD_LEN, pos % WORD_LEN);
        let mask = Self::mask(len);
        let bits = if shift + len <= WORD_LEN {
            (self.words[block] >> shift) & mask
        } else {
            (self.words[block] >> shift) | ((self.words[block + 1] << (WORD_LEN - shift)) & mask)
        };
        Some(bits)
    }

    /// Updates the `len` bits starting at the `pos`-th bit to `bits`.
    ///
    /// Active bits of `bits` other than the lowest `len` bits are truncated.
    ///
    /// # Errors
    ///
    ///  - [`Error::UnsupportedWidth`] if `len` is greater than [`WORD_LEN`], or
    ///  - [`Error::IndexOutOfRange`] if `self.len() < pos + len`.
    #[inline(always)]
    pub fn set_bits(&mut self, pos: usize, bits: u64, len: usize) -> Result<()> {
        if WORD_LEN < len {
            return Err(Error::UnsupportedWidth {
                width: len,
                max: WORD_LEN,
            });
        }
        if pos.checked_add(len).map_or(true, |end| self.len < end) {
            return Err(Error::IndexOutOfRange {
                index: pos,
                len: self.len,
            });
        }
        if len == 0 {
            return Ok(());
        }
        let mask = Self::mask(len);
        let bits = bits & mask;

        let word = pos / WORD_LEN;
        let pos_in_word = pos % WORD_LEN;

        self.words[word] &= !(mask << pos_in_word);
        self.words[word] |= bits << pos_in_word;

        let stored = WORD_LEN - pos_in_word;
        if stored < len {
            self.words[word + 1] &= !(mask >> stored);
            self.words[word + 1] |= bits >> stored;
        }
        Ok(())
    }

    /// Pushes `bits` of `len` bits at the end.
    ///
    /// Active bits of `bits` other than the lowest `len` bits are truncated.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedWidth`] if `len` is greater than [`WORD_LEN`].
    #[inline(always)]
    pub fn push_bits(&mut self, bits: u64, len: usize) -> Result<()> {
        if WORD_LEN < len {
            return Err(Error::UnsupportedWidth {
                width: len,
                max: WORD_LEN,
            });
        }
        if len == 0 {
            return Ok(());
        }
        let bits = bits & Self::mask(len);

        let pos_in_word = self.len % WORD_LEN;
        match self.words.last_mut() {
            Some(cur_word) if pos_in_word != 0 => {
                *cur_word |= bits << pos_in_word;
                if len > WORD_LEN - pos_in_word {
                    self.words.push(bits >> (WORD_LEN - pos_in_word));
                }
            }
            _ => self.words.push(bits),
        }
        self.len += len;
        Ok(())
    }

    /// Resizes the vector to `len` bits, filling new bits with zero.
    ///
    /// # Errors
    ///
    /// [`Error::Overflow`] if the words for `len` bits cannot be allocated,
    /// in which case the vector is left unchanged.
    pub fn resize(&mut self, len: usize) -> Result<()> {
        let num_words = Self::words_for(len);
        if let Some(additional) = num_words.checked_sub(self.words.len()) {
            self.words
                .try_reserve(additional)
                .map_err(|_| Error::Overflow {
                    op: "BitVector::resize",
                })?;
        }
        self.words.resize(num_words, 0);
        self.len = len;
        let shift = len % WORD_LEN;
        if shift != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= Self::mask(shift);
            }
        }
        Ok(())
    }

    /// Removes all bits, keeping the allocation.
    pub fn clear(&mut self) {
        self.words.clear();
        self.len = 0;
    }

    /// Reserves space for at least `additional` more bits.
    ///
    /// # Errors
    ///
    /// [`Error::Overflow`] if the total number of bits overflows `usize`
    /// or cannot be allocated.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let overflow = Error::Overflow {
            op: "BitVector::reserve",
        };
        let total = self
            .len
            .checked_add(additional)
            .ok_or_else(|| overflow.clone())?;
        let needed = Self::words_for(total);
        self.words
            .try_reserve(needed.saturating_sub(self.words.len()))
            .map_err(|_| overflow)
    }

    /// Returns the number of bits stored.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the vector is empty.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the slice of raw words.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Returns the total number of bits it can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.words.capacity() * WORD_LEN
    }

    /// Gets the number of words.
    #[inline(always)]
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    /// Returns the packed bits as `ceil(len / 8)` little-endian bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use tightpack::bit_vectors::BitVector;
    ///
    /// let mut bv = BitVector::new();
    /// bv.push_bits(0x1ff, 9)?;
    /// assert_eq!(bv.to_packed_bytes(), vec![0xff, 0x01]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn to_packed_bytes(&self) -> Vec<u8> {
        let num_bytes = utils::ceiled_divide(self.len, 8);
        self.words
            .iter()
            .flat_map(|w| w.to_le_bytes())
            .take(num_bytes)
            .collect()
    }

    /// Rebuilds a vector of `len` bits from the image of [`Self::to_packed_bytes()`].
    ///
    /// Bytes beyond `ceil(len / 8)` are ignored, and so are bits past `len`
    /// in the last byte.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] if `bytes` is shorter than `ceil(len / 8)`.
    pub fn from_packed_bytes(bytes: &[u8], len: usize) -> Result<Self> {
        let num_bytes = utils::ceiled_divide(len, 8);
        if bytes.len() < num_bytes {
            return Err(Error::IndexOutOfRange {
                index: num_bytes.saturating_sub(1),
                len: bytes.len(),
            });
        }
        let words = bytes[..num_bytes]
            .chunks(8)
            .map(|chunk| {
                let mut buf = [0u8; 8];
                buf[..chunk.len()].copy_from_slice(chunk);
                u64::from_le_bytes(buf)
            })
            .collect();
        let mut bv = Self { words, len };
        bv.resize(len)?;
        Ok(bv)
    }

    #[inline(always)]
    const fn mask(len: usize) -> u64 {
        if len < WORD_LEN {
            (1 << len) - 1
        } else {
            u64::MAX
        }
    }

    #[inline(always)]
    const fn words_for(n: usize) -> usize {
        n / WORD_LEN + (n % WORD_LEN != 0) as usize
    }

    fn alloc_words(num_words: usize, op: &'static str) -> Result<Vec<u64>> {
        let mut words = Vec::new();
        words
            .try_reserve_exact(num_words)
            .map_err(|_| Error::Overflow { op })?;
        Ok(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_bit_oob() {
        let mut bv = BitVector::zeros(3).unwrap();
        let e = bv.set_bit(3, true);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("index must be less than len=3, but got 3.".to_string())
        );
    }

    #[test]
    fn test_set_bits_over_word() {
        let mut bv = BitVector::zeros(100).unwrap();
        let e = bv.set_bits(0, 0b0, 65);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("width must be in 0..=64, but got 65.".to_string())
        );
    }

    #[test]
    fn test_set_bits_oob() {
        let mut bv = BitVector::zeros(3).unwrap();
        let e = bv.set_bits(2, 0b11, 2);
        assert_eq!(e, Err(Error::IndexOutOfRange { index: 2, len: 3 }));
    }

    #[test]
    fn test_set_bits_truncation() {
        let mut bv = BitVector::zeros(3).unwrap();
        bv.set_bits(0, 0b111, 2).unwrap();
        assert_eq!(bv.get_bits(0, 3), Some(0b011));
    }

    #[test]
    fn test_set_bits_accross_word() {
        let mut bv = BitVector::zeros(100).unwrap();
        bv.set_bits(62, 0b11111, 5).unwrap();
        assert_eq!(bv.get_bits(61, 7).unwrap(), 0b0111110);
        bv.set_bits(62, 0, 5).unwrap();
        assert_eq!(bv.words(), &[0, 0]);
    }

    #[test]
    fn test_push_bits_over_word() {
        let mut bv = BitVector::new();
        let e = bv.push_bits(0b0, 65);
        assert_eq!(
            e,
            Err(Error::UnsupportedWidth {
                width: 65,
                max: 64
            })
        );
    }

    #[test]
    fn test_push_bits_accross_word() {
        let mut bv = BitVector::zeros(62).unwrap();
        bv.push_bits(0b011111, 6).unwrap();
        assert_eq!(bv.get_bits(61, 7).unwrap(), 0b0111110);
        assert_eq!(bv.num_words(), 2);
    }

    #[test]
    fn test_full_word_access() {
        let mut bv = BitVector::zeros(130).unwrap();
        bv.set_bits(3, u64::MAX, 64).unwrap();
        assert_eq!(bv.get_bits(3, 64), Some(u64::MAX));
        assert_eq!(bv.get_bits(2, 1), Some(0));
        assert_eq!(bv.get_bits(67, 1), Some(0));
    }

    #[test]
    fn test_resize_clears_tail() {
        let mut bv = BitVector::zeros(10).unwrap();
        bv.set_bits(0, 0x3ff, 10).unwrap();
        bv.resize(4).unwrap();
        bv.resize(10).unwrap();
        assert_eq!(bv.get_bits(0, 10), Some(0xf));
    }

    #[test]
    fn test_words_for_near_usize_max() {
        assert_eq!(BitVector::words_for(usize::MAX), usize::MAX / WORD_LEN + 1);
        assert_eq!(BitVector::words_for(WORD_LEN), 1);
        assert_eq!(BitVector::words_for(WORD_LEN + 1), 2);
        assert_eq!(BitVector::words_for(0), 0);
    }

    #[test]
    fn test_reserve_overflow() {
        let mut bv = BitVector::zeros(3).unwrap();
        let e = bv.reserve(usize::MAX);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("arithmetic overflow in BitVector::reserve.".to_string())
        );
        assert_eq!(bv.len(), 3);
    }

    #[test]
    fn test_packed_bytes() {
        let mut bv = BitVector::new();
        for i in 0..13 {
            bv.push_bits(i, 7).unwrap();
        }
        let bytes = bv.to_packed_bytes();
        assert_eq!(bytes.len(), 12);
        let other = BitVector::from_packed_bytes(&bytes, bv.len()).unwrap();
        assert_eq!(bv, other);
    }

    #[test]
    fn test_packed_bytes_short() {
        let e = BitVector::from_packed_bytes(&[0xff], 9);
        assert_eq!(e, Err(Error::IndexOutOfRange { index: 1, len: 1 }));
    }
}
