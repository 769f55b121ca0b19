//! Run-length encoded integer sequence supporting access, update, insertion, and removal.
use std::io::{Read, Write};
use std::iter::FusedIterator;
use std::sync::Arc;

use num_traits::ToPrimitive;
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::generation::Generation;
use crate::int_vectors::prelude::*;
use crate::int_vectors::tight_vector::{self, TightVector};
use crate::log::{LogSink, Logger};
use crate::Serializable;

/// A maximal block of `count` consecutive copies of `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Run {
    /// Repeated integer.
    pub value: u64,
    /// Number of repetitions.
    pub count: usize,
}

impl Run {
    /// Creates a new run.
    pub const fn new(value: u64, count: usize) -> Self {
        Self { value, count }
    }
}

/// Groups consecutive equal integers of `vals` into runs.
///
/// A new run starts exactly where the value changes.
///
/// # Examples
///
/// ```
/// use tightpack::int_vectors::run_length::{decode, encode, Run};
///
/// let runs = encode([4, 4, 1, 4]);
/// assert_eq!(runs, vec![Run::new(4, 2), Run::new(1, 1), Run::new(4, 1)]);
/// assert_eq!(decode(&runs).collect::<Vec<_>>(), vec![4, 4, 1, 4]);
/// ```
pub fn encode<I>(vals: I) -> Vec<Run>
where
    I: IntoIterator<Item = u64>,
{
    let mut runs: Vec<Run> = vec![];
    for x in vals {
        match runs.last_mut() {
            Some(last) if last.value == x => last.count += 1,
            _ => runs.push(Run::new(x, 1)),
        }
    }
    runs
}

/// Creates an iterator expanding `runs` back into integers.
///
/// Runs with a zero count produce nothing.
pub const fn decode(runs: &[Run]) -> Decode<'_> {
    Decode {
        runs,
        run: 0,
        offset: 0,
    }
}

/// Iterator expanding a slice of runs, created by [`decode()`].
#[derive(Debug, Clone)]
pub struct Decode<'a> {
    runs: &'a [Run],
    run: usize,
    offset: usize,
}

impl Iterator for Decode<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(run) = self.runs.get(self.run) {
            if self.offset < run.count {
                self.offset += 1;
                return Some(run.value);
            }
            self.run += 1;
            self.offset = 0;
        }
        None
    }
}

impl FusedIterator for Decode<'_> {}

/// Storage of run values.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RunValues {
    Plain(Vec<u64>),
    Tight(TightVector),
}

impl Default for RunValues {
    fn default() -> Self {
        Self::Plain(vec![])
    }
}

impl RunValues {
    #[inline(always)]
    fn get(&self, r: usize) -> u64 {
        match self {
            Self::Plain(v) => v[r],
            Self::Tight(tv) => tv.get(r).unwrap_or_default(),
        }
    }

    fn try_get(&self, r: usize) -> Option<u64> {
        match self {
            Self::Plain(v) => v.get(r).copied(),
            Self::Tight(tv) => tv.get(r).ok(),
        }
    }

    fn check(&self, value: u64) -> Result<()> {
        match self {
            Self::Plain(_) => Ok(()),
            Self::Tight(tv) => {
                let width = tv.width();
                if width < u64::BITS as usize && value >> width != 0 {
                    Err(Error::CapacityExceeded { value, width })
                } else {
                    Ok(())
                }
            }
        }
    }

    fn push(&mut self, value: u64) -> Result<()> {
        match self {
            Self::Plain(v) => v.push(value),
            Self::Tight(tv) => tv.push(value)?,
        }
        Ok(())
    }

    fn set(&mut self, r: usize, value: u64) -> Result<()> {
        match self {
            Self::Plain(v) => v[r] = value,
            Self::Tight(tv) => tv.set(r, value)?,
        }
        Ok(())
    }

    fn insert(&mut self, r: usize, value: u64) -> Result<()> {
        match self {
            Self::Plain(v) => v.insert(r, value),
            Self::Tight(tv) => tv.insert(r, value)?,
        }
        Ok(())
    }

    fn remove(&mut self, r: usize) -> Result<()> {
        match self {
            Self::Plain(v) => {
                v.remove(r);
            }
            Self::Tight(tv) => {
                tv.remove(r)?;
            }
        }
        Ok(())
    }

    fn truncate(&mut self, len: usize) -> Result<()> {
        match self {
            Self::Plain(v) => v.truncate(len),
            Self::Tight(tv) => tv.resize(len.min(tv.len()))?,
        }
        Ok(())
    }

    fn clear(&mut self) {
        match self {
            Self::Plain(v) => v.clear(),
            Self::Tight(tv) => tv.clear(),
        }
    }

    const fn width(&self) -> Option<usize> {
        match self {
            Self::Plain(_) => None,
            Self::Tight(tv) => Some(tv.width()),
        }
    }
}

/// Run-length encoded integer sequence.
///
/// Each run is stored as its value and the cumulative end offset of the run,
/// so the offsets are increasing and [`Self::get()`] is a binary search over them.
/// No two consecutive runs share a value after any operation.
///
/// Every mutation is structural: it advances the generation checked by
/// [`RunCursor`]s.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use tightpack::int_vectors::{Run, RunLengthVec};
///
/// let mut rl = RunLengthVec::encode([7, 7, 7, 7, 3, 3]);
/// assert_eq!(rl.num_runs(), 2);
///
/// // Splits the run of 7s into three runs.
/// rl.set(1, 3)?;
/// assert_eq!(
///     rl.runs().collect::<Vec<_>>(),
///     vec![Run::new(7, 1), Run::new(3, 1), Run::new(7, 2), Run::new(3, 2)]
/// );
///
/// // Removing the middle 3 merges the 7s again.
/// rl.remove(1)?;
/// assert_eq!(rl.runs().collect::<Vec<_>>(), vec![Run::new(7, 3), Run::new(3, 2)]);
/// assert_eq!(rl.iter().collect::<Vec<_>>(), vec![7, 7, 7, 3, 3]);
/// # Ok(())
/// # }
/// ```
#[derive(Default, Clone)]
pub struct RunLengthVec {
    values: RunValues,
    ends: Vec<usize>,
    generation: Generation,
    logger: Logger,
}

impl RunLengthVec {
    /// Creates a new empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty sequence whose run values are stored in `width` bits each.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedWidth`] if `width` is greater than 64.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use tightpack::Error;
    /// use tightpack::int_vectors::RunLengthVec;
    ///
    /// let mut rl = RunLengthVec::with_tight_values(2)?;
    /// rl.push(3)?;
    /// assert_eq!(rl.push(4), Err(Error::CapacityExceeded { value: 4, width: 2 }));
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_tight_values(width: usize) -> Result<Self> {
        Ok(Self {
            values: RunValues::Tight(TightVector::with_capacity(0, width)?),
            ..Self::default()
        })
    }

    /// Creates a new sequence from integers `vals`.
    pub fn encode<I>(vals: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let mut rl = Self::new();
        for x in vals {
            // Plain run values accept every integer.
            let _ = rl.push(x);
        }
        rl
    }

    /// Creates a new sequence from `runs`.
    ///
    /// Runs with a zero count are dropped and consecutive runs with the same
    /// value are merged.
    pub fn from_runs(runs: &[Run]) -> Self {
        let mut rl = Self::new();
        for run in runs {
            let _ = rl.push_run(run.value, run.count);
        }
        rl
    }

    /// Attaches a sink receiving run split and merge events.
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
    /// $`O(\lg r)`$ for $`r`$ runs.
    pub fn get(&self, index: usize) -> Result<u64> {
        let r = self.find_run(index)?;
        Ok(self.values.get(r))
    }

    /// Appends `value` at the end, extending the last run if it holds `value`.
    ///
    /// # Errors
    ///
    /// [`Error::CapacityExceeded`] if `value` does not fit the tight run storage.
    ///
    /// # Complexity
    ///
    /// Constant (Amortized)
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use tightpack::int_vectors::{Run, RunLengthVec};
    ///
    /// let mut rl = RunLengthVec::new();
    /// for _ in 0..5 {
    ///     rl.push(9)?;
    /// }
    /// assert_eq!(rl.runs().collect::<Vec<_>>(), vec![Run::new(9, 5)]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn push(&mut self, value: u64) -> Result<()> {
        self.push_run(value, 1)
    }

    /// Appends `count` copies of `value` at the end.
    ///
    /// # Errors
    ///
    /// [`Error::CapacityExceeded`] if `value` does not fit the tight run storage.
    pub fn push_run(&mut self, value: u64, count: usize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        self.values.check(value)?;
        let len = self.len();
        let last = self.ends.len().checked_sub(1);
        match last {
            Some(r) if self.values.get(r) == value => self.ends[r] = len + count,
            _ => {
                self.values.push(value)?;
                self.ends.push(len + count);
            }
        }
        self.generation.bump();
        Ok(())
    }

    /// Sets the `index`-th integer to `value`.
    ///
    /// The covering run is split into up to three runs, and the result is
    /// merged with equal neighbours.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexOutOfRange`] if `index` is out of bounds, or
    /// - [`Error::CapacityExceeded`] if `value` does not fit the tight run storage.
    pub fn set(&mut self, index: usize, value: u64) -> Result<()> {
        let r = self.find_run(index)?;
        let old = self.values.get(r);
        if old == value {
            return Ok(());
        }
        self.values.check(value)?;
        let (start, end) = (self.run_start(r), self.ends[r]);
        self.replace_run(
            r,
            &[
                (old, index - start),
                (value, 1),
                (old, end - index - 1),
            ],
        )?;
        self.logger.trace(format_args!(
            "set {index} to {value} inside run {r} spanning {start}..{end}"
        ));
        self.merge_around(r, r + 2)?;
        self.generation.bump();
        Ok(())
    }

    /// Inserts `value` at position `index`, shifting the following integers.
    ///
    /// Inserting at [`Self::len()`] appends.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexOutOfRange`] if `index` is greater than [`Self::len()`], or
    /// - [`Error::CapacityExceeded`] if `value` does not fit the tight run storage.
    pub fn insert(&mut self, index: usize, value: u64) -> Result<()> {
        let len = self.len();
        if index == len {
            return self.push(value);
        }
        let r = self.find_run(index)?;
        let old = self.values.get(r);
        if old == value {
            self.shift_ends(r, 1, true);
        } else {
            self.values.check(value)?;
            let (start, end) = (self.run_start(r), self.ends[r]);
            self.replace_run(r, &[(old, index - start), (value, 1), (old, end - index)])?;
            self.logger.trace(format_args!(
                "inserted {value} at {index} inside run {r} spanning {start}..{end}"
            ));
            self.merge_around(r, r + 2)?;
        }
        self.generation.bump();
        Ok(())
    }

    /// Removes and returns the integer at position `index`, shifting the following integers.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> Result<u64> {
        let r = self.find_run(index)?;
        let value = self.values.get(r);
        self.shift_ends(r, 1, false);
        if self.run_len(r) == 0 {
            self.remove_run(r)?;
            if r > 0 {
                self.merge_around(r - 1, r)?;
            }
        }
        self.generation.bump();
        Ok(value)
    }

    /// Resizes the sequence to `len` integers, appending copies of `value` if it grows.
    ///
    /// # Errors
    ///
    /// [`Error::CapacityExceeded`] if the sequence grows and `value` does not
    /// fit the tight run storage.
    pub fn resize(&mut self, len: usize, value: u64) -> Result<()> {
        let cur = self.len();
        if cur < len {
            return self.push_run(value, len - cur);
        }
        if len == 0 {
            self.clear();
            return Ok(());
        }
        let r = self.find_run(len - 1)?;
        self.values.truncate(r + 1)?;
        self.ends.truncate(r + 1);
        self.ends[r] = len;
        self.generation.bump();
        Ok(())
    }

    /// Removes all integers.
    pub fn clear(&mut self) {
        self.ends.clear();
        self.values.clear();
        self.generation.bump();
    }

    /// Creates an iterator decoding the integers in order.
    ///
    /// The iterator is restartable by cloning it before consumption.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            rl: self,
            run: 0,
            pos: 0,
        }
    }

    /// Creates an iterator over the runs in order.
    pub fn runs(&self) -> Runs<'_> {
        Runs { rl: self, run: 0 }
    }

    /// Creates a cursor that decodes integers without borrowing the sequence.
    pub const fn cursor(&self) -> RunCursor {
        RunCursor {
            pos: 0,
            run: 0,
            generation: self.generation,
        }
    }

    /// Gets the number of integers.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.ends.last().copied().unwrap_or(0)
    }

    /// Checks if the sequence is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the number of runs.
    #[inline(always)]
    pub fn num_runs(&self) -> usize {
        self.ends.len()
    }

    /// Returns the bits per run value of the tight run storage, or [`None`] for plain storage.
    pub const fn value_width(&self) -> Option<usize> {
        self.values.width()
    }

    /// Returns the current generation, advanced by every mutation.
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// Returns the run covering `index` by binary search over the end offsets.
    #[inline(always)]
    fn find_run(&self, index: usize) -> Result<usize> {
        let len = self.len();
        if len <= index {
            return Err(Error::IndexOutOfRange { index, len });
        }
        Ok(self.ends.partition_point(|&end| end <= index))
    }

    #[inline(always)]
    fn run_start(&self, r: usize) -> usize {
        if r == 0 {
            0
        } else {
            self.ends[r - 1]
        }
    }

    #[inline(always)]
    fn run_len(&self, r: usize) -> usize {
        self.ends[r] - self.run_start(r)
    }

    fn shift_ends(&mut self, from: usize, delta: usize, grow: bool) {
        for end in &mut self.ends[from..] {
            if grow {
                *end += delta;
            } else {
                *end -= delta;
            }
        }
    }

    /// Replaces run `r` by `pieces`, skipping empty ones, and shifts the
    /// following end offsets accordingly.
    fn replace_run(&mut self, r: usize, pieces: &[(u64, usize)]) -> Result<()> {
        let old_len = self.run_len(r);
        let new_len: usize = pieces.iter().map(|&(_, c)| c).sum();
        let start = self.run_start(r);

        let pieces: SmallVec<[(u64, usize); 3]> =
            pieces.iter().copied().filter(|&(_, c)| c != 0).collect();

        self.remove_run(r)?;
        if new_len >= old_len {
            self.shift_ends(r, new_len - old_len, true);
        } else {
            self.shift_ends(r, old_len - new_len, false);
        }

        let mut end = start;
        for (i, &(value, count)) in pieces.iter().enumerate() {
            end += count;
            self.values.insert(r + i, value)?;
            self.ends.insert(r + i, end);
        }
        Ok(())
    }

    fn remove_run(&mut self, r: usize) -> Result<()> {
        self.values.remove(r)?;
        self.ends.remove(r);
        Ok(())
    }

    /// Merges consecutive runs with equal values among the runs `lo..=hi`
    /// and their direct neighbours.
    fn merge_around(&mut self, lo: usize, hi: usize) -> Result<()> {
        let mut r = lo.saturating_sub(1);
        let mut hi = hi + 1;
        let mut merged = 0;
        while r < hi && r + 1 < self.num_runs() {
            if self.values.get(r) == self.values.get(r + 1) {
                // The right run keeps the end offset of both.
                self.remove_run(r)?;
                hi -= 1;
                merged += 1;
            } else {
                r += 1;
            }
        }
        if merged != 0 {
            self.logger.debug(format_args!(
                "merged {merged} adjacent runs, {} runs left",
                self.num_runs()
            ));
        }
        Ok(())
    }
}

impl Build for RunLengthVec {
    /// Creates a new sequence from a slice of integers `vals`.
    ///
    /// # Errors
    ///
    /// - [`Error::NegativeValue`] if `vals` contains a negative integer, or
    /// - [`Error::ValueOverflow`] if an integer does not fit in 64 bits.
    fn build_from_slice<T>(vals: &[T]) -> Result<Self>
    where
        T: ToPrimitive + std::fmt::Display,
    {
        Ok(Self::encode(tight_vector::to_u64s(vals)?))
    }
}

impl NumVals for RunLengthVec {
    fn num_vals(&self) -> usize {
        self.len()
    }
}

impl Access for RunLengthVec {
    fn access(&self, pos: usize) -> Option<u64> {
        self.get(pos).ok()
    }
}

impl PartialEq for RunLengthVec {
    fn eq(&self, other: &Self) -> bool {
        self.ends == other.ends && self.runs().eq(other.runs())
    }
}

impl Eq for RunLengthVec {}

impl std::fmt::Debug for RunLengthVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let runs: Vec<(u64, usize)> = self.runs().map(|run| (run.value, run.count)).collect();
        f.debug_struct("RunLengthVec")
            .field("runs", &runs)
            .field("len", &self.len())
            .field("value_width", &self.value_width())
            .finish()
    }
}

impl Serializable for RunLengthVec {
    /// Writes the optional tight width, then the run values and the run
    /// counts as two [`TightVector`]s.
    fn serialize_into<W: Write>(&self, mut writer: W) -> anyhow::Result<usize> {
        let width = self.value_width().map(|w| w as u8);
        let values: Vec<u64> = self.runs().map(|run| run.value).collect();
        let counts: Vec<u64> = self.runs().map(|run| run.count as u64).collect();
        let mut mem = width.serialize_into(&mut writer)?;
        mem += TightVector::from_slice(&values).serialize_into(&mut writer)?;
        mem += TightVector::from_slice(&counts).serialize_into(&mut writer)?;
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> anyhow::Result<Self> {
        let width = Option::<u8>::deserialize_from(&mut reader)?;
        let values = TightVector::deserialize_from(&mut reader)?;
        let counts = TightVector::deserialize_from(&mut reader)?;
        if values.len() != counts.len() {
            return Err(anyhow::anyhow!(
                "got {} run values but {} run counts.",
                values.len(),
                counts.len()
            ));
        }
        let mut rl = match width {
            Some(w) => Self::with_tight_values(usize::from(w))?,
            None => Self::new(),
        };
        for (value, count) in values.iter().zip(counts.iter()) {
            rl.push_run(value, usize::try_from(count)?)?;
        }
        Ok(rl)
    }

    fn size_in_bytes(&self) -> usize {
        let values: Vec<u64> = self.runs().map(|run| run.value).collect();
        let counts: Vec<u64> = self.runs().map(|run| run.count as u64).collect();
        self.value_width().map(|w| w as u8).size_in_bytes()
            + TightVector::from_slice(&values).size_in_bytes()
            + TightVector::from_slice(&counts).size_in_bytes()
    }
}

/// Iterator decoding integers, created by [`RunLengthVec::iter()`].
#[derive(Clone)]
pub struct Iter<'a> {
    rl: &'a RunLengthVec,
    run: usize,
    pos: usize,
}

impl Iterator for Iter<'_> {
    type Item = u64;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.rl.len() {
            return None;
        }
        if self.rl.ends[self.run] <= self.pos {
            self.run += 1;
        }
        self.pos += 1;
        Some(self.rl.values.get(self.run))
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.rl.len() - self.pos;
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a RunLengthVec {
    type Item = u64;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over runs, created by [`RunLengthVec::runs()`].
#[derive(Clone)]
pub struct Runs<'a> {
    rl: &'a RunLengthVec,
    run: usize,
}

impl Iterator for Runs<'_> {
    type Item = Run;

    fn next(&mut self) -> Option<Self::Item> {
        if self.run < self.rl.num_runs() {
            let run = Run::new(self.rl.values.get(self.run), self.rl.run_len(self.run));
            self.run += 1;
            Some(run)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.rl.num_runs() - self.run;
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for Runs<'_> {}

/// Detached cursor over a [`RunLengthVec`], created by [`RunLengthVec::cursor()`].
///
/// Fails with [`Error::InvalidatedIterator`] once the sequence has been mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunCursor {
    pos: usize,
    run: usize,
    generation: Generation,
}

impl RunCursor {
    /// Decodes the next integer of `rl`, or returns [`None`] at the end.
    pub fn advance(&mut self, rl: &RunLengthVec) -> Option<Result<u64>> {
        if let Err(e) = self.generation.ensure(rl.generation) {
            return Some(Err(e));
        }
        if self.pos >= rl.len() {
            return None;
        }
        let passed = rl.ends.get(self.run).map_or(false, |&end| end <= self.pos);
        let run = self.run + usize::from(passed);
        match rl.values.try_get(run) {
            Some(value) => {
                self.run = run;
                self.pos += 1;
                Some(Ok(value))
            }
            // The runs no longer line up with the cursor position.
            None => Some(Err(Error::InvalidatedIterator {
                expected: self.generation.get(),
                found: rl.generation.get(),
            })),
        }
    }

    /// Moves the cursor back to the first integer.
    pub fn rewind(&mut self) {
        self.pos = 0;
        self.run = 0;
    }

    /// Returns the position of the next integer to decode.
    pub const fn position(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    use crate::log::Severity;

    fn gen_runny_ints(len: usize, max: u64, seed: u64) -> Vec<u64> {
        let mut rng = ChaChaRng::seed_from_u64(seed);
        let mut ints = Vec::with_capacity(len);
        while ints.len() < len {
            let x = rng.gen_range(0..=max);
            let count = rng.gen_range(1..8);
            for _ in 0..count.min(len - ints.len()) {
                ints.push(x);
            }
        }
        ints
    }

    fn assert_canonical(rl: &RunLengthVec) {
        let runs: Vec<Run> = rl.runs().collect();
        for run in &runs {
            assert_ne!(run.count, 0);
        }
        for pair in runs.windows(2) {
            assert_ne!(pair[0].value, pair[1].value, "{rl:?}");
        }
        assert_eq!(runs.iter().map(|r| r.count).sum::<usize>(), rl.len());
    }

    fn assert_same(rl: &RunLengthVec, ints: &[u64]) {
        assert_eq!(rl.len(), ints.len());
        assert_eq!(rl.iter().collect::<Vec<_>>(), ints);
        for (i, &x) in ints.iter().enumerate() {
            assert_eq!(rl.get(i), Ok(x));
        }
        assert_canonical(rl);
    }

    #[test]
    fn test_encode_decode_random() {
        for seed in 0..20 {
            let ints = gen_runny_ints(1000, 5, seed);
            let runs = encode(ints.iter().copied());
            assert_eq!(decode(&runs).collect::<Vec<_>>(), ints);
            let rl = RunLengthVec::encode(ints.iter().copied());
            assert_eq!(rl.runs().collect::<Vec<_>>(), runs);
            assert_same(&rl, &ints);
        }
    }

    #[test]
    fn test_encode_empty() {
        assert!(encode(Vec::new()).is_empty());
        assert_eq!(decode(&[]).count(), 0);
        let rl = RunLengthVec::encode(Vec::new());
        assert!(rl.is_empty());
        assert_eq!(rl.get(0), Err(Error::IndexOutOfRange { index: 0, len: 0 }));
    }

    #[test]
    fn test_decode_skips_empty_runs() {
        let runs = [Run::new(1, 0), Run::new(2, 2), Run::new(3, 0)];
        assert_eq!(decode(&runs).collect::<Vec<_>>(), vec![2, 2]);
        let rl = RunLengthVec::from_runs(&[Run::new(1, 2), Run::new(2, 0), Run::new(1, 3)]);
        assert_eq!(rl.runs().collect::<Vec<_>>(), vec![Run::new(1, 5)]);
    }

    #[test]
    fn test_push_identical() {
        let mut rl = RunLengthVec::new();
        for _ in 0..1000 {
            rl.push(42).unwrap();
        }
        assert_eq!(rl.runs().collect::<Vec<_>>(), vec![Run::new(42, 1000)]);
    }

    #[test]
    fn test_set_cases() {
        // Mirrors a sequence "aaabbbbc".
        let mut rl = RunLengthVec::encode([0, 0, 0, 1, 1, 1, 1, 2]);
        let mut ints = vec![0, 0, 0, 1, 1, 1, 1, 2];

        // Joins the previous run.
        rl.set(3, 0).unwrap();
        ints[3] = 0;
        assert_same(&rl, &ints);
        assert_eq!(
            rl.runs().collect::<Vec<_>>(),
            vec![Run::new(0, 4), Run::new(1, 3), Run::new(2, 1)]
        );

        // Joins the next run.
        rl.set(6, 2).unwrap();
        ints[6] = 2;
        assert_same(&rl, &ints);

        // Splits in the middle.
        rl.set(1, 9).unwrap();
        ints[1] = 9;
        assert_same(&rl, &ints);
        assert_eq!(rl.num_runs(), 5);

        // Changes a singleton run and merges both sides.
        rl.set(1, 0).unwrap();
        ints[1] = 0;
        assert_same(&rl, &ints);
        assert_eq!(
            rl.runs().collect::<Vec<_>>(),
            vec![Run::new(0, 4), Run::new(1, 2), Run::new(2, 2)]
        );

        // No-op.
        let generation = rl.generation();
        rl.set(0, 0).unwrap();
        assert_eq!(rl.generation(), generation);
    }

    #[test]
    fn test_insert_cases() {
        let mut rl = RunLengthVec::encode([5, 5, 6, 6]);
        rl.insert(1, 5).unwrap();
        assert_same(&rl, &[5, 5, 5, 6, 6]);
        rl.insert(3, 7).unwrap();
        assert_same(&rl, &[5, 5, 5, 7, 6, 6]);
        rl.insert(0, 1).unwrap();
        assert_same(&rl, &[1, 5, 5, 5, 7, 6, 6]);
        rl.insert(7, 6).unwrap();
        assert_same(&rl, &[1, 5, 5, 5, 7, 6, 6, 6]);
        rl.insert(2, 8).unwrap();
        assert_same(&rl, &[1, 5, 8, 5, 5, 7, 6, 6, 6]);
        // Inserting before a run start with the previous run's value.
        rl.insert(5, 5).unwrap();
        assert_same(&rl, &[1, 5, 8, 5, 5, 5, 7, 6, 6, 6]);
        assert_eq!(
            rl.insert(11, 0),
            Err(Error::IndexOutOfRange { index: 11, len: 10 })
        );
    }

    #[test]
    fn test_remove_merges() {
        let mut rl = RunLengthVec::encode([3, 3, 4, 3, 3]);
        assert_eq!(rl.remove(2), Ok(4));
        assert_eq!(rl.runs().collect::<Vec<_>>(), vec![Run::new(3, 4)]);
        assert_eq!(rl.remove(0), Ok(3));
        assert_same(&rl, &[3, 3, 3]);
        assert_eq!(rl.remove(3), Err(Error::IndexOutOfRange { index: 3, len: 3 }));
    }

    #[test]
    fn test_random_edits() {
        let mut rng = ChaChaRng::seed_from_u64(334);
        let mut ints = gen_runny_ints(300, 3, 7);
        let mut rl = RunLengthVec::encode(ints.iter().copied());
        for _ in 0..2000 {
            let x = rng.gen_range(0..4);
            match rng.gen_range(0..3) {
                0 if !ints.is_empty() => {
                    let i = rng.gen_range(0..ints.len());
                    ints[i] = x;
                    rl.set(i, x).unwrap();
                }
                1 => {
                    let i = rng.gen_range(0..=ints.len());
                    ints.insert(i, x);
                    rl.insert(i, x).unwrap();
                }
                _ if !ints.is_empty() => {
                    let i = rng.gen_range(0..ints.len());
                    assert_eq!(rl.remove(i), Ok(ints.remove(i)));
                }
                _ => {}
            }
            assert_canonical(&rl);
        }
        assert_same(&rl, &ints);
    }

    #[test]
    fn test_tight_values() {
        let mut rl = RunLengthVec::with_tight_values(3).unwrap();
        assert_eq!(rl.value_width(), Some(3));
        for x in [7, 7, 0, 1, 1] {
            rl.push(x).unwrap();
        }
        assert_eq!(rl.push(8), Err(Error::CapacityExceeded { value: 8, width: 3 }));
        assert_eq!(rl.set(0, 9), Err(Error::CapacityExceeded { value: 9, width: 3 }));
        assert_eq!(
            rl.insert(1, 10),
            Err(Error::CapacityExceeded {
                value: 10,
                width: 3
            })
        );
        assert_same(&rl, &[7, 7, 0, 1, 1]);
        rl.set(2, 1).unwrap();
        assert_same(&rl, &[7, 7, 1, 1, 1]);
        rl.remove(0).unwrap();
        rl.insert(4, 7).unwrap();
        assert_same(&rl, &[7, 1, 1, 1, 7]);
        assert_eq!(
            RunLengthVec::with_tight_values(65).err(),
            Some(Error::UnsupportedWidth {
                width: 65,
                max: 64
            })
        );
    }

    #[test]
    fn test_resize() {
        let mut rl = RunLengthVec::encode([1, 1, 2, 2, 3]);
        rl.resize(3, 0).unwrap();
        assert_same(&rl, &[1, 1, 2]);
        rl.resize(5, 2).unwrap();
        assert_same(&rl, &[1, 1, 2, 2, 2]);
        rl.resize(0, 0).unwrap();
        assert!(rl.is_empty());
        assert_eq!(rl.num_runs(), 0);
    }

    #[test]
    fn test_cursor_invalidation() {
        let mut rl = RunLengthVec::encode([1, 1, 2]);
        let mut cursor = rl.cursor();
        assert_eq!(cursor.advance(&rl), Some(Ok(1)));
        assert_eq!(cursor.advance(&rl), Some(Ok(1)));
        assert_eq!(cursor.advance(&rl), Some(Ok(2)));
        assert_eq!(cursor.advance(&rl), None);
        cursor.rewind();
        assert_eq!(cursor.position(), 0);

        rl.set(0, 2).unwrap();
        assert!(matches!(
            cursor.advance(&rl),
            Some(Err(Error::InvalidatedIterator { .. }))
        ));
        let mut fresh = rl.cursor();
        assert_eq!(fresh.advance(&rl), Some(Ok(2)));
    }

    #[test]
    fn test_cursor_on_diverged_clone() {
        let mut a = RunLengthVec::encode([1, 1, 2]);
        let mut b = a.clone();
        a.push_run(3, 4).unwrap();
        b.clear();
        b.push(5).unwrap();
        let mut cursor = a.cursor();
        assert_eq!(cursor.advance(&a), Some(Ok(1)));
        assert!(matches!(
            cursor.advance(&b),
            Some(Err(Error::InvalidatedIterator { .. }))
        ));
        assert_eq!(cursor.advance(&a), Some(Ok(1)));
    }

    #[test]
    fn test_tight_resize_and_clear() {
        let mut rl = RunLengthVec::with_tight_values(3).unwrap();
        rl.push_run(5, 3).unwrap();
        rl.push_run(2, 2).unwrap();
        rl.resize(2, 0).unwrap();
        assert_eq!(rl.iter().collect::<Vec<_>>(), vec![5, 5]);
        assert_eq!(rl.num_runs(), 1);
        rl.clear();
        assert!(rl.is_empty());
        assert_eq!(rl.value_width(), Some(3));
        rl.push(7).unwrap();
        assert_eq!(rl.get(0), Ok(7));
    }

    #[test]
    fn test_build_from_slice() {
        let rl = RunLengthVec::build_from_slice(&[1i64, 1, 0]).unwrap();
        assert_eq!(rl.num_vals(), 3);
        assert_eq!(rl.access(2), Some(0));
        assert!(RunLengthVec::build_from_slice(&[-1i64]).is_err());
    }

    #[test]
    fn test_logging() {
        #[derive(Default)]
        struct Recorder(Mutex<Vec<Severity>>);

        impl LogSink for Recorder {
            fn log(&self, severity: Severity, _message: &str) {
                self.0.lock().unwrap().push(severity);
            }
        }

        let recorder = Arc::new(Recorder::default());
        let mut rl = RunLengthVec::encode([1, 2, 1]).with_sink(recorder.clone());
        rl.set(1, 1).unwrap();
        let got = recorder.0.lock().unwrap().clone();
        assert_eq!(got, vec![Severity::Trace, Severity::Debug]);

        let mut silent = RunLengthVec::encode([1, 2, 1]);
        silent.set(1, 1).unwrap();
        assert_eq!(silent, rl);
    }

    #[test]
    fn test_serialize() {
        let ints = gen_runny_ints(500, 100, 42);
        for rl in [
            RunLengthVec::encode(ints.iter().copied()),
            {
                let mut rl = RunLengthVec::with_tight_values(7).unwrap();
                for &x in &ints {
                    rl.push(x).unwrap();
                }
                rl
            },
        ] {
            let mut bytes = vec![];
            let size = rl.serialize_into(&mut bytes).unwrap();
            let other = RunLengthVec::deserialize_from(&bytes[..]).unwrap();
            assert_eq!(rl, other);
            assert_eq!(rl.value_width(), other.value_width());
            assert_eq!(size, bytes.len());
            assert_eq!(size, rl.size_in_bytes());
        }
    }
}
