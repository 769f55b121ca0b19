//! Sorted set of pairwise disjoint intervals.
use std::iter::FusedIterator;
use std::sync::Arc;

use num_traits::PrimInt;

use crate::error::{Error, Result};
use crate::generation::Generation;
use crate::intervals::Interval;
use crate::log::{LogSink, Logger};

/// Sorted set of pairwise disjoint intervals.
///
/// Members are kept in ascending order, and no two members overlap or touch at
/// a point belonging to either of them, so that every point of the set lies in
/// exactly one member. Inserting an interval merges every member it touches,
/// and removing one trims or splits the members it overlaps.
///
/// # Examples
///
/// ```
/// use tightpack::intervals::{Interval, IntervalSet};
///
/// let mut set = IntervalSet::new();
/// set.insert(Interval::closed(1, 3));
/// set.insert(Interval::closed(5, 7));
/// set.insert(Interval::closed(3, 5));
/// assert_eq!(set.iter().collect::<Vec<_>>(), vec![&Interval::closed(1, 7)]);
///
/// set.remove(Interval::closed(2, 4));
/// assert_eq!(
///     set.iter().copied().collect::<Vec<_>>(),
///     vec![Interval::closed_open(1, 2), Interval::open_closed(4, 7)]
/// );
/// assert!(set.contains(1));
/// assert!(!set.contains(3));
/// ```
#[derive(Clone)]
pub struct IntervalSet<T>
where
    T: PrimInt,
{
    members: Vec<Interval<T>>,
    generation: Generation,
    logger: Logger,
}

impl<T> IntervalSet<T>
where
    T: PrimInt,
{
    /// Creates a new empty set.
    pub fn new() -> Self {
        Self {
            members: vec![],
            generation: Generation::new(),
            logger: Logger::noop(),
        }
    }

    /// Attaches a sink receiving merge and split events.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.logger = Logger::new(sink);
        self
    }

    /// Adds every point of `interval`, merging all members it touches into one.
    ///
    /// Inserting the empty interval is a no-op.
    ///
    /// # Complexity
    ///
    /// $`O(\lg n + k)`$ comparisons for $`k`$ merged members, plus the shift of
    /// the following members.
    pub fn insert(&mut self, interval: Interval<T>) {
        if interval.is_empty() {
            return;
        }
        let start = self.members.partition_point(|m| {
            m.upper_key() < interval.lower_key() && !m.is_mergeable(&interval)
        });
        let end = self.members.partition_point(|m| {
            m.lower_key() <= interval.upper_key() || m.is_mergeable(&interval)
        });
        let merged = self.members[start..end]
            .iter()
            .fold(interval, |acc, m| acc.hull(m));
        if end - start > 0 {
            self.logger.debug(format_args!(
                "merged {} members at {start} into one",
                end - start
            ));
        }
        self.members.splice(start..end, std::iter::once(merged));
        self.generation.bump();
    }

    /// Removes every point of `interval`.
    ///
    /// Each overlapping member is dropped, trimmed, or split in two.
    pub fn remove(&mut self, interval: Interval<T>) {
        if interval.is_empty() {
            return;
        }
        let (start, end) = self.overlapping(&interval);
        if start == end {
            return;
        }
        let pieces: Vec<Interval<T>> = self.members[start..end]
            .iter()
            .flat_map(|m| m.difference(&interval))
            .collect();
        self.logger.debug(format_args!(
            "removal replaced {} members at {start} by {}",
            end - start,
            pieces.len()
        ));
        self.members.splice(start..end, pieces);
        self.generation.bump();
    }

    /// Returns the member containing `point`, if any.
    ///
    /// # Complexity
    ///
    /// $`O(\lg n)`$
    pub fn query(&self, point: T) -> Option<&Interval<T>> {
        let idx = self.members.partition_point(|m| m.lower_key() <= (point, 0));
        let member = self.members.get(idx.checked_sub(1)?)?;
        if member.contains(point) {
            Some(member)
        } else {
            None
        }
    }

    /// Checks if `point` lies in a member.
    pub fn contains(&self, point: T) -> bool {
        self.query(point).is_some()
    }

    /// Creates an iterator over the members overlapping `interval`, in ascending order.
    ///
    /// The iterator is restartable by cloning it before consumption.
    ///
    /// # Complexity
    ///
    /// $`O(\lg n + k)`$ for $`k`$ reported members.
    ///
    /// # Examples
    ///
    /// ```
    /// use tightpack::intervals::{Interval, IntervalSet};
    ///
    /// let set: IntervalSet<u32> = [(0, 2), (4, 6), (8, 10)]
    ///     .into_iter()
    ///     .map(|(a, b)| Interval::closed(a, b))
    ///     .collect();
    ///
    /// let hits: Vec<_> = set.query_range(Interval::open(2, 8)).collect();
    /// assert_eq!(hits, vec![&Interval::closed(4, 6)]);
    /// ```
    pub fn query_range(&self, interval: Interval<T>) -> QueryRange<'_, T> {
        let (start, end) = self.overlapping(&interval);
        QueryRange {
            inner: self.members[start..end].iter(),
        }
    }

    /// Creates a cursor over the members overlapping `interval` that holds no borrow of the set.
    pub fn cursor_range(&self, interval: Interval<T>) -> RangeCursor {
        let (start, end) = self.overlapping(&interval);
        RangeCursor {
            start,
            pos: start,
            end,
            generation: self.generation,
        }
    }

    /// Creates an iterator over all members in ascending order.
    pub fn iter(&self) -> std::slice::Iter<'_, Interval<T>> {
        self.members.iter()
    }

    /// Returns the members in ascending order.
    pub fn as_slice(&self) -> &[Interval<T>] {
        &self.members
    }

    /// Gets the number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Checks if the set has no member.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Removes all members.
    pub fn clear(&mut self) {
        self.members.clear();
        self.generation.bump();
    }

    /// Returns the current generation, advanced by every insertion and removal.
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// Returns the range of member indices overlapping `interval`.
    fn overlapping(&self, interval: &Interval<T>) -> (usize, usize) {
        if interval.is_empty() {
            return (0, 0);
        }
        let start = self
            .members
            .partition_point(|m| m.upper_key() < interval.lower_key());
        let end = self
            .members
            .partition_point(|m| m.lower_key() <= interval.upper_key());
        (start, end.max(start))
    }
}

impl<T> Default for IntervalSet<T>
where
    T: PrimInt,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PartialEq for IntervalSet<T>
where
    T: PrimInt,
{
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl<T> Eq for IntervalSet<T> where T: PrimInt {}

impl<T> std::fmt::Debug for IntervalSet<T>
where
    T: PrimInt + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.members.iter()).finish()
    }
}

impl<T> FromIterator<Interval<T>> for IntervalSet<T>
where
    T: PrimInt,
{
    fn from_iter<I: IntoIterator<Item = Interval<T>>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T> Extend<Interval<T>> for IntervalSet<T>
where
    T: PrimInt,
{
    fn extend<I: IntoIterator<Item = Interval<T>>>(&mut self, iter: I) {
        for interval in iter {
            self.insert(interval);
        }
    }
}

impl<'a, T> IntoIterator for &'a IntervalSet<T>
where
    T: PrimInt,
{
    type Item = &'a Interval<T>;
    type IntoIter = std::slice::Iter<'a, Interval<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over overlapping members, created by [`IntervalSet::query_range()`].
#[derive(Debug, Clone)]
pub struct QueryRange<'a, T>
where
    T: PrimInt,
{
    inner: std::slice::Iter<'a, Interval<T>>,
}

impl<'a, T> Iterator for QueryRange<'a, T>
where
    T: PrimInt,
{
    type Item = &'a Interval<T>;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for QueryRange<'_, T>
where
    T: PrimInt,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for QueryRange<'_, T> where T: PrimInt {}

impl<T> FusedIterator for QueryRange<'_, T> where T: PrimInt {}

/// Detached cursor over overlapping members, created by [`IntervalSet::cursor_range()`].
///
/// Fails with [`Error::InvalidatedIterator`](crate::Error::InvalidatedIterator)
/// once the set has been inserted into, removed from, or cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeCursor {
    start: usize,
    pos: usize,
    end: usize,
    generation: Generation,
}

impl RangeCursor {
    /// Returns the next overlapping member of `set`, or [`None`] at the end.
    pub fn advance<T>(&mut self, set: &IntervalSet<T>) -> Option<Result<Interval<T>>>
    where
        T: PrimInt,
    {
        if let Err(e) = self.generation.ensure(set.generation) {
            return Some(Err(e));
        }
        if self.pos >= self.end {
            return None;
        }
        match set.members.get(self.pos) {
            Some(&member) => {
                self.pos += 1;
                Some(Ok(member))
            }
            None => Some(Err(Error::InvalidatedIterator {
                expected: self.generation.get(),
                found: set.generation.get(),
            })),
        }
    }

    /// Moves the cursor back to the first overlapping member.
    pub fn rewind(&mut self) {
        self.pos = self.start;
    }

    /// Returns the number of members left to report.
    pub const fn remaining(&self) -> usize {
        self.end - self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    use crate::log::Severity;

    fn assert_canonical<T: PrimInt + std::fmt::Debug>(set: &IntervalSet<T>) {
        for m in set.iter() {
            assert!(!m.is_empty());
        }
        for pair in set.as_slice().windows(2) {
            assert!(pair[0] < pair[1], "{set:?}");
            assert!(!pair[0].is_mergeable(&pair[1]), "{set:?}");
        }
    }

    #[test]
    fn test_insert_merges_chain() {
        let mut set = IntervalSet::new();
        set.insert(Interval::closed(1, 3));
        set.insert(Interval::closed(5, 7));
        assert_eq!(set.len(), 2);
        set.insert(Interval::closed(3, 5));
        assert_eq!(set.as_slice(), &[Interval::closed(1, 7)]);
    }

    #[test]
    fn test_insert_adjacency() {
        let mut set = IntervalSet::new();
        set.insert(Interval::closed_open(1, 3));
        set.insert(Interval::open_closed(3, 6));
        assert_eq!(set.len(), 2);
        set.insert(Interval::point(3));
        assert_eq!(set.as_slice(), &[Interval::closed(1, 6)]);

        set.insert(Interval::open(6, 9));
        assert_eq!(set.as_slice(), &[Interval::closed_open(1, 9)]);
        set.insert(Interval::closed(20, 30));
        set.insert(Interval::empty());
        set.insert(Interval::closed(0, 25));
        assert_eq!(set.as_slice(), &[Interval::closed(0, 30)]);
    }

    #[test]
    fn test_remove_splits() {
        let mut set = IntervalSet::new();
        set.insert(Interval::closed(1, 10));
        set.remove(Interval::closed(2, 4));
        assert_eq!(
            set.as_slice(),
            &[Interval::closed_open(1, 2), Interval::open_closed(4, 10)]
        );
        assert_eq!(set.query(2), None);
        assert_eq!(set.query(4), None);
        assert_eq!(set.query(1), Some(&Interval::closed_open(1, 2)));

        set.remove(Interval::closed(0, 5));
        assert_eq!(set.as_slice(), &[Interval::open_closed(5, 10)]);
        set.remove(Interval::closed(5, 10));
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_across_members() {
        let mut set: IntervalSet<i32> = [(0, 10), (20, 30), (40, 50)]
            .into_iter()
            .map(|(a, b)| Interval::closed(a, b))
            .collect();
        let generation = set.generation();
        set.remove(Interval::open(11, 19));
        assert_eq!(set.generation(), generation);

        set.remove(Interval::open(5, 45));
        assert_eq!(
            set.as_slice(),
            &[Interval::closed(0, 5), Interval::closed(45, 50)]
        );
    }

    #[test]
    fn test_query() {
        let set: IntervalSet<i64> = [Interval::open(-5, 0), Interval::closed(3, 3)]
            .into_iter()
            .collect();
        assert_eq!(set.query(-5), None);
        assert_eq!(set.query(-1), Some(&Interval::open(-5, 0)));
        assert_eq!(set.query(0), None);
        assert_eq!(set.query(3), Some(&Interval::point(3)));
        assert!(!set.contains(4));
        assert!(!IntervalSet::<i64>::new().contains(0));
    }

    #[test]
    fn test_query_range() {
        let set: IntervalSet<u32> = (0..10).map(|i| Interval::closed(i * 10, i * 10 + 5)).collect();
        let hits: Vec<_> = set.query_range(Interval::closed(15, 40)).copied().collect();
        assert_eq!(
            hits,
            vec![
                Interval::closed(10, 15),
                Interval::closed(20, 25),
                Interval::closed(30, 35),
                Interval::closed(40, 45),
            ]
        );
        assert_eq!(set.query_range(Interval::open(15, 20)).count(), 0);
        assert_eq!(set.query_range(Interval::empty()).count(), 0);

        let iter = set.query_range(Interval::closed(0, 100));
        assert_eq!(iter.len(), 10);
        assert_eq!(iter.clone().count(), iter.count());
    }

    #[test]
    fn test_random_against_model() {
        let mut rng = ChaChaRng::seed_from_u64(13);
        let mut set = IntervalSet::new();
        let mut model = [false; 101];
        for _ in 0..500 {
            let a = rng.gen_range(0..=100i32);
            let b = rng.gen_range(a..=100);
            let iv = Interval::closed(a, b);
            let covered = rng.gen_bool(0.6);
            if covered {
                set.insert(iv);
            } else {
                set.remove(iv);
            }
            for x in a..=b {
                model[x as usize] = covered;
            }
            assert_canonical(&set);

            let q = rng.gen_range(0..=100i32);
            let r = rng.gen_range(q..=100);
            let hits: Vec<_> = set.query_range(Interval::closed(q, r)).collect();
            for pair in hits.windows(2) {
                assert!(pair[0].lower() < pair[1].lower());
            }
            let expected = set
                .iter()
                .filter(|m| m.overlaps(&Interval::closed(q, r)))
                .count();
            assert_eq!(hits.len(), expected);
        }
        for (x, &covered) in model.iter().enumerate() {
            assert_eq!(set.contains(x as i32), covered, "{x}");
        }
    }

    #[test]
    fn test_cursor_range() {
        let mut set: IntervalSet<u8> = [Interval::closed(0, 1), Interval::closed(5, 6)]
            .into_iter()
            .collect();
        let mut cursor = set.cursor_range(Interval::closed(0, 10));
        assert_eq!(cursor.remaining(), 2);
        assert_eq!(cursor.advance(&set), Some(Ok(Interval::closed(0, 1))));
        assert_eq!(cursor.advance(&set), Some(Ok(Interval::closed(5, 6))));
        assert_eq!(cursor.advance(&set), None);
        cursor.rewind();
        assert_eq!(cursor.remaining(), 2);

        set.insert(Interval::closed(2, 3));
        assert!(matches!(
            cursor.advance(&set),
            Some(Err(Error::InvalidatedIterator { .. }))
        ));
    }

    #[test]
    fn test_cursor_range_on_diverged_clone() {
        let mut a: IntervalSet<u8> = std::iter::once(Interval::closed(0, 1)).collect();
        let mut b = a.clone();
        a.insert(Interval::closed(5, 6));
        b.insert(Interval::closed(1, 2));
        assert_eq!(b.len(), 1);
        let mut cursor = a.cursor_range(Interval::closed(0, 10));
        assert_eq!(cursor.remaining(), 2);
        assert_eq!(
            cursor.advance(&b),
            Some(Err(Error::InvalidatedIterator {
                expected: a.generation().get(),
                found: b.generation().get()
            }))
        );
        assert_eq!(cursor.advance(&a), Some(Ok(Interval::closed(0, 1))));
    }

    #[test]
    fn test_clear() {
        let mut set: IntervalSet<u8> = std::iter::once(Interval::closed(0, 1)).collect();
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.query(0), None);
    }

    #[test]
    fn test_logging() {
        #[derive(Default)]
        struct Recorder(Mutex<Vec<String>>);

        impl LogSink for Recorder {
            fn log(&self, severity: Severity, message: &str) {
                assert_eq!(severity, Severity::Debug);
                self.0.lock().unwrap().push(message.to_string());
            }
        }

        let recorder = Arc::new(Recorder::default());
        let mut set = IntervalSet::new().with_sink(recorder.clone());
        set.insert(Interval::closed(1, 3));
        set.insert(Interval::closed(2, 5));
        set.remove(Interval::point(4));
        let got = recorder.0.lock().unwrap().clone();
        assert_eq!(
            got,
            vec![
                "merged 1 members at 0 into one".to_string(),
                "removal replaced 1 members at 0 by 2".to_string(),
            ]
        );
    }
}
