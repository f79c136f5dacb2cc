//! # Tagged visibility intervals
//!
//! Every visibility window is an [`Interval`] carrying the [`PairTag`] of the
//! sensor-target pair it belongs to. Windows of all pairs live together in an
//! [`IntervalCollection`], a multiset kept sorted by start time that answers point
//! containment queries.
//!
//! Containment is half-open: an interval `[begin, end)` contains `begin` but not `end`.
//!
//! ```rust
//! use satvis::intervals::{Interval, IntervalCollection, PairTag};
//!
//! let pair = PairTag::new(1, "A");
//! let collection: IntervalCollection = vec![
//!     Interval::new(0.0, 2.0, pair.clone()).unwrap(),
//!     Interval::new(5.0, 7.5, pair).unwrap(),
//! ]
//! .into_iter()
//! .collect();
//!
//! assert_eq!(collection.at(6.0).count(), 1);
//! assert_eq!(collection.at(2.0).count(), 0);
//! ```
use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{AgentId, Epoch};
use crate::satvis_errors::SatVisError;

pub mod window_list;

/// Identifiers of the sensor-target pair an interval or crossing belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairTag {
    pub target_id: AgentId,
    pub sensor_id: AgentId,
}

impl PairTag {
    pub fn new(target_id: impl Into<AgentId>, sensor_id: impl Into<AgentId>) -> Self {
        PairTag {
            target_id: target_id.into(),
            sensor_id: sensor_id.into(),
        }
    }
}

impl fmt::Display for PairTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(target={}, sensor={})", self.target_id, self.sensor_id)
    }
}

/// Visibility window `[begin, end)` of one sensor-target pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub begin: Epoch,
    pub end: Epoch,
    pub pair: PairTag,
}

impl Interval {
    /// Build an interval, rejecting empty, reversed or non-finite bounds.
    pub fn new(begin: Epoch, end: Epoch, pair: PairTag) -> Result<Self, SatVisError> {
        if !(begin.is_finite() && end.is_finite() && begin < end) {
            return Err(SatVisError::InvalidInterval { begin, end });
        }
        Ok(Interval { begin, end, pair })
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.end - self.begin
    }

    /// True when `time` lies in `[begin, end)`.
    #[inline]
    pub fn contains(&self, time: Epoch) -> bool {
        self.begin <= time && time < self.end
    }

    /// True when `[begin, end)` shares at least one instant with this interval.
    #[inline]
    pub fn overlaps(&self, begin: Epoch, end: Epoch) -> bool {
        self.begin < end && begin < self.end
    }

    fn sort_order(&self, other: &Self) -> Ordering {
        self.begin
            .total_cmp(&other.begin)
            .then_with(|| self.end.total_cmp(&other.end))
            .then_with(|| self.pair.cmp(&other.pair))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}) {}", self.begin, self.end, self.pair)
    }
}

/// Multiset of [`Interval`]s sorted by `(begin, end, pair)`.
///
/// Point queries binary-search the start times and only scan the intervals whose start
/// is within the longest stored duration of the query time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalCollection {
    intervals: Vec<Interval>,
    max_duration: f64,
}

impl IntervalCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// The `index`-th interval in `(begin, end, pair)` order.
    pub fn get(&self, index: usize) -> Option<&Interval> {
        self.intervals.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.intervals.iter()
    }

    pub fn as_slice(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn insert(&mut self, interval: Interval) {
        let idx = self
            .intervals
            .partition_point(|iv| iv.sort_order(&interval) != Ordering::Greater);
        self.max_duration = self.max_duration.max(interval.duration());
        self.intervals.insert(idx, interval);
    }

    /// Move every interval of `other` into `self`. Duplicates are kept.
    pub fn merge(&mut self, other: IntervalCollection) {
        if other.is_empty() {
            return;
        }
        self.max_duration = self.max_duration.max(other.max_duration);
        self.intervals.extend(other.intervals);
        self.intervals.sort_by(Interval::sort_order);
    }

    /// Multiset union of two collections; `self.len() + other.len()` intervals.
    pub fn union(&self, other: &IntervalCollection) -> IntervalCollection {
        let mut merged = self.clone();
        merged.merge(other.clone());
        merged
    }

    /// Intervals containing `time`.
    pub fn at(&self, time: Epoch) -> impl Iterator<Item = &Interval> + '_ {
        let upper = self.intervals.partition_point(|iv| iv.begin <= time);
        let lower = self.intervals[..upper]
            .partition_point(|iv| iv.begin + self.max_duration < time);
        self.intervals[lower..upper]
            .iter()
            .filter(move |iv| iv.contains(time))
    }

    /// Intervals sharing at least one instant with `[begin, end)`.
    pub fn overlapping(&self, begin: Epoch, end: Epoch) -> impl Iterator<Item = &Interval> + '_ {
        let upper = self.intervals.partition_point(|iv| iv.begin < end);
        let lower = self.intervals[..upper]
            .partition_point(|iv| iv.begin + self.max_duration < begin);
        self.intervals[lower..upper]
            .iter()
            .filter(move |iv| iv.overlaps(begin, end))
    }

    /// Intervals belonging to `pair`.
    pub fn for_pair<'a>(&'a self, pair: &'a PairTag) -> impl Iterator<Item = &'a Interval> + 'a {
        self.intervals.iter().filter(move |iv| &iv.pair == pair)
    }

    /// Earliest begin and latest end over all intervals.
    pub fn span(&self) -> Option<(Epoch, Epoch)> {
        let first = self.intervals.first()?.begin;
        let last = self
            .intervals
            .iter()
            .map(|iv| iv.end)
            .fold(f64::NEG_INFINITY, f64::max);
        Some((first, last))
    }

    pub fn into_vec(self) -> Vec<Interval> {
        self.intervals
    }
}

impl FromIterator<Interval> for IntervalCollection {
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        let mut intervals: Vec<Interval> = iter.into_iter().collect();
        intervals.sort_by(Interval::sort_order);
        let max_duration = intervals
            .iter()
            .map(Interval::duration)
            .fold(0.0, f64::max);
        IntervalCollection {
            intervals,
            max_duration,
        }
    }
}

impl Extend<Interval> for IntervalCollection {
    fn extend<I: IntoIterator<Item = Interval>>(&mut self, iter: I) {
        self.merge(iter.into_iter().collect());
    }
}

impl IntoIterator for IntervalCollection {
    type Item = Interval;
    type IntoIter = std::vec::IntoIter<Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.into_iter()
    }
}

impl<'a> IntoIterator for &'a IntervalCollection {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

impl fmt::Display for IntervalCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IntervalCollection ({} intervals)", self.len())?;
        for iv in &self.intervals {
            writeln!(f, "  {iv}")?;
        }
        Ok(())
    }
}
