//! # Schedule tree
//!
//! Read-only query layer over the visibility windows of all sensor-target pairs:
//! which pairs are visible at a given time, which targets or sensors are involved, and
//! indexed access to the windows themselves.
//!
//! Point queries use half-open windows `[begin, end)`.
//!
//! ## Example
//!
//! ```rust
//! use satvis::constants::AgentId;
//! use satvis::intervals::{Interval, IntervalCollection, PairTag};
//! use satvis::schedule_tree::ScheduleTree;
//!
//! let windows: IntervalCollection = vec![
//!     Interval::new(0.0, 10.0, PairTag::new(1, "A"))?,
//!     Interval::new(5.0, 20.0, PairTag::new(2, "A"))?,
//! ]
//! .into_iter()
//! .collect();
//!
//! let tree = ScheduleTree::new(windows);
//! assert!(tree.is_visible(7.0, &"A".into(), &1.into()));
//! assert_eq!(tree.visible_targets(7.0), vec![AgentId::from(1), AgentId::from(2)]);
//! assert!(!tree.is_visible(10.0, &"A".into(), &1.into()));
//! # Ok::<(), satvis::satvis_errors::SatVisError>(())
//! ```
use itertools::Itertools;

use crate::constants::{AgentId, Epoch};
use crate::intervals::window_list::WindowList;
use crate::intervals::{Interval, IntervalCollection, PairTag};
use crate::satvis_errors::SatVisError;

/// Visibility windows of all pairs with the sorted identifiers they involve.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleTree {
    intervals: IntervalCollection,
    target_ids: Vec<AgentId>,
    sensor_ids: Vec<AgentId>,
}

impl ScheduleTree {
    pub fn new(intervals: IntervalCollection) -> Self {
        let target_ids = intervals
            .iter()
            .map(|iv| iv.pair.target_id.clone())
            .sorted()
            .dedup()
            .collect();
        let sensor_ids = intervals
            .iter()
            .map(|iv| iv.pair.sensor_id.clone())
            .sorted()
            .dedup()
            .collect();

        ScheduleTree {
            intervals,
            target_ids,
            sensor_ids,
        }
    }

    pub fn intervals(&self) -> &IntervalCollection {
        &self.intervals
    }

    /// Sorted identifiers of the targets owning at least one window.
    pub fn target_ids(&self) -> &[AgentId] {
        &self.target_ids
    }

    /// Sorted identifiers of the sensors owning at least one window.
    pub fn sensor_ids(&self) -> &[AgentId] {
        &self.sensor_ids
    }

    pub fn num_targets(&self) -> usize {
        self.target_ids.len()
    }

    pub fn num_sensors(&self) -> usize {
        self.sensor_ids.len()
    }

    fn interval(&self, index: usize) -> Result<&Interval, SatVisError> {
        self.intervals
            .get(index)
            .ok_or(SatVisError::IntervalNotFound(index))
    }

    pub fn target_at(&self, index: usize) -> Result<&AgentId, SatVisError> {
        Ok(&self.interval(index)?.pair.target_id)
    }

    pub fn sensor_at(&self, index: usize) -> Result<&AgentId, SatVisError> {
        Ok(&self.interval(index)?.pair.sensor_id)
    }

    pub fn start_at(&self, index: usize) -> Result<Epoch, SatVisError> {
        Ok(self.interval(index)?.begin)
    }

    pub fn finish_at(&self, index: usize) -> Result<Epoch, SatVisError> {
        Ok(self.interval(index)?.end)
    }

    pub fn pair_at(&self, index: usize) -> Result<&PairTag, SatVisError> {
        Ok(&self.interval(index)?.pair)
    }

    /// Sorted, de-duplicated targets with an open window at `time`.
    pub fn visible_targets(&self, time: Epoch) -> Vec<AgentId> {
        self.intervals
            .at(time)
            .map(|iv| iv.pair.target_id.clone())
            .sorted()
            .dedup()
            .collect()
    }

    /// Sorted, de-duplicated sensors with an open window at `time`.
    pub fn visible_sensors(&self, time: Epoch) -> Vec<AgentId> {
        self.intervals
            .at(time)
            .map(|iv| iv.pair.sensor_id.clone())
            .sorted()
            .dedup()
            .collect()
    }

    /// True when `sensor_id` and `target_id` share a window containing `time`.
    pub fn is_visible(&self, time: Epoch, sensor_id: &AgentId, target_id: &AgentId) -> bool {
        self.intervals
            .at(time)
            .any(|iv| iv.pair.sensor_id == *sensor_id && iv.pair.target_id == *target_id)
    }

    /// Windows as `(start, duration)` grouped by sensor then target.
    pub fn window_list(&self) -> WindowList {
        WindowList::from_intervals(&self.intervals)
    }
}

impl From<IntervalCollection> for ScheduleTree {
    fn from(intervals: IntervalCollection) -> Self {
        ScheduleTree::new(intervals)
    }
}
