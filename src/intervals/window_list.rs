//! Conversion of an [`IntervalCollection`] into availability windows grouped by sensor
//! then target, the layout expected by schedule plotting tools.
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::constants::{AgentId, Epoch};
use crate::intervals::IntervalCollection;

/// Availability windows as `(start, duration)` pairs.
///
/// `windows[i][j]` holds the windows of sensor `sensor_ids[i]` on target `target_ids[j]`,
/// sorted by start time. Only identifiers owning at least one interval appear, so a
/// cell may be empty when a sensor never sees a particular target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowList {
    pub sensor_ids: Vec<AgentId>,
    pub target_ids: Vec<AgentId>,
    pub windows: Vec<Vec<Vec<(Epoch, f64)>>>,
}

impl WindowList {
    pub fn from_intervals(collection: &IntervalCollection) -> Self {
        let sensor_ids: Vec<AgentId> = collection
            .iter()
            .map(|iv| iv.pair.sensor_id.clone())
            .sorted()
            .dedup()
            .collect();
        let target_ids: Vec<AgentId> = collection
            .iter()
            .map(|iv| iv.pair.target_id.clone())
            .sorted()
            .dedup()
            .collect();

        let mut windows = vec![vec![Vec::new(); target_ids.len()]; sensor_ids.len()];
        for iv in collection {
            // both lookups succeed: the id lists were built from this collection
            if let (Ok(i), Ok(j)) = (
                sensor_ids.binary_search(&iv.pair.sensor_id),
                target_ids.binary_search(&iv.pair.target_id),
            ) {
                windows[i][j].push((iv.begin, iv.duration()));
            }
        }

        WindowList {
            sensor_ids,
            target_ids,
            windows,
        }
    }

    pub fn num_sensors(&self) -> usize {
        self.sensor_ids.len()
    }

    pub fn num_targets(&self) -> usize {
        self.target_ids.len()
    }

    /// Windows of one sensor-target pair, `None` if either identifier is unknown.
    pub fn get(&self, sensor_id: &AgentId, target_id: &AgentId) -> Option<&[(Epoch, f64)]> {
        let i = self.sensor_ids.binary_search(sensor_id).ok()?;
        let j = self.target_ids.binary_search(target_id).ok()?;
        Some(&self.windows[i][j])
    }
}

impl From<&IntervalCollection> for WindowList {
    fn from(collection: &IntervalCollection) -> Self {
        WindowList::from_intervals(collection)
    }
}
