use nalgebra::{Vector3, Vector6};

use crate::satvis_errors::SatVisError;

/// Positions of a set of agents over a common time vector.
///
/// Samples are stored flat, time-major: `positions[i_time * n_agents + i_agent]`.
/// Velocities are not needed to evaluate visibility and are discarded on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct StateHistory {
    positions: Vec<Vector3<f64>>,
    n_times: usize,
    n_agents: usize,
}

impl StateHistory {
    /// Build from position samples indexed `[time][agent]`, in km.
    ///
    /// Errors
    /// -----------------
    /// * [`SatVisError::InvalidStateHistory`] if the rows do not all hold the same number
    ///   of agents.
    pub fn from_positions(samples: Vec<Vec<Vector3<f64>>>) -> Result<Self, SatVisError> {
        let n_times = samples.len();
        let n_agents = samples.first().map_or(0, Vec::len);

        if let Some((i_time, row)) = samples
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != n_agents)
        {
            return Err(SatVisError::InvalidStateHistory(format!(
                "time index {i_time} holds {} agents, expected {n_agents}",
                row.len()
            )));
        }

        Ok(StateHistory {
            positions: samples.into_iter().flatten().collect(),
            n_times,
            n_agents,
        })
    }

    /// Build from `[x, y, z, vx, vy, vz]` state samples indexed `[time][agent]`.
    pub fn from_states(samples: Vec<Vec<Vector6<f64>>>) -> Result<Self, SatVisError> {
        Self::from_positions(
            samples
                .into_iter()
                .map(|row| {
                    row.iter()
                        .map(|state| state.fixed_rows::<3>(0).into_owned())
                        .collect()
                })
                .collect(),
        )
    }

    pub fn n_times(&self) -> usize {
        self.n_times
    }

    pub fn n_agents(&self) -> usize {
        self.n_agents
    }

    /// Position of agent `i_agent` at time index `i_time`, `None` when out of range.
    pub fn position(&self, i_time: usize, i_agent: usize) -> Option<&Vector3<f64>> {
        if i_time >= self.n_times || i_agent >= self.n_agents {
            return None;
        }
        self.positions.get(i_time * self.n_agents + i_agent)
    }

    /// Positions of one agent over the whole time vector.
    pub fn track(&self, i_agent: usize) -> impl Iterator<Item = &Vector3<f64>> + '_ {
        self.positions
            .iter()
            .skip(i_agent)
            .step_by(self.n_agents.max(1))
            .take(if i_agent < self.n_agents { self.n_times } else { 0 })
    }
}
