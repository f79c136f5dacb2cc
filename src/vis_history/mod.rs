//! # Visibility history of sensor-target pairs
//!
//! Evaluates the visibility function of every (sensor, target) pair over a common time
//! vector, extracts the visibility windows of each pair and gathers them in a single
//! [`IntervalCollection`].
//!
//! The work is a map over pairs followed by a reduction into one collection. With the
//! `parallel` feature the map runs on the rayon thread pool; the reduction always walks
//! the pairs in sensor-major order, so the output does not depend on the feature.
//!
//! ## Example
//!
//! ```rust,no_run
//! use nalgebra::Vector3;
//! use satvis::constants::AgentId;
//! use satvis::vis_history::{vis_history, StateHistory};
//! use satvis::vis_params::VisParams;
//!
//! let targets: Vec<AgentId> = vec![1.into()];
//! let sensors: Vec<AgentId> = vec!["A".into()];
//! let times = [0.0, 60.0, 120.0];
//!
//! let target_states = StateHistory::from_positions(vec![
//!     vec![Vector3::new(7000.0, 0.0, 0.0)],
//!     vec![Vector3::new(6990.0, 300.0, 0.0)],
//!     vec![Vector3::new(6970.0, 600.0, 0.0)],
//! ])?;
//! let sensor_states = StateHistory::from_positions(vec![vec![Vector3::new(6400.0, 0.0, 0.0)]; 3])?;
//!
//! let history = vis_history(
//!     &targets,
//!     &sensors,
//!     &target_states,
//!     &sensor_states,
//!     &times,
//!     &VisParams::default(),
//! )?;
//! history.diagnostics.emit();
//! # Ok::<(), satvis::satvis_errors::SatVisError>(())
//! ```
pub mod state_history;
pub mod vis_tensor;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::constants::{AgentId, Epoch};
use crate::diagnostics::Diagnostics;
use crate::intervals::{IntervalCollection, PairTag};
use crate::satvis_errors::SatVisError;
use crate::visibility_func::VisibilitySample;
use crate::vis_params::VisParams;
use crate::zero_crossing_fit::zero_crossing_fit;

pub use state_history::StateHistory;
pub use vis_tensor::VisibilityTensor;

/// Aggregated visibility of all sensor-target pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityHistory {
    /// Visibility windows of every pair, tagged with their pair.
    pub intervals: IntervalCollection,
    /// Visibility values, `[sensor × target × time]`.
    pub tensor: VisibilityTensor,
    /// Non-fatal diagnostics of every pair, in pair order.
    pub diagnostics: Diagnostics,
}

/// Result of the map step for one pair.
struct PairOutcome {
    series: Vec<f64>,
    intervals: IntervalCollection,
    diagnostics: Diagnostics,
}

/// Visibility series and windows of one sensor-target pair.
fn evaluate_pair(
    i_sensor: usize,
    i_target: usize,
    pair: &PairTag,
    target_states: &StateHistory,
    sensor_states: &StateHistory,
    times: &[Epoch],
    params: &VisParams,
) -> Result<PairOutcome, SatVisError> {
    let mut diagnostics = Diagnostics::new();

    let series = (0..times.len())
        .map(|i_time| {
            match (
                sensor_states.position(i_time, i_sensor),
                target_states.position(i_time, i_target),
            ) {
                (Some(r1), Some(r2)) => {
                    Ok(VisibilitySample::compute(r1, r2, params, &mut diagnostics)?.value)
                }
                _ => Err(SatVisError::InvalidStateHistory(format!(
                    "no state for pair {pair} at time index {i_time}"
                ))),
            }
        })
        .collect::<Result<Vec<f64>, SatVisError>>()?;

    let extraction = zero_crossing_fit(&series, times, pair, params)?;
    diagnostics.append(extraction.diagnostics);

    debug!(
        %pair,
        windows = extraction.intervals.len(),
        crossings = extraction.crossings.len(),
        "pair visibility evaluated"
    );

    Ok(PairOutcome {
        series,
        intervals: extraction.intervals,
        diagnostics,
    })
}

fn check_history(
    label: &str,
    history: &StateHistory,
    n_agents: usize,
    n_times: usize,
) -> Result<(), SatVisError> {
    if history.n_agents() != n_agents {
        return Err(SatVisError::InvalidStateHistory(format!(
            "{label} history holds {} agents for {n_agents} identifiers",
            history.n_agents()
        )));
    }
    if history.n_times() != n_times {
        return Err(SatVisError::InvalidStateHistory(format!(
            "{label} history holds {} epochs for {n_times} times",
            history.n_times()
        )));
    }
    Ok(())
}

/// Visibility windows and values of every sensor-target pair.
///
/// Arguments
/// -----------------
/// * `targets`: identifiers of the `N` targets.
/// * `sensors`: identifiers of the `M` sensors.
/// * `target_states`: `[T][N]` target positions (km).
/// * `sensor_states`: `[T][M]` sensor positions (km).
/// * `times`: the `T` sample times, strictly increasing.
/// * `params`: occluding body and solver tolerances.
///
/// Return
/// ----------
/// * A [`VisibilityHistory`] holding the union of all pair windows, the
///   `[M × N × T]` visibility tensor and the diagnostics of all pairs.
///
/// Errors
/// ----------
/// * [`SatVisError::InvalidStateHistory`] if a history does not match the identifier
///   list or the time vector.
/// * Any error raised for a single sample or a single pair aborts the whole run; the
///   error of the first failing pair in sensor-major order is returned.
pub fn vis_history(
    targets: &[AgentId],
    sensors: &[AgentId],
    target_states: &StateHistory,
    sensor_states: &StateHistory,
    times: &[Epoch],
    params: &VisParams,
) -> Result<VisibilityHistory, SatVisError> {
    check_history("target", target_states, targets.len(), times.len())?;
    check_history("sensor", sensor_states, sensors.len(), times.len())?;

    let pairs: Vec<(usize, usize, PairTag)> = sensors
        .iter()
        .enumerate()
        .flat_map(|(i_sensor, sensor_id)| {
            targets.iter().enumerate().map(move |(i_target, target_id)| {
                (
                    i_sensor,
                    i_target,
                    PairTag::new(target_id.clone(), sensor_id.clone()),
                )
            })
        })
        .collect();

    debug!(
        sensors = sensors.len(),
        targets = targets.len(),
        epochs = times.len(),
        "computing visibility history"
    );

    let evaluate = |(i_sensor, i_target, pair): &(usize, usize, PairTag)| {
        evaluate_pair(
            *i_sensor,
            *i_target,
            pair,
            target_states,
            sensor_states,
            times,
            params,
        )
    };

    #[cfg(feature = "parallel")]
    let outcomes: Vec<Result<PairOutcome, SatVisError>> = pairs.par_iter().map(evaluate).collect();
    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<Result<PairOutcome, SatVisError>> = pairs.iter().map(evaluate).collect();

    let mut intervals = IntervalCollection::new();
    let mut diagnostics = Diagnostics::new();
    let mut series = Vec::with_capacity(pairs.len());

    for outcome in outcomes {
        let outcome = outcome?;
        intervals.merge(outcome.intervals);
        diagnostics.append(outcome.diagnostics);
        series.push(outcome.series);
    }

    debug!(
        windows = intervals.len(),
        diagnostics = diagnostics.len(),
        "visibility history complete"
    );

    Ok(VisibilityHistory {
        intervals,
        tensor: VisibilityTensor::from_pair_series(
            sensors.len(),
            targets.len(),
            times.len(),
            series,
        ),
        diagnostics,
    })
}
