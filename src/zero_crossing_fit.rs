//! # Visibility windows from a sampled visibility function
//!
//! Turns a coarse, possibly irregular visibility series of one sensor-target pair into
//! precise rise/set times and closed visibility intervals.
//!
//! Based on Alfano, Negron & Moore, *"Rapid Determination of Satellite Visibility
//! Periods"*, Journal of the Astronautical Sciences 40(2), 1992.
//!
//! ## Algorithm
//!
//! 1. A series that is strictly positive everywhere yields one interval spanning the
//!    whole time vector; a strictly negative one yields nothing.
//! 2. Every step `k → k+1` where the sign of the samples changes holds a crossing. A
//!    cubic is fitted through the four samples `k-1 ..= k+2` around it and its real
//!    roots inside that span are kept. The first and last steps of the series have no
//!    4-point window and use a straight line through their two samples instead.
//! 3. A root falling into a step that has its own sign change belongs to that step and
//!    is dropped; roots inside steps without a sign change (a dip below zero between two
//!    samples) are kept. If no root lands inside the step itself, linear interpolation
//!    on the step is used.
//! 4. The root of the step takes the sign of the sample after the change (rise when
//!    positive, set when negative, anomaly when exactly zero); other roots from the
//!    same window alternate around it.
//! 5. A sample that is exactly zero pins the crossing on its own time: the step ending
//!    on it records an anomaly, the step leaving it records the rise or set. Leaving
//!    zero back to the side it was reached from is a touch and records nothing more.
//! 6. A small state machine turns the ordered crossings into intervals.
use serde::{Deserialize, Serialize};

use crate::constants::Epoch;
use crate::crossing::{find_crossing, Crossing, CrossingRoots, RiseSet};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::intervals::{Interval, IntervalCollection, PairTag};
use crate::satvis_errors::SatVisError;
use crate::vis_params::VisParams;

/// Output of [`zero_crossing_fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowExtraction {
    /// Crossings in non-decreasing time order.
    pub crossings: Vec<Crossing>,
    /// Visibility intervals, all tagged with the same pair.
    pub intervals: IntervalCollection,
    /// Anomalous crossings and unresolved sign changes.
    pub diagnostics: Diagnostics,
}

impl WindowExtraction {
    fn empty() -> Self {
        WindowExtraction {
            crossings: Vec::new(),
            intervals: IntervalCollection::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Times of the crossings.
    pub fn crossing_times(&self) -> Vec<Epoch> {
        self.crossings.iter().map(|c| c.time).collect()
    }

    /// `+1` / `-1` / `0` for each crossing (rise / set / anomaly).
    pub fn rise_set(&self) -> Vec<i8> {
        self.crossings.iter().map(|c| c.kind.sign()).collect()
    }
}

/// Visibility state between two crossings.
#[derive(Debug, Clone, Copy, PartialEq)]
enum WindowState {
    /// No crossing yet; the series started visible or not.
    AwaitingFirstCrossing { started_visible: bool },
    /// Visible since `since`.
    Open { since: Epoch },
    /// Not visible.
    Closed,
}

impl WindowState {
    /// Next state after `crossing`, with the interval it closes if any.
    fn on_crossing(self, crossing: &Crossing, t_start: Epoch) -> (Self, Option<(Epoch, Epoch)>) {
        use WindowState::*;
        match (self, crossing.kind) {
            (state, RiseSet::Anomaly) => (state, None),
            (
                AwaitingFirstCrossing {
                    started_visible: true,
                },
                RiseSet::Rise,
            ) => (Open { since: t_start }, None),
            (
                AwaitingFirstCrossing {
                    started_visible: false,
                }
                | Closed,
                RiseSet::Rise,
            ) => (
                Open {
                    since: crossing.time,
                },
                None,
            ),
            (AwaitingFirstCrossing { started_visible }, RiseSet::Set) => (
                Closed,
                started_visible.then_some((t_start, crossing.time)),
            ),
            (Open { since }, RiseSet::Set) => (Closed, Some((since, crossing.time))),
            (Open { since }, RiseSet::Rise) => (Open { since }, None),
            (Closed, RiseSet::Set) => (Closed, None),
        }
    }

    /// Interval still open when the series ends.
    fn on_end(self, t_start: Epoch, t_end: Epoch, ends_visible: bool) -> Option<(Epoch, Epoch)> {
        match self {
            WindowState::Open { since } if ends_visible => Some((since, t_end)),
            WindowState::AwaitingFirstCrossing {
                started_visible: true,
            } if ends_visible => Some((t_start, t_end)),
            _ => None,
        }
    }
}

#[inline]
fn sign(value: f64) -> i8 {
    RiseSet::from_value(value).sign()
}

fn validate_series(values: &[f64], times: &[Epoch]) -> Result<(), SatVisError> {
    if values.len() != times.len() {
        return Err(SatVisError::LengthMismatch {
            values: values.len(),
            times: times.len(),
        });
    }
    if values.len() < 2 {
        return Err(SatVisError::SeriesTooShort(values.len()));
    }
    if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
        return Err(SatVisError::NonFiniteSample(idx));
    }
    if let Some(idx) = times.windows(2).position(|w| !(w[0] < w[1])) {
        return Err(SatVisError::NonIncreasingTime(idx + 1));
    }
    Ok(())
}

/// Crossing extraction over one series, step by step.
struct StepScanner<'a> {
    values: &'a [f64],
    times: &'a [Epoch],
    params: &'a VisParams,
    /// Steps without a sign change already searched by an earlier window.
    searched: Vec<bool>,
    last_time: Epoch,
}

impl<'a> StepScanner<'a> {
    fn new(values: &'a [f64], times: &'a [Epoch], params: &'a VisParams) -> Self {
        StepScanner {
            values,
            times,
            params,
            searched: vec![false; values.len() - 1],
            last_time: f64::NEG_INFINITY,
        }
    }

    #[inline]
    fn has_sign_change(&self, step: usize) -> bool {
        sign(self.values[step]) != sign(self.values[step + 1])
    }

    /// Step `j` such that `times[j] < t <= times[j + 1]`, searched within `lo..hi`.
    fn step_of(&self, t: Epoch, lo: usize, hi: usize) -> usize {
        (lo..hi)
            .find(|&j| t <= self.times[j + 1])
            .unwrap_or(hi - 1)
    }

    /// True when `step` leaves a run of zero samples on the side it was entered from.
    /// A leading zero run counts as entered from the side it leaves to.
    fn is_touch(&self, step: usize) -> bool {
        if self.values[step] != 0.0 {
            return false;
        }
        self.values[..step]
            .iter()
            .rev()
            .find(|&&v| v != 0.0)
            .map_or(true, |&v| sign(v) == sign(self.values[step + 1]))
    }

    /// Crossing located on an exactly-zero sample bounding `step`.
    fn pinned_crossing(&self, step: usize) -> Option<Crossing> {
        if self.values[step + 1] == 0.0 {
            Some(Crossing {
                time: self.times[step + 1],
                kind: RiseSet::Anomaly,
            })
        } else if self.values[step] == 0.0 {
            Some(Crossing {
                time: self.times[step],
                kind: RiseSet::from_value(self.values[step + 1]),
            })
        } else {
            None
        }
    }

    fn fit(&self, lo: usize, hi: usize) -> Result<CrossingRoots, SatVisError> {
        find_crossing(
            &self.times[lo..=hi],
            &self.values[lo..=hi],
            hi - lo,
            self.params,
        )
    }

    /// Classified crossings of the sign change at `step`, in time order.
    fn crossings_at(&mut self, step: usize) -> Result<Vec<Crossing>, SatVisError> {
        if let Some(pinned) = self.pinned_crossing(step) {
            self.last_time = pinned.time;
            return Ok(vec![pinned]);
        }

        let n = self.values.len();
        let (lo, hi) = if step >= 1 && step + 2 < n {
            (step - 1, step + 2)
        } else {
            (step, step + 1)
        };

        let roots = self.fit(lo, hi)?;
        let mut accepted: Vec<(Epoch, usize)> = roots
            .into_iter()
            .filter(|&t| t > self.last_time)
            .map(|t| (t, self.step_of(t, lo, hi)))
            .filter(|&(_, j)| j == step || !(self.has_sign_change(j) || self.searched[j]))
            .collect();

        for j in lo..hi {
            if !self.has_sign_change(j) {
                self.searched[j] = true;
            }
        }

        if !accepted.iter().any(|&(_, j)| j == step) && hi - lo > 1 {
            accepted.extend(
                self.fit(step, step + 1)?
                    .into_iter()
                    .filter(|&t| t > self.last_time)
                    .map(|t| (t, step)),
            );
            accepted.sort_by(|a, b| a.0.total_cmp(&b.0));
        }

        let Some(anchor) = accepted.iter().rposition(|&(_, j)| j == step) else {
            return Ok(Vec::new());
        };
        let anchor_kind = RiseSet::from_value(self.values[step + 1]);

        let crossings: Vec<Crossing> = accepted
            .iter()
            .enumerate()
            .map(|(i, &(time, _))| Crossing {
                time,
                kind: if i.abs_diff(anchor) % 2 == 0 {
                    anchor_kind
                } else {
                    anchor_kind.opposite()
                },
            })
            .collect();

        if let Some(last) = crossings.last() {
            self.last_time = last.time;
        }
        Ok(crossings)
    }
}

/// Extract crossings and visibility intervals from one visibility series.
///
/// Arguments
/// -----------------
/// * `values`: visibility values of one sensor-target pair, `N >= 2` samples.
/// * `times`: sample times, strictly increasing, same length as `values`.
/// * `pair`: tag attached to every emitted interval and diagnostic.
/// * `params`: crossing solver tolerances.
///
/// Return
/// ----------
/// * A [`WindowExtraction`] with the ordered crossings, the intervals (non-overlapping,
///   `begin < end`) and the diagnostics raised on the way.
///
/// Errors
/// ----------
/// * [`SatVisError::LengthMismatch`], [`SatVisError::SeriesTooShort`],
///   [`SatVisError::NonFiniteSample`], [`SatVisError::NonIncreasingTime`] for malformed input.
/// * Solver failures from [`find_crossing`].
///
/// Note
/// ----------
/// A series starting on zero samples starts visible when its first nonzero sample is
/// positive. A series whose last sample is exactly zero ends visible. A sample that
/// touches zero without changing side records an anomaly and no rise or set.
pub fn zero_crossing_fit(
    values: &[f64],
    times: &[Epoch],
    pair: &PairTag,
    params: &VisParams,
) -> Result<WindowExtraction, SatVisError> {
    validate_series(values, times)?;

    let n = values.len();
    let (t_start, t_end) = (times[0], times[n - 1]);
    let mut extraction = WindowExtraction::empty();

    if values.iter().all(|&v| v > 0.0) {
        extraction
            .intervals
            .insert(Interval::new(t_start, t_end, pair.clone())?);
        return Ok(extraction);
    }
    if values.iter().all(|&v| v < 0.0) {
        return Ok(extraction);
    }

    let mut scanner = StepScanner::new(values, times, params);
    let mut state = WindowState::AwaitingFirstCrossing {
        started_visible: values.iter().find(|&&v| v != 0.0).map_or(true, |&v| v > 0.0),
    };

    for step in 0..n - 1 {
        // a touch only records the anomaly of the step ending on zero
        if !scanner.has_sign_change(step) || scanner.is_touch(step) {
            continue;
        }

        let crossings = scanner.crossings_at(step)?;
        if crossings.is_empty() {
            extraction
                .diagnostics
                .push(Diagnostic::UnresolvedSignChange {
                    index: step,
                    pair: pair.clone(),
                });
            continue;
        }

        for crossing in crossings {
            if crossing.kind == RiseSet::Anomaly {
                extraction.diagnostics.push(Diagnostic::AnomalousCrossing {
                    time: crossing.time,
                    pair: pair.clone(),
                });
            }

            let (next, closed) = state.on_crossing(&crossing, t_start);
            if let Some((begin, end)) = closed {
                extraction
                    .intervals
                    .insert(Interval::new(begin, end, pair.clone())?);
            }
            state = next;
            extraction.crossings.push(crossing);
        }
    }

    if let Some((begin, end)) = state.on_end(t_start, t_end, values[n - 1] >= 0.0) {
        extraction
            .intervals
            .insert(Interval::new(begin, end, pair.clone())?);
    }

    Ok(extraction)
}
