#![allow(dead_code)]

use approx::assert_relative_eq;
use nalgebra::Vector3;
use satvis::intervals::IntervalCollection;
use satvis::vis_history::StateHistory;

/// Mean Earth radius used by the scenarios, km.
pub const RE: f64 = 6371.0;

/// Sidereal rotation rate of the Earth, rad/s.
pub const EARTH_ROTATION_RATE: f64 = 7.292_115e-5;

/// `n` evenly spaced times from `start` to `stop` included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    let step = (stop - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Equatorial circular orbit of radius `radius` km and period `period` s.
pub fn circular_orbit(radius: f64, period: f64, phase: f64, times: &[f64]) -> Vec<Vector3<f64>> {
    let rate = std::f64::consts::TAU / period;
    times
        .iter()
        .map(|t| {
            let angle = phase + rate * t;
            Vector3::new(radius * angle.cos(), radius * angle.sin(), 0.0)
        })
        .collect()
}

/// Equatorial ground site at longitude `longitude` rad, rotating with the Earth.
pub fn ground_site(longitude: f64, altitude: f64, times: &[f64]) -> Vec<Vector3<f64>> {
    circular_orbit(
        RE + altitude,
        std::f64::consts::TAU / EARTH_ROTATION_RATE,
        longitude,
        times,
    )
}

/// Transpose per-agent tracks `[agent][time]` into a [`StateHistory`].
pub fn state_history(tracks: &[Vec<Vector3<f64>>]) -> StateHistory {
    let n_times = tracks.first().map_or(0, Vec::len);
    StateHistory::from_positions(
        (0..n_times)
            .map(|i_time| tracks.iter().map(|track| track[i_time]).collect())
            .collect(),
    )
    .expect("tracks must share the same time vector")
}

pub fn assert_windows_close(actual: &IntervalCollection, expected: &[(f64, f64)], epsilon: f64) {
    assert_eq!(actual.len(), expected.len(), "window count: {actual}");
    for (window, &(begin, end)) in actual.iter().zip(expected) {
        assert_relative_eq!(window.begin, begin, epsilon = epsilon);
        assert_relative_eq!(window.end, end, epsilon = epsilon);
    }
}
