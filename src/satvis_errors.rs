use thiserror::Error;

use crate::visibility_func::DomainViolation;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SatVisError {
    #[error("Domain violation: {0}")]
    DomainViolation(DomainViolation),

    #[error(
        "Visibility value is NaN after all clamps (alpha1={alpha1}, alpha2={alpha2}, phi={phi})"
    )]
    NumericInconsistency { alpha1: f64, alpha2: f64, phi: f64 },

    #[error("Visibility series too short: {0} samples, at least 2 required")]
    SeriesTooShort(usize),

    #[error("Length mismatch: {values} visibility values for {times} times")]
    LengthMismatch { values: usize, times: usize },

    #[error("Visibility sample {0} is not a finite number")]
    NonFiniteSample(usize),

    #[error("Time vector is not strictly increasing at index {0}")]
    NonIncreasingTime(usize),

    #[error("Cannot fit a polynomial of order {order} through {points} points")]
    InvalidFitOrder { order: usize, points: usize },

    #[error("Least-squares polynomial fit failed: {0}")]
    PolynomialFitFailed(String),

    #[error("Aberth–Ehrlich method failed to find acceptable complex roots")]
    PolynomialRootFindingFailed,

    #[error("Invalid state history: {0}")]
    InvalidStateHistory(String),

    #[error("Invalid visibility parameter: {0}")]
    InvalidVisParameter(String),

    #[error("Invalid interval [{begin}, {end}): begin must be strictly less than end")]
    InvalidInterval { begin: f64, end: f64 },

    #[error("Interval not found: {0}")]
    IntervalNotFound(usize),
}

impl From<DomainViolation> for SatVisError {
    fn from(err: DomainViolation) -> Self {
        SatVisError::DomainViolation(err)
    }
}
