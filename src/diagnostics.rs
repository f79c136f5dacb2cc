//! # Non-fatal diagnostics
//!
//! Conditions that do not stop a computation but that a caller may want to know about
//! are collected into a [`Diagnostics`] value returned next to the result, instead of
//! being printed. The caller decides whether to log them ([`Diagnostics::emit`]),
//! treat them as errors, or drop them.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::Epoch;
use crate::intervals::PairTag;
use crate::visibility_func::Endpoint;

/// A single non-fatal condition raised by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// A point lay inside the occluder beyond the tolerance and was moved onto its surface
    /// ([`DomainPolicy::ClampAndWarn`](crate::vis_params::DomainPolicy::ClampAndWarn)).
    BelowSurfaceClamped {
        endpoint: Endpoint,
        /// `R' / |r|` before clamping.
        ratio: f64,
    },
    /// The direction cosine between the two points left `[-1, 1]` beyond the tolerance
    /// and was clamped onto the nearest bound.
    DirectionCosineClamped { cosine: f64 },
    /// A horizon half-angle evaluated to NaN and was replaced by zero.
    AlphaNotANumber { endpoint: Endpoint },
    /// A crossing was classified neither rise nor set: the sample right after the sign
    /// change is exactly zero.
    AnomalousCrossing { time: Epoch, pair: PairTag },
    /// A sign change between two consecutive samples produced no crossing strictly
    /// inside the step.
    UnresolvedSignChange { index: usize, pair: PairTag },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::BelowSurfaceClamped { endpoint, ratio } => write!(
                f,
                "{endpoint} lies inside the occluder (R'/|r| = {ratio}), clamped onto the surface"
            ),
            Diagnostic::DirectionCosineClamped { cosine } => {
                write!(f, "direction cosine {cosine} outside [-1, 1], clamped")
            }
            Diagnostic::AlphaNotANumber { endpoint } => {
                write!(f, "horizon angle of {endpoint} was NaN, replaced by 0")
            }
            Diagnostic::AnomalousCrossing { time, pair } => {
                write!(f, "anomalous crossing at t={time} for {pair}")
            }
            Diagnostic::UnresolvedSignChange { index, pair } => write!(
                f,
                "no crossing found between samples {index} and {} for {pair}",
                index + 1
            ),
        }
    }
}

/// Ordered collection of [`Diagnostic`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    /// Move every diagnostic of `other` to the end of `self`.
    pub fn append(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    /// Number of [`Diagnostic::AnomalousCrossing`] entries.
    pub fn anomalous_crossings(&self) -> usize {
        self.0
            .iter()
            .filter(|d| matches!(d, Diagnostic::AnomalousCrossing { .. }))
            .count()
    }

    /// Forward every diagnostic to the `tracing` subscriber at `WARN` level.
    pub fn emit(&self) {
        for diagnostic in &self.0 {
            tracing::warn!(%diagnostic, "satvis diagnostic");
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Diagnostics(iter.into_iter().collect())
    }
}
