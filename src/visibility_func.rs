//! # Line-of-sight visibility function
//!
//! Signed visibility indicator between two points near a spherical occluder, after
//! Lawton (1987), *"Numerical Method for Rapidly Determining Satellite-Satellite and
//! Satellite-Ground Station In-View Periods"*.
//!
//! With `R' = R + h` (body radius plus height margin):
//!
//! ```text
//! alpha_i = acos(R' / |r_i|)                 horizon half-angle seen from point i
//! phi     = acos(r1 · r2 / (|r1| |r2|))      angle between the two position vectors
//! v       = alpha1 + alpha2 - phi
//! ```
//!
//! `v >= 0` exactly when the segment between the two points does not cross the sphere.
//! Distances may be expressed in any unit as long as positions, radius and margin agree.
use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::Radian;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::satvis_errors::SatVisError;
use crate::vis_params::{DomainPolicy, VisParams};

/// Which of the two input positions a condition refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endpoint {
    First,
    Second,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::First => write!(f, "r1"),
            Endpoint::Second => write!(f, "r2"),
        }
    }
}

/// Input geometry outside the domain of the visibility function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DomainViolation {
    /// Position vector of zero length.
    ZeroMagnitude { endpoint: Endpoint },
    /// Point inside the occluder: `R' / |r| > 1 + eps`.
    PointInsideBody { endpoint: Endpoint, ratio: f64 },
    /// Direction cosine `r1 · r2 / (|r1| |r2|)` outside `[-1 - eps, 1 + eps]`.
    DirectionCosineOutOfRange { cosine: f64 },
}

impl fmt::Display for DomainViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainViolation::ZeroMagnitude { endpoint } => {
                write!(f, "{endpoint} has zero magnitude")
            }
            DomainViolation::PointInsideBody { endpoint, ratio } => {
                write!(f, "{endpoint} lies inside the occluder (R'/|r| = {ratio})")
            }
            DomainViolation::DirectionCosineOutOfRange { cosine } => {
                write!(f, "dot(r1, r2)/(|r1| |r2|) = {cosine} outside [-1, 1]")
            }
        }
    }
}

/// Output of the visibility function for one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilitySample {
    /// Visibility value `alpha1 + alpha2 - phi`; non-negative when in line of sight.
    pub value: f64,
    /// Angle between the two position vectors.
    pub phi: Radian,
    /// Horizon half-angle seen from the first point.
    pub alpha1: Radian,
    /// Horizon half-angle seen from the second point.
    pub alpha2: Radian,
}

impl VisibilitySample {
    /// Evaluate the visibility function between `r1` and `r2`.
    ///
    /// Arguments
    /// -----------------
    /// * `r1`, `r2`: position vectors of the two points, same frame and unit as the body radius.
    /// * `params`: occluder geometry, tolerance and domain policies.
    /// * `diagnostics`: sink receiving every clamp and NaN substitution applied.
    ///
    /// Return
    /// ----------
    /// * `Ok(VisibilitySample)` on success.
    /// * `Err(SatVisError::DomainViolation)` for a zero-length vector, or for a point inside
    ///   the occluder / an out-of-range direction cosine under [`DomainPolicy::FailFast`].
    /// * `Err(SatVisError::NumericInconsistency)` if the value is still NaN after all clamps.
    ///
    /// Note
    /// ----------
    /// Magnitudes less than `domain_eps` (relative) below `R'`, and direction cosines
    /// less than `domain_eps` outside `[-1, 1]`, are always clamped silently.
    pub fn compute(
        r1: &Vector3<f64>,
        r2: &Vector3<f64>,
        params: &VisParams,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, SatVisError> {
        let eps = params.domain_eps;
        let r_prime = params.occluder_radius();

        let r1_mag = surface_clamped_norm(r1, Endpoint::First, params, diagnostics)?;
        let r2_mag = surface_clamped_norm(r2, Endpoint::Second, params, diagnostics)?;

        let alpha1 = horizon_angle(r_prime, r1_mag, Endpoint::First, diagnostics);
        let alpha2 = horizon_angle(r_prime, r2_mag, Endpoint::Second, diagnostics);

        // direction cosine drifts past ±1 for nearly parallel or opposite vectors
        let mut cosine = r1.dot(r2) / (r1.norm() * r2.norm());
        if cosine > 1.0 + eps || cosine < -1.0 - eps {
            match params.ratio_policy {
                DomainPolicy::FailFast => {
                    return Err(DomainViolation::DirectionCosineOutOfRange { cosine }.into())
                }
                DomainPolicy::ClampAndWarn => {
                    diagnostics.push(Diagnostic::DirectionCosineClamped { cosine });
                }
            }
        }
        cosine = cosine.clamp(-1.0, 1.0);

        let phi = cosine.acos();
        let value = alpha1 + alpha2 - phi;

        if value.is_nan() {
            return Err(SatVisError::NumericInconsistency {
                alpha1,
                alpha2,
                phi,
            });
        }

        Ok(VisibilitySample {
            value,
            phi,
            alpha1,
            alpha2,
        })
    }

    /// True when the two points are in line of sight (`value > 0`).
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.value > 0.0
    }
}

/// Norm of `r`, moved onto the occluder surface when it lies below it.
fn surface_clamped_norm(
    r: &Vector3<f64>,
    endpoint: Endpoint,
    params: &VisParams,
    diagnostics: &mut Diagnostics,
) -> Result<f64, SatVisError> {
    let r_prime = params.occluder_radius();
    let r_mag = r.norm();

    if r_mag == 0.0 {
        return Err(DomainViolation::ZeroMagnitude { endpoint }.into());
    }

    let ratio = r_prime / r_mag;
    // a NaN magnitude is left for `horizon_angle` to report
    if ratio <= 1.0 || ratio.is_nan() {
        return Ok(r_mag);
    }

    if ratio > 1.0 + params.domain_eps {
        match params.magnitude_policy {
            DomainPolicy::FailFast => {
                return Err(DomainViolation::PointInsideBody { endpoint, ratio }.into())
            }
            DomainPolicy::ClampAndWarn => {
                diagnostics.push(Diagnostic::BelowSurfaceClamped { endpoint, ratio });
            }
        }
    }

    Ok(r_prime)
}

/// `acos(R' / |r|)`, with NaN replaced by zero.
///
/// Finite inputs never reach the substitution once the magnitude has been clamped onto
/// the surface. A NaN position or a NaN occluder radius (possible through the
/// unvalidated [`VisParams::with_body`]) does.
fn horizon_angle(
    r_prime: f64,
    r_mag: f64,
    endpoint: Endpoint,
    diagnostics: &mut Diagnostics,
) -> Radian {
    let alpha = (r_prime / r_mag).acos();
    if alpha.is_nan() {
        diagnostics.push(Diagnostic::AlphaNotANumber { endpoint });
        return 0.0;
    }
    alpha
}

/// Visibility function with a custom occluder and otherwise default parameters.
///
/// Clamps and NaN substitutions are not reported; use [`VisibilitySample::compute`]
/// with a [`Diagnostics`] sink to observe them.
///
/// Arguments
/// -----------------
/// * `r1`, `r2`: position vectors of the two points.
/// * `body_radius`: radius of the spherical occluder.
/// * `height_margin`: extra height above the surface the line of sight must clear.
pub fn visibility_func(
    r1: &Vector3<f64>,
    r2: &Vector3<f64>,
    body_radius: f64,
    height_margin: f64,
) -> Result<VisibilitySample, SatVisError> {
    let params = VisParams::with_body(body_radius, height_margin);
    VisibilitySample::compute(r1, r2, &params, &mut Diagnostics::new())
}

/// Boolean line of sight between `r1` and `r2`.
pub fn is_vis(
    r1: &Vector3<f64>,
    r2: &Vector3<f64>,
    body_radius: f64,
    height_margin: f64,
) -> Result<bool, SatVisError> {
    Ok(visibility_func(r1, r2, body_radius, height_margin)?.is_visible())
}
