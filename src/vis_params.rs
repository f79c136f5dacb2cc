//! # Visibility engine parameters
//!
//! This module defines [`VisParams`], the configuration shared by every stage of the
//! engine, and its validating builder [`VisParamsBuilder`].
//!
//! ## Purpose
//!
//! A single [`VisParams`] value controls:
//!
//! - the **occluding body**: radius and extra height margin above its surface,
//! - the **domain checks** of the visibility function: tolerance and the
//!   [`DomainPolicy`] applied to each kind of violation,
//! - the **crossing solver**: Aberth iterations and epsilon, and the tolerance used to
//!   accept a nearly-real complex root as real.
//!
//! ## Example
//!
//! ```rust
//! use satvis::vis_params::{DomainPolicy, VisParams};
//!
//! let params = VisParams::builder()
//!     .body_radius(6371.0)
//!     .height_margin(100.0)
//!     .magnitude_policy(DomainPolicy::ClampAndWarn)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(params.occluder_radius(), 6471.0);
//! ```
use crate::constants::{Kilometer, DOMAIN_EPS, EARTH_RADIUS_KM};
use crate::satvis_errors::SatVisError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering::{Equal, Greater};
use std::fmt;

/// What to do when an input falls outside the domain of the visibility function
/// by more than the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DomainPolicy {
    /// Return a [`SatVisError::DomainViolation`].
    #[default]
    FailFast,
    /// Clamp the offending quantity onto the domain boundary and record a diagnostic.
    ClampAndWarn,
}

impl fmt::Display for DomainPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainPolicy::FailFast => write!(f, "fail-fast"),
            DomainPolicy::ClampAndWarn => write!(f, "clamp-and-warn"),
        }
    }
}

/// Configuration of the visibility engine.
///
/// Fields
/// -----------------
/// **Occluding body**
/// * `body_radius` – radius of the spherical occluder, in the distance unit of the positions.
/// * `height_margin` – extra height above the surface that the line of sight must clear.
///
/// **Domain checks**
/// * `domain_eps` – relative tolerance of the magnitude and direction-cosine checks.
/// * `magnitude_policy` – applied when a point lies inside the occluder (`|r| < R'`).
/// * `ratio_policy` – applied when the direction cosine leaves `[-1, 1]`.
///
/// **Crossing solver**
/// * `aberth_max_iter` – maximum iterations of the Aberth–Ehrlich root finder.
/// * `aberth_eps` – convergence tolerance of the Aberth root finder.
/// * `root_imag_eps` – largest imaginary part of a root still accepted as real,
///   measured on the normalized `[-1, 1]` fit domain.
///
/// Defaults
/// -----------------
/// * `body_radius`: [`EARTH_RADIUS_KM`]
/// * `height_margin`: 0.0
/// * `domain_eps`: [`DOMAIN_EPS`]
/// * `magnitude_policy`, `ratio_policy`: [`DomainPolicy::FailFast`]
/// * `aberth_max_iter`: 100
/// * `aberth_eps`: 1.0e-12
/// * `root_imag_eps`: 1.0e-8
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisParams {
    // --- Occluding body ---
    pub body_radius: Kilometer,
    pub height_margin: Kilometer,

    // --- Domain checks ---
    pub domain_eps: f64,
    pub magnitude_policy: DomainPolicy,
    pub ratio_policy: DomainPolicy,

    // --- Crossing solver ---
    /// Maximum iterations for the Aberth–Ehrlich polynomial solver.
    pub aberth_max_iter: u32,
    /// Convergence tolerance for the Aberth root finder.
    pub aberth_eps: f64,
    /// Maximum imaginary part of a complex root promoted to real.
    pub root_imag_eps: f64,
}

impl VisParams {
    /// Construct a new [`VisParams`] with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default parameters with a custom occluder (`body_radius + height_margin`).
    ///
    /// No validation is performed; use [`VisParams::builder`] for checked construction.
    pub fn with_body(body_radius: Kilometer, height_margin: Kilometer) -> Self {
        VisParams {
            body_radius,
            height_margin,
            ..Self::default()
        }
    }

    /// Create a new [`VisParamsBuilder`] initialized with the default values.
    pub fn builder() -> VisParamsBuilder {
        VisParamsBuilder::new()
    }

    /// Effective occluder radius `R' = body_radius + height_margin`.
    #[inline]
    pub fn occluder_radius(&self) -> Kilometer {
        self.body_radius + self.height_margin
    }
}

impl Default for VisParams {
    fn default() -> Self {
        VisParams {
            body_radius: EARTH_RADIUS_KM,
            height_margin: 0.0,

            domain_eps: DOMAIN_EPS,
            magnitude_policy: DomainPolicy::FailFast,
            ratio_policy: DomainPolicy::FailFast,

            aberth_max_iter: 100,
            aberth_eps: 1.0e-12,
            root_imag_eps: 1.0e-8,
        }
    }
}

/// Builder for [`VisParams`], with validation.
#[derive(Debug, Clone)]
pub struct VisParamsBuilder {
    params: VisParams,
}

impl Default for VisParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VisParamsBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            params: VisParams::default(),
        }
    }

    // --- Occluding body ---
    pub fn body_radius(mut self, v: Kilometer) -> Self {
        self.params.body_radius = v;
        self
    }
    pub fn height_margin(mut self, v: Kilometer) -> Self {
        self.params.height_margin = v;
        self
    }

    // --- Domain checks ---
    pub fn domain_eps(mut self, v: f64) -> Self {
        self.params.domain_eps = v;
        self
    }
    pub fn magnitude_policy(mut self, v: DomainPolicy) -> Self {
        self.params.magnitude_policy = v;
        self
    }
    pub fn ratio_policy(mut self, v: DomainPolicy) -> Self {
        self.params.ratio_policy = v;
        self
    }
    /// Apply the same policy to both kinds of domain violation.
    pub fn domain_policy(mut self, v: DomainPolicy) -> Self {
        self.params.magnitude_policy = v;
        self.params.ratio_policy = v;
        self
    }

    // --- Crossing solver ---
    pub fn aberth_max_iter(mut self, v: u32) -> Self {
        self.params.aberth_max_iter = v;
        self
    }
    pub fn aberth_eps(mut self, v: f64) -> Self {
        self.params.aberth_eps = v;
        self
    }
    pub fn root_imag_eps(mut self, v: f64) -> Self {
        self.params.root_imag_eps = v;
        self
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    /// Finalize the builder and produce a [`VisParams`] instance.
    ///
    /// Validation rules
    /// -----------------
    /// * `body_radius >= 0.0`, finite.
    /// * `height_margin` finite and `body_radius + height_margin >= 0.0`.
    /// * `domain_eps >= 0.0`, `root_imag_eps >= 0.0`.
    /// * `aberth_eps > 0.0`, `aberth_max_iter >= 1`.
    ///
    /// A zero occluder radius is accepted: every pair of points is then mutually visible
    /// unless they are exactly opposite.
    pub fn build(self) -> Result<VisParams, SatVisError> {
        let p = &self.params;

        if !Self::ge0(p.body_radius) || !p.body_radius.is_finite() {
            return Err(SatVisError::InvalidVisParameter(
                "body_radius must be finite and non-negative".into(),
            ));
        }
        if !p.height_margin.is_finite() || !Self::ge0(p.occluder_radius()) {
            return Err(SatVisError::InvalidVisParameter(
                "body_radius + height_margin must be finite and non-negative".into(),
            ));
        }
        if !Self::ge0(p.domain_eps) {
            return Err(SatVisError::InvalidVisParameter(
                "domain_eps must be >= 0".into(),
            ));
        }
        if !Self::ge0(p.root_imag_eps) {
            return Err(SatVisError::InvalidVisParameter(
                "root_imag_eps must be >= 0".into(),
            ));
        }
        if !Self::gt0(p.aberth_eps) {
            return Err(SatVisError::InvalidVisParameter(
                "aberth_eps must be > 0".into(),
            ));
        }
        if p.aberth_max_iter == 0 {
            return Err(SatVisError::InvalidVisParameter(
                "aberth_max_iter must be >= 1".into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for VisParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            const PARAM_COL: usize = 40;
            writeln!(f, "Visibility Engine Parameters")?;
            writeln!(f, "----------------------------")?;

            macro_rules! line {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.len() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.len())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            writeln!(f, "[Occluding body]")?;
            line!(
                "body_radius      = {:.4}",
                self.body_radius,
                "Radius of the spherical occluder"
            )?;
            line!(
                "height_margin    = {:.4}",
                self.height_margin,
                "Extra clearance above the surface"
            )?;

            writeln!(f, "\n[Domain checks]")?;
            line!(
                "domain_eps       = {:.1e}",
                self.domain_eps,
                "Relative clamp tolerance"
            )?;
            line!(
                "magnitude_policy = {}",
                self.magnitude_policy,
                "Point inside the occluder"
            )?;
            line!(
                "ratio_policy     = {}",
                self.ratio_policy,
                "Direction cosine outside [-1, 1]"
            )?;

            writeln!(f, "\n[Crossing solver]")?;
            line!(
                "aberth_max_iter  = {}",
                self.aberth_max_iter,
                "Max iterations for Aberth solver"
            )?;
            line!(
                "aberth_eps       = {:.1e}",
                self.aberth_eps,
                "Convergence tolerance for Aberth solver"
            )?;
            line!(
                "root_imag_eps    = {:.1e}",
                self.root_imag_eps,
                "Max imaginary part for promoted roots"
            )?;

            Ok(())
        } else {
            write!(
                f,
                "VisParams(R={:.4}, h={:.4}, eps={:.1e}, magnitude={}, ratio={})",
                self.body_radius,
                self.height_margin,
                self.domain_eps,
                self.magnitude_policy,
                self.ratio_policy,
            )
        }
    }
}

#[cfg(test)]
mod vis_params_test {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = VisParams::default();
        assert_eq!(params.body_radius, EARTH_RADIUS_KM);
        assert_eq!(params.height_margin, 0.0);
        assert_eq!(params.domain_eps, 1e-13);
        assert_eq!(params.magnitude_policy, DomainPolicy::FailFast);
        assert_eq!(params.ratio_policy, DomainPolicy::FailFast);
        assert_eq!(params.occluder_radius(), EARTH_RADIUS_KM);
    }

    #[test]
    fn test_builder_overrides() {
        let params = VisParams::builder()
            .body_radius(1000.0)
            .height_margin(50.0)
            .domain_policy(DomainPolicy::ClampAndWarn)
            .aberth_max_iter(10)
            .build()
            .unwrap();

        assert_eq!(params.occluder_radius(), 1050.0);
        assert_eq!(params.magnitude_policy, DomainPolicy::ClampAndWarn);
        assert_eq!(params.ratio_policy, DomainPolicy::ClampAndWarn);
        assert_eq!(params.aberth_max_iter, 10);
    }

    #[test]
    fn test_builder_rejects_invalid_values() {
        assert!(matches!(
            VisParams::builder().body_radius(-1.0).build(),
            Err(SatVisError::InvalidVisParameter(_))
        ));
        assert!(matches!(
            VisParams::builder().body_radius(f64::NAN).build(),
            Err(SatVisError::InvalidVisParameter(_))
        ));
        assert!(matches!(
            VisParams::builder()
                .body_radius(10.0)
                .height_margin(-20.0)
                .build(),
            Err(SatVisError::InvalidVisParameter(_))
        ));
        assert!(matches!(
            VisParams::builder().aberth_eps(0.0).build(),
            Err(SatVisError::InvalidVisParameter(_))
        ));
        assert!(matches!(
            VisParams::builder().aberth_max_iter(0).build(),
            Err(SatVisError::InvalidVisParameter(_))
        ));
        assert!(matches!(
            VisParams::builder().domain_eps(-1e-3).build(),
            Err(SatVisError::InvalidVisParameter(_))
        ));
    }

    #[test]
    fn test_zero_radius_is_accepted() {
        let params = VisParams::builder().body_radius(0.0).build().unwrap();
        assert_eq!(params.occluder_radius(), 0.0);
    }

    #[test]
    fn test_display_alternate() {
        let text = format!("{:#}", VisParams::default());
        assert!(text.contains("[Occluding body]"));
        assert!(text.contains("magnitude_policy = fail-fast"));

        let short = format!("{}", VisParams::default());
        assert!(short.starts_with("VisParams(R=6378.1363"));
    }
}
