//! # Zero crossings of a sampled visibility function
//!
//! A crossing is located by fitting a low-order polynomial through a handful of
//! samples around a sign change and keeping the real roots that fall inside the
//! sampled span. Four samples with a cubic are used in the general case, two samples
//! with a straight line at the edges of a series.
//!
//! The abscissae are first mapped from the fit domain `[t_first, t_last]` onto the
//! window `[-1, 1]`, so the Vandermonde system stays well conditioned whatever the
//! time unit.
//!
//! Roots of the quadratic and cubic fits are obtained with the Aberth–Ehrlich method.
use aberth::aberth;
use aberth::StopReason;
use itertools::Itertools;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::Epoch;
use crate::satvis_errors::SatVisError;
use crate::vis_params::VisParams;

/// Real roots of one crossing window; three at most for a cubic.
pub type CrossingRoots = SmallVec<[Epoch; 3]>;

/// Relative size under which a leading coefficient is treated as zero.
const DEGENERATE_COEFF_EPS: f64 = 1e-14;

/// Singular-value cutoff of the least-squares solve.
const SVD_EPS: f64 = 1e-15;

/// Direction of a visibility crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiseSet {
    /// Not visible → visible.
    Rise,
    /// Visible → not visible.
    Set,
    /// Sample after the sign change is exactly zero; should not happen with real data.
    Anomaly,
}

impl RiseSet {
    /// Classify from the visibility value sampled right after the sign change.
    pub fn from_value(value: f64) -> Self {
        if value > 0.0 {
            RiseSet::Rise
        } else if value < 0.0 {
            RiseSet::Set
        } else {
            RiseSet::Anomaly
        }
    }

    /// `+1` for a rise, `-1` for a set, `0` for an anomaly.
    pub fn sign(self) -> i8 {
        match self {
            RiseSet::Rise => 1,
            RiseSet::Set => -1,
            RiseSet::Anomaly => 0,
        }
    }

    /// The crossing expected right before or after this one.
    pub fn opposite(self) -> Self {
        match self {
            RiseSet::Rise => RiseSet::Set,
            RiseSet::Set => RiseSet::Rise,
            RiseSet::Anomaly => RiseSet::Anomaly,
        }
    }
}

/// A time at which the visibility function crosses zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crossing {
    pub time: Epoch,
    pub kind: RiseSet,
}

/// Least-squares polynomial expressed on the normalized window `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedPolynomial {
    /// Coefficients in increasing degree, in the normalized variable.
    pub coefficients: Vec<f64>,
    /// Fit domain `(t_first, t_last)`.
    pub domain: (Epoch, Epoch),
}

impl FittedPolynomial {
    /// Fit a polynomial of degree `order` through `(times[i], values[i])`.
    ///
    /// With `order + 1` points the fit interpolates exactly; with more points it is the
    /// least-squares solution.
    ///
    /// Errors
    /// -----------------
    /// * [`SatVisError::LengthMismatch`] if `times` and `values` differ in length.
    /// * [`SatVisError::InvalidFitOrder`] if `order == 0` or fewer than `order + 1` points.
    /// * [`SatVisError::NonIncreasingTime`] if `times` is not strictly increasing.
    /// * [`SatVisError::PolynomialFitFailed`] if the SVD solve fails.
    pub fn fit(times: &[Epoch], values: &[f64], order: usize) -> Result<Self, SatVisError> {
        if times.len() != values.len() {
            return Err(SatVisError::LengthMismatch {
                values: values.len(),
                times: times.len(),
            });
        }
        if order == 0 || times.len() < order + 1 {
            return Err(SatVisError::InvalidFitOrder {
                order,
                points: times.len(),
            });
        }
        if let Some(idx) = times.windows(2).position(|w| w[0] >= w[1]) {
            return Err(SatVisError::NonIncreasingTime(idx + 1));
        }

        let domain = (times[0], times[times.len() - 1]);
        let (off, scl) = window_map(domain);

        let vandermonde = DMatrix::from_fn(times.len(), order + 1, |i, j| {
            (off + scl * times[i]).powi(j as i32)
        });
        let rhs = DVector::from_column_slice(values);

        let coefficients = vandermonde
            .svd(true, true)
            .solve(&rhs, SVD_EPS)
            .map_err(|e| SatVisError::PolynomialFitFailed(e.to_string()))?;

        Ok(FittedPolynomial {
            coefficients: coefficients.iter().copied().collect(),
            domain,
        })
    }

    /// Evaluate the polynomial at time `t` (Horner scheme).
    pub fn eval(&self, t: Epoch) -> f64 {
        let (off, scl) = window_map(self.domain);
        let x = off + scl * t;
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * x + c)
    }

    /// Real roots lying strictly inside the fit domain, in increasing order.
    ///
    /// A complex root is accepted as real when its imaginary part, measured on the
    /// normalized window, is below `params.root_imag_eps`.
    pub fn roots_in_domain(&self, params: &VisParams) -> Result<CrossingRoots, SatVisError> {
        let scale = self
            .coefficients
            .iter()
            .fold(0.0_f64, |acc, c| acc.max(c.abs()));
        if scale == 0.0 {
            return Ok(CrossingRoots::new());
        }

        // drop vanishing leading terms so the solver sees the true degree
        let degree = self
            .coefficients
            .iter()
            .rposition(|c| c.abs() > DEGENERATE_COEFF_EPS * scale)
            .unwrap_or(0);
        let lead = self.coefficients[degree];
        let monic: Vec<f64> = self.coefficients[..=degree]
            .iter()
            .map(|c| c / lead)
            .collect();

        let window_roots: SmallVec<[(f64, f64); 3]> = match degree {
            0 => SmallVec::new(),
            1 => smallvec::smallvec![(-monic[0], 0.0)],
            2 => solve_monic(
                &[monic[0], monic[1], 1.0],
                params.aberth_max_iter,
                params.aberth_eps,
            )?,
            3 => solve_monic(
                &[monic[0], monic[1], monic[2], 1.0],
                params.aberth_max_iter,
                params.aberth_eps,
            )?,
            _ => {
                return Err(SatVisError::InvalidFitOrder {
                    order: degree,
                    points: degree + 1,
                })
            }
        };

        let (off, scl) = window_map(self.domain);
        let (t_first, t_last) = self.domain;
        let span = t_last - t_first;

        Ok(window_roots
            .into_iter()
            .filter(|&(_, im)| im.abs() <= params.root_imag_eps)
            .map(|(re, _)| (re - off) / scl)
            .filter(|&t| t > t_first && t < t_last)
            .sorted_by(|a, b| a.total_cmp(b))
            .dedup_by(|a, b| (a - b).abs() <= f64::EPSILON * span)
            .collect())
    }
}

/// Affine map `x = off + scl * t` sending `domain` onto `[-1, 1]`.
#[inline]
fn window_map((t_first, t_last): (Epoch, Epoch)) -> (f64, f64) {
    let scl = 2.0 / (t_last - t_first);
    let off = -(t_first + t_last) / (t_last - t_first);
    (off, scl)
}

/// Complex roots `(re, im)` of a monic polynomial given in increasing degree.
fn solve_monic<const TERMS: usize>(
    polynom: &[f64; TERMS],
    max_iterations: u32,
    aberth_epsilon: f64,
) -> Result<SmallVec<[(f64, f64); 3]>, SatVisError> {
    let roots = aberth(polynom, max_iterations, aberth_epsilon);
    match roots.stop_reason {
        StopReason::Converged(_) | StopReason::MaxIteration(_) => Ok(roots
            .iter()
            .map(|complex| (complex.re, complex.im))
            .collect()),
        StopReason::Failed(_) => Err(SatVisError::PolynomialRootFindingFailed),
    }
}

/// Zero-crossing times of the polynomial of degree `order` fitted through the samples.
///
/// Arguments
/// -----------------
/// * `times`: sample times, strictly increasing (4 for the cubic window, 2 for the edge case).
/// * `values`: visibility values at `times`.
/// * `order`: polynomial order (3 in the general case, 1 at the edges of a series).
/// * `params`: solver tolerances.
///
/// Return
/// ----------
/// * Zero, one or several roots strictly inside `(times[0], times[last])`, sorted.
///   Roots outside the sampled span are curvature artifacts of the fit and are dropped.
pub fn find_crossing(
    times: &[Epoch],
    values: &[f64],
    order: usize,
    params: &VisParams,
) -> Result<CrossingRoots, SatVisError> {
    FittedPolynomial::fit(times, values, order)?.roots_in_domain(params)
}

#[cfg(test)]
mod crossing_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rise_set_classification() {
        assert_eq!(RiseSet::from_value(0.3), RiseSet::Rise);
        assert_eq!(RiseSet::from_value(-1e-300), RiseSet::Set);
        assert_eq!(RiseSet::from_value(0.0), RiseSet::Anomaly);
        assert_eq!(RiseSet::Rise.sign(), 1);
        assert_eq!(RiseSet::Set.sign(), -1);
        assert_eq!(RiseSet::Anomaly.sign(), 0);
        assert_eq!(RiseSet::Rise.opposite(), RiseSet::Set);
        assert_eq!(RiseSet::Anomaly.opposite(), RiseSet::Anomaly);
    }

    #[test]
    fn test_fit_interpolates_cubic() {
        let times = [10.0, 11.0, 12.5, 14.0];
        let cubic = |t: f64| (t - 11.2) * (t - 30.0) * (t + 4.0);
        let values: Vec<f64> = times.iter().map(|&t| cubic(t)).collect();

        let poly = FittedPolynomial::fit(&times, &values, 3).unwrap();
        for (&t, &v) in times.iter().zip(&values) {
            assert_relative_eq!(poly.eval(t), v, max_relative = 1e-10);
        }
        assert_relative_eq!(poly.eval(13.0), cubic(13.0), max_relative = 1e-10);
    }

    #[test]
    fn test_linear_crossing() {
        let roots = find_crossing(&[0.0, 1.0], &[-1.0, 3.0], 1, &VisParams::default()).unwrap();
        assert_eq!(roots.len(), 1);
        assert_relative_eq!(roots[0], 0.25, epsilon = 1e-14);
    }

    #[test]
    fn test_monotonic_window_has_single_root() {
        let times = [0.0, 1.0, 2.0, 3.0];
        let values = [-2.0, -1.0, 1.0, 2.0];

        let roots = find_crossing(&times, &values, 3, &VisParams::default()).unwrap();
        assert_eq!(roots.len(), 1);
        assert_relative_eq!(roots[0], 1.5, epsilon = 1e-10);
        assert!(roots[0] > times[0] && roots[0] < times[3]);
    }

    #[test]
    fn test_roots_outside_domain_are_dropped() {
        // (t - 0.5)(t - 5)(t + 2): only 0.5 lies inside [0, 3]
        let times = [0.0, 1.0, 2.0, 3.0];
        let values: Vec<f64> = times
            .iter()
            .map(|&t| (t - 0.5) * (t - 5.0) * (t + 2.0))
            .collect();

        let roots = find_crossing(&times, &values, 3, &VisParams::default()).unwrap();
        assert_eq!(roots.len(), 1);
        assert_relative_eq!(roots[0], 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_triple_root_window() {
        let times = [0.0, 1.0, 2.0, 3.0];
        let values: Vec<f64> = times
            .iter()
            .map(|&t| (t - 0.5) * (t - 1.5) * (t - 2.5))
            .collect();

        let roots = find_crossing(&times, &values, 3, &VisParams::default()).unwrap();
        assert_eq!(roots.len(), 3);
        for (root, expected) in roots.iter().zip([0.5, 1.5, 2.5]) {
            assert_relative_eq!(*root, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_complex_roots_are_discarded() {
        // t^2 + 1 never crosses zero
        let times = [-1.0, 0.0, 1.0, 2.0];
        let values: Vec<f64> = times.iter().map(|&t| t * t + 1.0).collect();

        let roots = find_crossing(&times, &values, 3, &VisParams::default()).unwrap();
        assert!(roots.is_empty());
    }

    #[test]
    fn test_degenerate_cubic_falls_back_to_line() {
        let times = [0.0, 1.0, 2.0, 3.0];
        let values = [-1.5, -0.5, 0.5, 1.5];

        let roots = find_crossing(&times, &values, 3, &VisParams::default()).unwrap();
        assert_eq!(roots.len(), 1);
        assert_relative_eq!(roots[0], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_zero_has_no_roots() {
        let roots = find_crossing(&[0.0, 1.0], &[0.0, 0.0], 1, &VisParams::default()).unwrap();
        assert!(roots.is_empty());
    }

    #[test]
    fn test_invalid_inputs() {
        let params = VisParams::default();
        assert_eq!(
            find_crossing(&[0.0, 1.0], &[1.0], 1, &params),
            Err(SatVisError::LengthMismatch {
                values: 1,
                times: 2
            })
        );
        assert_eq!(
            find_crossing(&[0.0, 1.0, 2.0], &[1.0, -1.0, -2.0], 3, &params),
            Err(SatVisError::InvalidFitOrder {
                order: 3,
                points: 3
            })
        );
        assert_eq!(
            find_crossing(&[0.0, 1.0, 1.0, 2.0], &[1.0, -1.0, -2.0, -3.0], 3, &params),
            Err(SatVisError::NonIncreasingTime(2))
        );
    }
}
