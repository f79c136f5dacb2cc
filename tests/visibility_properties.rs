use std::f64::consts::PI;

use nalgebra::Vector3;
use proptest::prelude::*;
use satvis::constants::EARTH_RADIUS_KM;
use satvis::diagnostics::Diagnostics;
use satvis::intervals::PairTag;
use satvis::vis_params::VisParams;
use satvis::visibility_func::{is_vis, visibility_func, VisibilitySample};
use satvis::zero_crossing_fit::zero_crossing_fit;

/// Position outside the Earth from spherical coordinates.
fn position() -> impl Strategy<Value = Vector3<f64>> {
    (6500.0..50_000.0f64, -PI..PI, -1.5..1.5f64).prop_map(|(r, lon, lat)| {
        Vector3::new(
            r * lat.cos() * lon.cos(),
            r * lat.cos() * lon.sin(),
            r * lat.sin(),
        )
    })
}

proptest! {
    #[test]
    fn prop_visibility_is_symmetric(r1 in position(), r2 in position()) {
        let forward = visibility_func(&r1, &r2, EARTH_RADIUS_KM, 0.0).unwrap();
        let backward = visibility_func(&r2, &r1, EARTH_RADIUS_KM, 0.0).unwrap();
        prop_assert!((forward.value - backward.value).abs() < 1e-15);
        prop_assert!((forward.phi - backward.phi).abs() < 1e-15);
    }

    #[test]
    fn prop_point_sees_itself(r in position()) {
        let sample = visibility_func(&r, &r, EARTH_RADIUS_KM, 0.0).unwrap();
        prop_assert!(sample.phi < 1e-7);
        prop_assert!(sample.value >= 0.0);
    }

    #[test]
    fn prop_without_occluder_only_phi_matters(r1 in position(), r2 in position()) {
        let sample = visibility_func(&r1, &r2, 0.0, 0.0).unwrap();
        prop_assert!((sample.value - (PI - sample.phi)).abs() < 1e-12);
    }

    #[test]
    fn prop_is_vis_matches_sign(r1 in position(), r2 in position()) {
        let sample = visibility_func(&r1, &r2, EARTH_RADIUS_KM, 0.0).unwrap();
        prop_assert_eq!(is_vis(&r1, &r2, EARTH_RADIUS_KM, 0.0).unwrap(), sample.value > 0.0);
    }

    #[test]
    fn prop_height_margin_shrinks_visibility(
        r1 in position(),
        r2 in position(),
        margin in 1.0..100.0f64,
    ) {
        let params = VisParams::builder()
            .height_margin(margin)
            .build()
            .unwrap();
        let mut diagnostics = Diagnostics::new();
        // both points must stay above the raised occluder
        prop_assume!(r1.norm() > params.occluder_radius() && r2.norm() > params.occluder_radius());

        let raised = VisibilitySample::compute(&r1, &r2, &params, &mut diagnostics).unwrap();
        let plain = visibility_func(&r1, &r2, EARTH_RADIUS_KM, 0.0).unwrap();
        prop_assert!(raised.value < plain.value);
        prop_assert!(diagnostics.is_empty());
    }

    #[test]
    fn prop_windows_are_ordered_and_disjoint(
        n in 5usize..80,
        freq in 0.05..1.5f64,
        phase in 0.0..6.28f64,
        offset in -0.8..0.8f64,
    ) {
        let times: Vec<f64> = (0..n).map(|i| 10.0 * i as f64).collect();
        let values: Vec<f64> = times
            .iter()
            .map(|t| (freq * t / 10.0 + phase).sin() + offset)
            .collect();

        let out = zero_crossing_fit(&values, &times, &PairTag::new(1, "A"), &VisParams::default())
            .unwrap();

        let windows = out.intervals.as_slice();
        prop_assert!(windows.iter().all(|iv| iv.begin < iv.end));
        prop_assert!(windows.iter().all(|iv| iv.begin >= times[0] && iv.end <= times[n - 1]));
        prop_assert!(windows.windows(2).all(|w| w[0].end <= w[1].begin));
        prop_assert!(out.crossings.windows(2).all(|c| c[0].time <= c[1].time));
    }
}
