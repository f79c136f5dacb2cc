use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use satvis::crossing::find_crossing;
use satvis::intervals::PairTag;
use satvis::vis_params::VisParams;
use satvis::zero_crossing_fit::zero_crossing_fit;

/// Two-tone visibility-like series sampled every `step` seconds.
#[inline]
fn make_series(rng: &mut StdRng, n: usize, step: f64) -> (Vec<f64>, Vec<f64>) {
    let f1: f64 = rng.random_range(1e-3..5e-3);
    let f2: f64 = rng.random_range(5e-3..2e-2);
    let phase: f64 = rng.random_range(0.0..std::f64::consts::TAU);
    let offset: f64 = rng.random_range(-0.5..0.5);

    let times: Vec<f64> = (0..n).map(|i| step * i as f64).collect();
    let values = times
        .iter()
        .map(|t| (f1 * t + phase).sin() + 0.3 * (f2 * t).cos() + offset)
        .collect();
    (values, times)
}

/// Single 4-point cubic window, the inner loop of the extraction.
fn bench_cubic_window(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xDEADBEEF);
    let params = VisParams::default();
    let samples = 10_000usize;

    c.bench_function("find_crossing/cubic_window", |b| {
        b.iter_batched(
            || {
                (0..samples)
                    .map(|_| {
                        let root: f64 = rng.random_range(1.0..2.0);
                        let slope: f64 = rng.random_range(0.1..10.0);
                        let curv: f64 = rng.random_range(-0.5..0.5);
                        (0..4)
                            .map(|i| {
                                let dt = i as f64 - root;
                                slope * dt + curv * dt * dt
                            })
                            .collect::<Vec<f64>>()
                    })
                    .collect::<Vec<_>>()
            },
            |cases| {
                let times = [0.0, 1.0, 2.0, 3.0];
                for values in cases {
                    let roots = find_crossing(&times, black_box(&values), 3, &params).unwrap();
                    black_box(roots);
                }
            },
            BatchSize::LargeInput,
        )
    });
}

/// One day sampled every minute.
fn bench_day_series(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xBADF00D);
    let params = VisParams::default();
    let pair = PairTag::new(25544, "site");

    c.bench_function("zero_crossing_fit/1440_samples", |b| {
        b.iter_batched(
            || make_series(&mut rng, 1440, 60.0),
            |(values, times)| {
                let out = zero_crossing_fit(black_box(&values), &times, &pair, &params).unwrap();
                black_box(out);
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_cubic_window, bench_day_series);
criterion_main!(benches);
