//! Property checks for the CASA calculator over a family of trajectory shapes.
//!
//! Covers the bounds every valid trajectory must respect, determinism, and
//! independence of concurrent computations.

use casa_core::calibration::CalibrationContext;
use casa_core::casa::{compute, CasaCalculator, CasaMetrics, VapStrategy, MAX_PERCENT};
use casa_core::trajectory::{validate, Trajectory, TrajectorySample};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Deterministic trajectory shapes: spirals, zigzags, jittered walks,
/// stationary points, and paths with repeated timestamps.
fn shapes() -> Vec<Trajectory> {
    let mut out = Vec::new();

    for len in [3usize, 4, 7, 12, 50, 200] {
        // Spiral.
        out.push(build(len, |i| {
            let a = i as f64 * 0.4;
            (100.0 + a.cos() * a * 3.0, 100.0 + a.sin() * a * 3.0)
        }));

        // Zigzag.
        out.push(build(len, |i| {
            (i as f64 * 5.0, if i % 2 == 0 { 0.0 } else { 8.0 })
        }));

        // Jittered forward walk.
        out.push(build(len, |i| {
            let f = i as f64;
            (f * 3.0 + (f * 1.7).sin() * 2.0, (f * 2.3).cos() * 4.0)
        }));

        // Stationary.
        out.push(build(len, |_| (42.0, 42.0)));
    }

    // Repeated timestamps every other sample.
    let samples = (0..10)
        .map(|i| TrajectorySample::new(i, i as f64 * 2.0, 0.0, (i / 2) as f64 * 0.1))
        .collect();
    out.push(validate(samples).unwrap());

    out
}

fn build(len: usize, pos: impl Fn(usize) -> (f64, f64)) -> Trajectory {
    let samples = (0..len)
        .map(|i| {
            let (x, y) = pos(i);
            TrajectorySample::new(i as u64, x, y, i as f64 / 30.0)
        })
        .collect();
    validate(samples).unwrap()
}

fn calibration() -> CalibrationContext {
    CalibrationContext::new(0.5, 30.0).unwrap()
}

fn all_metrics() -> Vec<CasaMetrics> {
    let cal = calibration();
    shapes()
        .iter()
        .map(|t| compute(t, &cal).expect("every fixture has at least 3 samples"))
        .collect()
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

#[test]
fn ratios_stay_within_percentage_bounds() {
    for m in all_metrics() {
        for value in [m.linearity, m.straightness, m.wobble] {
            assert!(
                (0.0..=MAX_PERCENT).contains(&value),
                "ratio out of bounds: {m:?}"
            );
        }
    }
}

#[test]
fn velocities_are_non_negative() {
    for m in all_metrics() {
        assert!(m.curvilinear_velocity >= 0.0);
        assert!(m.straight_line_velocity >= 0.0);
        assert!(m.average_path_velocity >= 0.0);
    }
}

#[test]
fn path_length_is_never_shorter_than_displacement() {
    for m in all_metrics() {
        assert!(
            m.total_distance + 1e-9 >= m.net_distance,
            "total {} < net {}",
            m.total_distance,
            m.net_distance
        );
    }
}

#[test]
fn quality_scores_are_normalized() {
    for m in all_metrics() {
        assert!((0.0..=1.0).contains(&m.path_smoothness));
        assert!((0.0..=1.0).contains(&m.tracking_quality));
    }
}

#[test]
fn moving_average_strategy_respects_bounds() {
    let cal = calibration();
    let calc = CasaCalculator::new().with_vap_strategy(VapStrategy::MovingAverage { window: 5 });
    for t in shapes() {
        let m = calc.compute(&t, &cal).unwrap();
        assert!(m.average_path_velocity >= 0.0);
        assert!((0.0..=MAX_PERCENT).contains(&m.straightness));
        assert!((0.0..=MAX_PERCENT).contains(&m.wobble));
    }
}

#[test]
fn every_metric_converts_to_a_record() {
    for m in all_metrics() {
        assert!(m.to_record().is_ok());
    }
}

// ---------------------------------------------------------------------------
// Minimum data
// ---------------------------------------------------------------------------

#[test]
fn short_trajectories_never_yield_partial_records() {
    let cal = calibration();
    for len in 1..3 {
        let t = build(len, |i| (i as f64 * 10.0, 0.0));
        assert!(compute(&t, &cal).is_none());
    }
}

// ---------------------------------------------------------------------------
// Determinism and concurrency
// ---------------------------------------------------------------------------

#[test]
fn repeated_computation_is_bit_identical() {
    let cal = calibration();
    for t in shapes() {
        let a = compute(&t, &cal).unwrap();
        let b = compute(&t, &cal).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_record().unwrap(), b.to_record().unwrap());
    }
}

#[test]
fn concurrent_computation_matches_sequential() {
    let cal = calibration();
    let trajectories = shapes();
    let calculator = CasaCalculator::new();
    let expected: Vec<CasaMetrics> = trajectories
        .iter()
        .map(|t| calculator.compute(t, &cal).unwrap())
        .collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    trajectories
                        .iter()
                        .map(|t| calculator.compute(t, &cal).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            let results = handle.join().expect("worker thread panicked");
            assert_eq!(results, expected);
        }
    });
}
