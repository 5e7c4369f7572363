//! CASA kinematic metrics for a single trajectory.
//!
//! [`CasaCalculator::compute`] turns a validated [`Trajectory`] plus the run's
//! [`CalibrationContext`] into a [`CasaMetrics`] record. The calculation is
//! total: trajectories with fewer than [`MIN_SAMPLES`] samples yield `None`,
//! and every degenerate numeric case (zero duration, zero denominators, no
//! positive time steps) produces `0.0` instead of an error.
//!
//! Velocities are in physical units per second (µm/s with the default
//! calibration); ratios are percentages in `[0, 100]`.

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationContext;
use crate::decimal::FixedDecimal;
use crate::error::CoreError;
use crate::quality::{DefaultQualityModel, QualityModel};
use crate::trajectory::Trajectory;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fewest samples a trajectory needs before any metric is computed.
pub const MIN_SAMPLES: usize = 3;

/// Upper bound for LIN, STR and WOB.
pub const MAX_PERCENT: f64 = 100.0;

// ---------------------------------------------------------------------------
// Metrics records
// ---------------------------------------------------------------------------

/// Kinematic metrics of one trajectory, as computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CasaMetrics {
    /// VCL: path length over duration.
    pub curvilinear_velocity: f64,
    /// VSL: net displacement over duration.
    pub straight_line_velocity: f64,
    /// VAP: smoothed instantaneous velocity, see [`VapStrategy`].
    pub average_path_velocity: f64,
    /// LIN = VSL / VCL × 100.
    pub linearity: f64,
    /// STR = VSL / VAP × 100.
    pub straightness: f64,
    /// WOB = VAP / VCL × 100.
    pub wobble: f64,
    pub total_distance: f64,
    pub net_distance: f64,
    pub path_smoothness: f64,
    pub tracking_quality: f64,
    pub pixel_to_distance_ratio: f64,
    pub frame_rate: f64,
}

/// [`CasaMetrics`] in fixed-point form, for storage and reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasaRecord {
    pub curvilinear_velocity: FixedDecimal,
    pub straight_line_velocity: FixedDecimal,
    pub average_path_velocity: FixedDecimal,
    pub linearity: FixedDecimal,
    pub straightness: FixedDecimal,
    pub wobble: FixedDecimal,
    pub total_distance: FixedDecimal,
    pub net_distance: FixedDecimal,
    pub path_smoothness: FixedDecimal,
    pub tracking_quality: FixedDecimal,
    pub pixel_to_distance_ratio: FixedDecimal,
    pub frame_rate: FixedDecimal,
}

impl CasaMetrics {
    /// Convert every field to [`FixedDecimal`].
    ///
    /// Fails only if a value is non-finite or too large to represent, which
    /// the calculator never produces for validated input.
    pub fn to_record(&self) -> Result<CasaRecord, CoreError> {
        let fixed = |name: &str, value: f64| {
            FixedDecimal::from_f64(value).ok_or_else(|| {
                CoreError::Internal(format!("{name} = {value} is not representable as a decimal"))
            })
        };

        Ok(CasaRecord {
            curvilinear_velocity: fixed("curvilinear_velocity", self.curvilinear_velocity)?,
            straight_line_velocity: fixed("straight_line_velocity", self.straight_line_velocity)?,
            average_path_velocity: fixed("average_path_velocity", self.average_path_velocity)?,
            linearity: fixed("linearity", self.linearity)?,
            straightness: fixed("straightness", self.straightness)?,
            wobble: fixed("wobble", self.wobble)?,
            total_distance: fixed("total_distance", self.total_distance)?,
            net_distance: fixed("net_distance", self.net_distance)?,
            path_smoothness: fixed("path_smoothness", self.path_smoothness)?,
            tracking_quality: fixed("tracking_quality", self.tracking_quality)?,
            pixel_to_distance_ratio: fixed("pixel_to_distance_ratio", self.pixel_to_distance_ratio)?,
            frame_rate: fixed("frame_rate", self.frame_rate)?,
        })
    }
}

// ---------------------------------------------------------------------------
// VAP strategy
// ---------------------------------------------------------------------------

/// How the average path velocity is derived from per-segment velocities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum VapStrategy {
    /// Mean of the first `floor(n / 2)` velocities (at least one).
    #[default]
    FirstHalf,
    /// Mean of every full sliding-window mean over the whole list.
    ///
    /// Lists shorter than `window` (or `window == 0`) fall back to
    /// [`VapStrategy::FirstHalf`].
    MovingAverage { window: usize },
}

impl VapStrategy {
    pub fn apply(self, velocities: &[f64]) -> f64 {
        match self {
            VapStrategy::FirstHalf => first_half_average(velocities),
            VapStrategy::MovingAverage { window } => moving_average(velocities, window),
        }
    }
}

/// Mean of the first half of `velocities`; `0.0` when empty.
///
/// The window is `floor(n / 2)` samples, but never fewer than one.
pub fn first_half_average(velocities: &[f64]) -> f64 {
    if velocities.is_empty() {
        return 0.0;
    }
    let count = (velocities.len() / 2).max(1);
    velocities[..count].iter().sum::<f64>() / count as f64
}

/// Mean of all sliding-window means of width `window`.
pub fn moving_average(velocities: &[f64], window: usize) -> f64 {
    if window == 0 || velocities.len() < window {
        return first_half_average(velocities);
    }
    let means: Vec<f64> = velocities
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect();
    means.iter().sum::<f64>() / means.len() as f64
}

// ---------------------------------------------------------------------------
// Numeric guards
// ---------------------------------------------------------------------------

/// `value`, or `0.0` when it is NaN or infinite.
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// `distance / duration`, or `0.0` when the duration is not positive or the
/// quotient overflows.
fn rate(distance: f64, duration: f64) -> f64 {
    if duration > 0.0 {
        finite_or_zero(distance / duration)
    } else {
        0.0
    }
}

/// `numerator / denominator × 100` clamped to `[0, 100]`; `0.0` when the
/// denominator is not positive or either side is not finite.
pub fn percent_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 && numerator.is_finite() && denominator.is_finite() {
        // An overflowing quotient is +inf and clamps to the upper bound.
        (numerator / denominator * 100.0).clamp(0.0, MAX_PERCENT)
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Computes [`CasaMetrics`] with a configurable quality model and VAP strategy.
///
/// Holds no mutable state; one instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct CasaCalculator<Q: QualityModel = DefaultQualityModel> {
    quality: Q,
    vap: VapStrategy,
}

impl CasaCalculator<DefaultQualityModel> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<Q: QualityModel> CasaCalculator<Q> {
    /// Replace the quality model, keeping the VAP strategy.
    pub fn with_quality_model<M: QualityModel>(self, quality: M) -> CasaCalculator<M> {
        CasaCalculator {
            quality,
            vap: self.vap,
        }
    }

    pub fn with_vap_strategy(mut self, vap: VapStrategy) -> Self {
        self.vap = vap;
        self
    }

    pub fn vap_strategy(&self) -> VapStrategy {
        self.vap
    }

    /// Compute metrics, or `None` when the trajectory has fewer than
    /// [`MIN_SAMPLES`] samples.
    pub fn compute(
        &self,
        trajectory: &Trajectory,
        calibration: &CalibrationContext,
    ) -> Option<CasaMetrics> {
        let sample_count = trajectory.len();
        if sample_count < MIN_SAMPLES {
            return None;
        }

        let mut total_distance = 0.0;
        let mut velocities = Vec::with_capacity(sample_count - 1);
        for (prev, next) in trajectory.segments() {
            let segment = calibration.to_distance(prev.pixel_distance(next));
            total_distance += segment;

            // Zero-length time steps still add distance, but no velocity sample.
            let time_diff = next.timestamp - prev.timestamp;
            if time_diff > 0.0 {
                velocities.push(segment / time_diff);
            }
        }

        // Coordinates near f64::MAX overflow to infinity; absorb into 0.
        let total_distance = finite_or_zero(total_distance);
        // Net displacement never exceeds path length, even after absorption.
        let net_distance = finite_or_zero(
            calibration.to_distance(trajectory.first().pixel_distance(trajectory.last())),
        )
        .min(total_distance);
        let duration = trajectory.duration();

        let vcl = rate(total_distance, duration);
        let vsl = rate(net_distance, duration);
        let vap = finite_or_zero(self.vap.apply(&velocities));

        Some(CasaMetrics {
            curvilinear_velocity: vcl,
            straight_line_velocity: vsl,
            average_path_velocity: vap,
            linearity: percent_ratio(vsl, vcl),
            straightness: percent_ratio(vsl, vap),
            wobble: percent_ratio(vap, vcl),
            total_distance,
            net_distance,
            path_smoothness: finite_or_zero(self.quality.path_smoothness(sample_count))
                .clamp(0.0, 1.0),
            tracking_quality: finite_or_zero(self.quality.tracking_quality(sample_count))
                .clamp(0.0, 1.0),
            pixel_to_distance_ratio: calibration.pixel_to_distance_ratio(),
            frame_rate: calibration.frame_rate(),
        })
    }
}

/// Compute metrics with the default quality model and first-half VAP.
pub fn compute(trajectory: &Trajectory, calibration: &CalibrationContext) -> Option<CasaMetrics> {
    CasaCalculator::new().compute(trajectory, calibration)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
