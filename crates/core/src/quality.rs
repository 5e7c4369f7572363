//! Per-track quality scores.
//!
//! The calculator asks a [`QualityModel`] for two scores in `[0, 1]` once the
//! velocity math is done. [`DefaultQualityModel`] implements the sample-count
//! heuristics used so far; a real model (residuals against a smoothed path,
//! detector confidence, ...) can replace it without touching `casa`.

/// Sample count above which tracking is considered reliable.
pub const RELIABLE_TRACK_SAMPLES: usize = 10;

pub const TRACKING_QUALITY_RELIABLE: f64 = 0.9;
pub const TRACKING_QUALITY_SHORT: f64 = 0.7;

pub const PATH_SMOOTHNESS_BASE: f64 = 0.8;
/// Each sample lowers smoothness by `1 / PATH_SMOOTHNESS_SAMPLE_SCALE`.
pub const PATH_SMOOTHNESS_SAMPLE_SCALE: f64 = 1000.0;
pub const PATH_SMOOTHNESS_MIN: f64 = 0.1;
pub const PATH_SMOOTHNESS_MAX: f64 = 1.0;

/// Scores a trajectory's quality. Implementations must be pure.
pub trait QualityModel: Send + Sync {
    /// Smoothness of the path, `0.0` (jagged) to `1.0` (smooth).
    fn path_smoothness(&self, sample_count: usize) -> f64;

    /// Confidence in the tracker's assignment, `0.0` to `1.0`.
    fn tracking_quality(&self, sample_count: usize) -> f64;
}

/// Sample-count heuristics.
///
/// - `path_smoothness = clamp(0.8 - n / 1000, 0.1, 1.0)`
/// - `tracking_quality = 0.9` when `n > 10`, else `0.7`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultQualityModel;

impl QualityModel for DefaultQualityModel {
    fn path_smoothness(&self, sample_count: usize) -> f64 {
        (PATH_SMOOTHNESS_BASE - sample_count as f64 / PATH_SMOOTHNESS_SAMPLE_SCALE)
            .clamp(PATH_SMOOTHNESS_MIN, PATH_SMOOTHNESS_MAX)
    }

    fn tracking_quality(&self, sample_count: usize) -> f64 {
        if sample_count > RELIABLE_TRACK_SAMPLES {
            TRACKING_QUALITY_RELIABLE
        } else {
            TRACKING_QUALITY_SHORT
        }
    }
}
