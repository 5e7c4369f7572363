//! Run-level aggregates over per-track metrics.
//!
//! Mean kinematics for the run and quality indicators with a coarse
//! good / fair / poor rating.

use serde::{Deserialize, Serialize};

use crate::casa::CasaMetrics;

// ---------------------------------------------------------------------------
// Rating thresholds
// ---------------------------------------------------------------------------

/// Mean tracking quality above which a run is rated `Good`.
pub const TRACKING_QUALITY_GOOD: f64 = 0.8;
/// Mean tracking quality above which a run is rated `Fair`.
pub const TRACKING_QUALITY_FAIR: f64 = 0.6;
/// Mean path smoothness above which a run is rated `Good`.
pub const PATH_SMOOTHNESS_GOOD: f64 = 0.7;
/// Mean path smoothness above which a run is rated `Fair`.
pub const PATH_SMOOTHNESS_FAIR: f64 = 0.5;

// ---------------------------------------------------------------------------
// QualityLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    Good,
    Fair,
    Poor,
}

/// Rate a score against good/fair thresholds (both exclusive).
///
/// - `Good`: score > good
/// - `Fair`: score > fair
/// - `Poor`: otherwise
pub fn rate_score(score: f64, good: f64, fair: f64) -> QualityLevel {
    if score > good {
        QualityLevel::Good
    } else if score > fair {
        QualityLevel::Fair
    } else {
        QualityLevel::Poor
    }
}

/// Arithmetic mean, `None` for an empty input.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

// ---------------------------------------------------------------------------
// MetricsSummary
// ---------------------------------------------------------------------------

/// Mean CASA values over every analyzed track of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub track_count: usize,
    pub mean_curvilinear_velocity: f64,
    pub mean_straight_line_velocity: f64,
    pub mean_average_path_velocity: f64,
    pub mean_linearity: f64,
    pub mean_straightness: f64,
    pub mean_wobble: f64,
}

impl MetricsSummary {
    /// `None` when no track produced metrics.
    pub fn from_metrics(metrics: &[&CasaMetrics]) -> Option<Self> {
        if metrics.is_empty() {
            return None;
        }
        let field_mean = |f: fn(&CasaMetrics) -> f64| mean(metrics.iter().map(|m| f(m)));

        Some(Self {
            track_count: metrics.len(),
            mean_curvilinear_velocity: field_mean(|m| m.curvilinear_velocity)?,
            mean_straight_line_velocity: field_mean(|m| m.straight_line_velocity)?,
            mean_average_path_velocity: field_mean(|m| m.average_path_velocity)?,
            mean_linearity: field_mean(|m| m.linearity)?,
            mean_straightness: field_mean(|m| m.straightness)?,
            mean_wobble: field_mean(|m| m.wobble)?,
        })
    }
}

// ---------------------------------------------------------------------------
// QualityIndicators
// ---------------------------------------------------------------------------

/// Run-level quality: mean per-track scores with ratings, and the mean
/// number of samples per validated track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIndicators {
    pub mean_tracking_quality: f64,
    pub tracking_quality_level: QualityLevel,
    pub mean_path_smoothness: f64,
    pub path_smoothness_level: QualityLevel,
    pub mean_track_length: f64,
}

impl QualityIndicators {
    /// Scores come from `metrics`; `track_lengths` covers every validated
    /// track, including ones too short for metrics. `None` when `metrics`
    /// is empty.
    pub fn compute(metrics: &[&CasaMetrics], track_lengths: &[usize]) -> Option<Self> {
        let mean_tracking_quality = mean(metrics.iter().map(|m| m.tracking_quality))?;
        let mean_path_smoothness = mean(metrics.iter().map(|m| m.path_smoothness))?;
        let mean_track_length = mean(track_lengths.iter().map(|&n| n as f64)).unwrap_or(0.0);

        Some(Self {
            mean_tracking_quality,
            tracking_quality_level: rate_score(
                mean_tracking_quality,
                TRACKING_QUALITY_GOOD,
                TRACKING_QUALITY_FAIR,
            ),
            mean_path_smoothness,
            path_smoothness_level: rate_score(
                mean_path_smoothness,
                PATH_SMOOTHNESS_GOOD,
                PATH_SMOOTHNESS_FAIR,
            ),
            mean_track_length,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(vcl: f64, vsl: f64, lin: f64, tq: f64, ps: f64) -> CasaMetrics {
        CasaMetrics {
            curvilinear_velocity: vcl,
            straight_line_velocity: vsl,
            average_path_velocity: vcl,
            linearity: lin,
            straightness: 100.0,
            wobble: 100.0,
            total_distance: 0.0,
            net_distance: 0.0,
            path_smoothness: ps,
            tracking_quality: tq,
            pixel_to_distance_ratio: 0.5,
            frame_rate: 30.0,
        }
    }

    // -- rate_score -----------------------------------------------------------

    #[test]
    fn rate_score_boundaries_are_exclusive() {
        assert_eq!(rate_score(0.9, 0.8, 0.6), QualityLevel::Good);
        assert_eq!(rate_score(0.8, 0.8, 0.6), QualityLevel::Fair);
        assert_eq!(rate_score(0.6, 0.8, 0.6), QualityLevel::Poor);
    }

    // -- mean -----------------------------------------------------------------

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(std::iter::empty()), None);
        assert_eq!(mean([2.0, 4.0]), Some(3.0));
    }

    // -- MetricsSummary -------------------------------------------------------

    #[test]
    fn summary_averages_fields() {
        let a = metrics(10.0, 5.0, 50.0, 0.9, 0.7);
        let b = metrics(30.0, 15.0, 50.0, 0.7, 0.7);
        let summary = MetricsSummary::from_metrics(&[&a, &b]).unwrap();
        assert_eq!(summary.track_count, 2);
        assert_eq!(summary.mean_curvilinear_velocity, 20.0);
        assert_eq!(summary.mean_straight_line_velocity, 10.0);
        assert_eq!(summary.mean_linearity, 50.0);
    }

    #[test]
    fn summary_of_nothing_is_none() {
        assert!(MetricsSummary::from_metrics(&[]).is_none());
    }

    // -- QualityIndicators ----------------------------------------------------

    #[test]
    fn indicators_rate_mean_scores() {
        let a = metrics(10.0, 5.0, 50.0, 0.9, 0.75);
        let b = metrics(10.0, 5.0, 50.0, 0.9, 0.75);
        let q = QualityIndicators::compute(&[&a, &b], &[40, 60]).unwrap();
        assert_eq!(q.tracking_quality_level, QualityLevel::Good);
        assert_eq!(q.path_smoothness_level, QualityLevel::Good);
        assert_eq!(q.mean_track_length, 50.0);
    }

    #[test]
    fn indicators_mark_short_tracks_poor() {
        let a = metrics(10.0, 5.0, 50.0, 0.7, 0.797);
        let q = QualityIndicators::compute(&[&a], &[3]).unwrap();
        assert_eq!(q.tracking_quality_level, QualityLevel::Fair);
        let low = metrics(10.0, 5.0, 50.0, 0.5, 0.3);
        let q = QualityIndicators::compute(&[&low], &[3]).unwrap();
        assert_eq!(q.tracking_quality_level, QualityLevel::Poor);
        assert_eq!(q.path_smoothness_level, QualityLevel::Poor);
    }

    #[test]
    fn indicators_need_metrics() {
        assert!(QualityIndicators::compute(&[], &[2, 1]).is_none());
    }
}
