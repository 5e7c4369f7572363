//! Motility classification from CASA velocities (simplified WHO criteria).
//!
//! A track is **progressive** when it moves (VCL above the motility
//! threshold) and covers ground (VSL above the progressive threshold),
//! **non-progressive** when it moves without covering ground, and
//! **immotile** otherwise.

use serde::{Deserialize, Serialize};

use crate::calibration::{
    AnalysisSettings, DEFAULT_MOTILE_VCL_THRESHOLD, DEFAULT_PROGRESSIVE_VSL_THRESHOLD,
};
use crate::casa::CasaMetrics;

// ---------------------------------------------------------------------------
// MotilityClass
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotilityClass {
    Progressive,
    NonProgressive,
    Immotile,
}

impl MotilityClass {
    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Progressive => "Progressive",
            Self::NonProgressive => "Non-Progressive",
            Self::Immotile => "Immotile",
        }
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Velocity thresholds (physical units per second) used for classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotilityThresholds {
    pub progressive_vsl: f64,
    pub motile_vcl: f64,
}

impl Default for MotilityThresholds {
    fn default() -> Self {
        Self {
            progressive_vsl: DEFAULT_PROGRESSIVE_VSL_THRESHOLD,
            motile_vcl: DEFAULT_MOTILE_VCL_THRESHOLD,
        }
    }
}

impl From<&AnalysisSettings> for MotilityThresholds {
    fn from(settings: &AnalysisSettings) -> Self {
        Self {
            progressive_vsl: settings.progressive_vsl_threshold,
            motile_vcl: settings.motile_vcl_threshold,
        }
    }
}

/// Classify a track by its straight-line and curvilinear velocity.
///
/// Both comparisons are strict: a track exactly at a threshold falls into
/// the lower class.
pub fn classify(metrics: &CasaMetrics, thresholds: &MotilityThresholds) -> MotilityClass {
    let vsl = metrics.straight_line_velocity;
    let vcl = metrics.curvilinear_velocity;

    if vsl > thresholds.progressive_vsl && vcl > thresholds.motile_vcl {
        MotilityClass::Progressive
    } else if vcl > thresholds.motile_vcl {
        MotilityClass::NonProgressive
    } else {
        MotilityClass::Immotile
    }
}

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

/// Class counts over a run, with each class as a percentage of the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MotilityDistribution {
    pub progressive: usize,
    pub non_progressive: usize,
    pub immotile: usize,
    pub total: usize,
    pub progressive_percent: f64,
    pub non_progressive_percent: f64,
    pub immotile_percent: f64,
}

impl MotilityDistribution {
    /// Count classes. Percentages are `0.0` for an empty input.
    pub fn from_classes<I>(classes: I) -> Self
    where
        I: IntoIterator<Item = MotilityClass>,
    {
        let mut dist = Self::default();
        for class in classes {
            match class {
                MotilityClass::Progressive => dist.progressive += 1,
                MotilityClass::NonProgressive => dist.non_progressive += 1,
                MotilityClass::Immotile => dist.immotile += 1,
            }
        }
        dist.total = dist.progressive + dist.non_progressive + dist.immotile;

        if dist.total > 0 {
            let total = dist.total as f64;
            dist.progressive_percent = dist.progressive as f64 / total * 100.0;
            dist.non_progressive_percent = dist.non_progressive as f64 / total * 100.0;
            dist.immotile_percent = dist.immotile as f64 / total * 100.0;
        }
        dist
    }

    /// Motile share (progressive + non-progressive) as a percentage.
    pub fn motile_percent(&self) -> f64 {
        self.progressive_percent + self.non_progressive_percent
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(vcl: f64, vsl: f64) -> CasaMetrics {
        CasaMetrics {
            curvilinear_velocity: vcl,
            straight_line_velocity: vsl,
            average_path_velocity: vcl,
            linearity: 0.0,
            straightness: 0.0,
            wobble: 0.0,
            total_distance: 0.0,
            net_distance: 0.0,
            path_smoothness: 0.5,
            tracking_quality: 0.9,
            pixel_to_distance_ratio: 0.5,
            frame_rate: 30.0,
        }
    }

    // -- classify -------------------------------------------------------------

    #[test]
    fn fast_straight_track_is_progressive() {
        let t = MotilityThresholds::default();
        assert_eq!(classify(&metrics(60.0, 30.0), &t), MotilityClass::Progressive);
    }

    #[test]
    fn moving_in_place_is_non_progressive() {
        let t = MotilityThresholds::default();
        assert_eq!(
            classify(&metrics(40.0, 10.0), &t),
            MotilityClass::NonProgressive
        );
    }

    #[test]
    fn slow_track_is_immotile() {
        let t = MotilityThresholds::default();
        assert_eq!(classify(&metrics(3.0, 1.0), &t), MotilityClass::Immotile);
    }

    #[test]
    fn thresholds_are_strict() {
        let t = MotilityThresholds::default();
        assert_eq!(
            classify(&metrics(30.0, 25.0), &t),
            MotilityClass::NonProgressive
        );
        assert_eq!(classify(&metrics(5.0, 0.0), &t), MotilityClass::Immotile);
    }

    #[test]
    fn thresholds_follow_settings() {
        let settings = AnalysisSettings {
            progressive_vsl_threshold: 5.0,
            motile_vcl_threshold: 1.0,
            ..AnalysisSettings::default()
        };
        let t = MotilityThresholds::from(&settings);
        assert_eq!(classify(&metrics(8.0, 6.0), &t), MotilityClass::Progressive);
    }

    // -- distribution ---------------------------------------------------------

    #[test]
    fn distribution_counts_and_percentages() {
        let dist = MotilityDistribution::from_classes([
            MotilityClass::Progressive,
            MotilityClass::Progressive,
            MotilityClass::NonProgressive,
            MotilityClass::Immotile,
        ]);
        assert_eq!(dist.total, 4);
        assert_eq!(dist.progressive, 2);
        assert_eq!(dist.progressive_percent, 50.0);
        assert_eq!(dist.non_progressive_percent, 25.0);
        assert_eq!(dist.immotile_percent, 25.0);
        assert_eq!(dist.motile_percent(), 75.0);
    }

    #[test]
    fn empty_distribution_has_zero_percentages() {
        let dist = MotilityDistribution::from_classes(std::iter::empty());
        assert_eq!(dist.total, 0);
        assert_eq!(dist.progressive_percent, 0.0);
        assert_eq!(dist.motile_percent(), 0.0);
    }

    #[test]
    fn class_serializes_snake_case() {
        let json = serde_json::to_string(&MotilityClass::NonProgressive).unwrap();
        assert_eq!(json, "\"non_progressive\"");
    }
}
