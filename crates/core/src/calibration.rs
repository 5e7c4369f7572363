//! Calibration constants and per-run analysis settings.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::threshold_validation::{validate_non_negative_finite, validate_positive_finite};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default spatial calibration, in micrometers per pixel.
pub const DEFAULT_PIXEL_TO_DISTANCE_RATIO: f64 = 0.5;

/// Frame rate assumed when the recording does not report one.
pub const DEFAULT_FRAME_RATE: f64 = 30.0;

/// Default number of tracks analyzed at the same time.
pub const DEFAULT_MAX_CONCURRENT_TRACKS: usize = 8;

/// Straight-line velocity (µm/s) above which a motile track is progressive.
pub const DEFAULT_PROGRESSIVE_VSL_THRESHOLD: f64 = 25.0;

/// Curvilinear velocity (µm/s) above which a track counts as motile.
pub const DEFAULT_MOTILE_VCL_THRESHOLD: f64 = 5.0;

// ---------------------------------------------------------------------------
// CalibrationContext
// ---------------------------------------------------------------------------

/// Converts pixels to physical distance and frames to time for one run.
///
/// Only constructible through [`CalibrationContext::new`], so both values
/// are always finite and positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationContext {
    pixel_to_distance_ratio: f64,
    frame_rate: f64,
}

impl CalibrationContext {
    /// Both values must be finite and strictly positive.
    pub fn new(pixel_to_distance_ratio: f64, frame_rate: f64) -> Result<Self, CoreError> {
        validate_positive_finite(pixel_to_distance_ratio, "pixel_to_distance_ratio")?;
        validate_positive_finite(frame_rate, "frame_rate")?;
        Ok(Self {
            pixel_to_distance_ratio,
            frame_rate,
        })
    }

    pub fn pixel_to_distance_ratio(&self) -> f64 {
        self.pixel_to_distance_ratio
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Convert a pixel distance into physical units.
    pub fn to_distance(&self, pixels: f64) -> f64 {
        pixels * self.pixel_to_distance_ratio
    }
}

// ---------------------------------------------------------------------------
// AnalysisSettings
// ---------------------------------------------------------------------------

/// Defaults and thresholds applied to every analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AnalysisSettings {
    #[validate(range(exclusive_min = 0.0))]
    pub pixel_to_distance_ratio: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub default_frame_rate: f64,
    #[validate(range(min = 1))]
    pub max_concurrent_tracks: usize,
    #[validate(range(min = 0.0))]
    pub progressive_vsl_threshold: f64,
    #[validate(range(min = 0.0))]
    pub motile_vcl_threshold: f64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            pixel_to_distance_ratio: DEFAULT_PIXEL_TO_DISTANCE_RATIO,
            default_frame_rate: DEFAULT_FRAME_RATE,
            max_concurrent_tracks: DEFAULT_MAX_CONCURRENT_TRACKS,
            progressive_vsl_threshold: DEFAULT_PROGRESSIVE_VSL_THRESHOLD,
            motile_vcl_threshold: DEFAULT_MOTILE_VCL_THRESHOLD,
        }
    }
}

impl AnalysisSettings {
    /// Run the declarative range rules plus the finiteness checks the range
    /// rules cannot express (a NaN compares false against every bound).
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        validate_positive_finite(self.pixel_to_distance_ratio, "pixel_to_distance_ratio")?;
        validate_positive_finite(self.default_frame_rate, "default_frame_rate")?;
        validate_non_negative_finite(self.progressive_vsl_threshold, "progressive_vsl_threshold")?;
        validate_non_negative_finite(self.motile_vcl_threshold, "motile_vcl_threshold")?;
        Ok(())
    }

    /// Build the calibration for a run, preferring per-request values.
    pub fn calibration(
        &self,
        pixel_to_distance_ratio: Option<f64>,
        frame_rate: Option<f64>,
    ) -> Result<CalibrationContext, CoreError> {
        CalibrationContext::new(
            pixel_to_distance_ratio.unwrap_or(self.pixel_to_distance_ratio),
            frame_rate.unwrap_or(self.default_frame_rate),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
