//! Input of an analysis run, as produced by the detection/tracking stage.

use serde::{Deserialize, Serialize};

use casa_core::trajectory::TrajectorySample;
use casa_core::types::TrackId;

/// One tracked object and its raw, not yet validated samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackInput {
    pub track_id: TrackId,
    #[serde(default)]
    pub trajectory: Vec<TrajectorySample>,
}

impl TrackInput {
    pub fn new(track_id: TrackId, trajectory: Vec<TrajectorySample>) -> Self {
        Self {
            track_id,
            trajectory,
        }
    }
}

/// All tracks of one recording plus optional calibration overrides.
///
/// Missing calibration values fall back to the pipeline's settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_to_distance_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
    pub tracks: Vec<TrackInput>,
}

impl AnalysisRequest {
    pub fn new(tracks: Vec<TrackInput>) -> Self {
        Self {
            tracks,
            ..Self::default()
        }
    }

    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = Some(frame_rate);
        self
    }

    pub fn with_pixel_to_distance_ratio(mut self, ratio: f64) -> Self {
        self.pixel_to_distance_ratio = Some(ratio);
        self
    }
}
