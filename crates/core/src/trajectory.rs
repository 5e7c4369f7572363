//! Trajectory ingestion and validation.
//!
//! Detection and tracking happen elsewhere; they hand over one ordered list
//! of [`TrajectorySample`]s per tracked object. [`validate`] checks that list
//! and wraps it in an immutable [`Trajectory`], which is the only form the
//! metrics calculator accepts.

use serde::{Deserialize, Serialize};

use crate::types::FrameIndex;

// ---------------------------------------------------------------------------
// Samples
// ---------------------------------------------------------------------------

/// One observation of a tracked object.
///
/// Coordinates are in pixels, `timestamp` in seconds since the start of
/// the recording.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    #[serde(alias = "frame")]
    pub frame_index: FrameIndex,
    pub x: f64,
    pub y: f64,
    pub timestamp: f64,
}

impl TrajectorySample {
    pub fn new(frame_index: FrameIndex, x: f64, y: f64, timestamp: f64) -> Self {
        Self {
            frame_index,
            x,
            y,
            timestamp,
        }
    }

    /// Euclidean distance to `other` in pixels.
    pub fn pixel_distance(&self, other: &TrajectorySample) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a raw sample list was rejected. Indices refer to the input order.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrajectoryError {
    #[error("trajectory contains no samples")]
    Empty,

    #[error("sample {index} has a non-finite coordinate ({x}, {y})")]
    NonFiniteCoordinate { index: usize, x: f64, y: f64 },

    #[error("sample {index} has an invalid timestamp {timestamp}: must be finite and >= 0")]
    InvalidTimestamp { index: usize, timestamp: f64 },

    #[error("sample {index} goes back in time: {timestamp} after {previous}")]
    NonMonotonicTimestamp {
        index: usize,
        previous: f64,
        timestamp: f64,
    },

    #[error("sample {index} goes back in frames: {frame_index} after {previous}")]
    NonMonotonicFrame {
        index: usize,
        previous: FrameIndex,
        frame_index: FrameIndex,
    },
}

// ---------------------------------------------------------------------------
// Trajectory
// ---------------------------------------------------------------------------

/// A validated, non-empty, time-ordered sample sequence for one object.
///
/// Constructed only through [`validate`]; there is no way to mutate the
/// samples afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Trajectory {
    samples: Vec<TrajectorySample>,
}

/// Frame and time bounds of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackSpan {
    pub start_frame: FrameIndex,
    pub end_frame: FrameIndex,
    pub start_time: f64,
    pub end_time: f64,
    /// Number of samples, not the frame distance between start and end.
    pub total_frames: usize,
}

impl Trajectory {
    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> &TrajectorySample {
        &self.samples[0]
    }

    pub fn last(&self) -> &TrajectorySample {
        &self.samples[self.samples.len() - 1]
    }

    /// Time between first and last sample, in seconds. Zero when all
    /// samples share one timestamp.
    pub fn duration(&self) -> f64 {
        self.last().timestamp - self.first().timestamp
    }

    pub fn span(&self) -> TrackSpan {
        let first = self.first();
        let last = self.last();
        TrackSpan {
            start_frame: first.frame_index,
            end_frame: last.frame_index,
            start_time: first.timestamp,
            end_time: last.timestamp,
            total_frames: self.samples.len(),
        }
    }

    /// Consecutive sample pairs, in order.
    pub fn segments(&self) -> impl Iterator<Item = (&TrajectorySample, &TrajectorySample)> {
        self.samples.windows(2).map(|w| (&w[0], &w[1]))
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate raw samples and take ownership of them as a [`Trajectory`].
///
/// Rejects, reporting the first offending sample:
/// - an empty list
/// - NaN or infinite `x` / `y`
/// - a negative or non-finite `timestamp`
/// - a timestamp lower than its predecessor's
/// - a frame index lower than its predecessor's
///
/// Equal consecutive timestamps and gaps in frame indices are accepted.
pub fn validate(samples: Vec<TrajectorySample>) -> Result<Trajectory, TrajectoryError> {
    if samples.is_empty() {
        return Err(TrajectoryError::Empty);
    }

    let mut previous: Option<&TrajectorySample> = None;
    for (index, sample) in samples.iter().enumerate() {
        if !sample.x.is_finite() || !sample.y.is_finite() {
            return Err(TrajectoryError::NonFiniteCoordinate {
                index,
                x: sample.x,
                y: sample.y,
            });
        }
        if !sample.timestamp.is_finite() || sample.timestamp < 0.0 {
            return Err(TrajectoryError::InvalidTimestamp {
                index,
                timestamp: sample.timestamp,
            });
        }
        if let Some(prev) = previous {
            if sample.timestamp < prev.timestamp {
                return Err(TrajectoryError::NonMonotonicTimestamp {
                    index,
                    previous: prev.timestamp,
                    timestamp: sample.timestamp,
                });
            }
            if sample.frame_index < prev.frame_index {
                return Err(TrajectoryError::NonMonotonicFrame {
                    index,
                    previous: prev.frame_index,
                    frame_index: sample.frame_index,
                });
            }
        }
        previous = Some(sample);
    }

    Ok(Trajectory { samples })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
