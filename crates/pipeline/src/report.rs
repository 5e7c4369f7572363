//! Output of an analysis run.

use serde::Serialize;
use uuid::Uuid;

use casa_core::calibration::CalibrationContext;
use casa_core::casa::{CasaRecord, VapStrategy};
use casa_core::motility::{MotilityClass, MotilityDistribution};
use casa_core::summary::{MetricsSummary, QualityIndicators};
use casa_core::trajectory::TrackSpan;
use casa_core::types::TrackId;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

// ---------------------------------------------------------------------------
// Per-track
// ---------------------------------------------------------------------------

/// What happened to one submitted track.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrackOutcome {
    /// Valid and long enough: metrics were computed.
    Analyzed {
        metrics: CasaRecord,
        motility: MotilityClass,
    },
    /// Valid but too short to characterize motion.
    InsufficientData { sample_count: usize },
    /// The samples failed validation, or the metrics fall outside the
    /// reportable fixed-point range.
    Rejected { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackReport {
    pub track_id: TrackId,
    /// `None` when the samples failed validation.
    pub span: Option<TrackSpan>,
    pub outcome: TrackOutcome,
}

impl TrackReport {
    pub fn metrics(&self) -> Option<&CasaRecord> {
        match &self.outcome {
            TrackOutcome::Analyzed { metrics, .. } => Some(metrics),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Number of tracks per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub total: usize,
    pub analyzed: usize,
    pub insufficient_data: usize,
    pub rejected: usize,
}

impl OutcomeCounts {
    pub fn tally<'a, I>(tracks: I) -> Self
    where
        I: IntoIterator<Item = &'a TrackReport>,
    {
        let mut counts = Self::default();
        for track in tracks {
            counts.total += 1;
            match track.outcome {
                TrackOutcome::Analyzed { .. } => counts.analyzed += 1,
                TrackOutcome::InsufficientData { .. } => counts.insufficient_data += 1,
                TrackOutcome::Rejected { .. } => counts.rejected += 1,
            }
        }
        counts
    }
}

/// Result of one analysis run. Tracks are sorted by id.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub started_at: Timestamp,
    pub completed_at: Timestamp,
    pub processing_time_secs: f64,
    pub calibration: CalibrationContext,
    pub vap_strategy: VapStrategy,
    pub counts: OutcomeCounts,
    pub summary: Option<MetricsSummary>,
    pub motility: MotilityDistribution,
    /// Progressive plus non-progressive share, in percent.
    pub motile_percent: f64,
    pub quality: Option<QualityIndicators>,
    pub tracks: Vec<TrackReport>,
}

impl AnalysisReport {
    pub fn track(&self, track_id: TrackId) -> Option<&TrackReport> {
        self.tracks.iter().find(|t| t.track_id == track_id)
    }
}
