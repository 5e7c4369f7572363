//! Concurrent analysis of every track in a request.
//!
//! Each track is validated and measured on the blocking pool, with at most
//! `max_concurrent_tracks` in flight. A bad track becomes a `Rejected`
//! outcome; only request-level problems (calibration, duplicate ids, task
//! failures) abort the run.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use uuid::Uuid;

use casa_core::calibration::{AnalysisSettings, CalibrationContext};
use casa_core::casa::{CasaCalculator, CasaMetrics};
use casa_core::error::CoreError;
use casa_core::motility::{classify, MotilityDistribution, MotilityThresholds};
use casa_core::quality::{DefaultQualityModel, QualityModel};
use casa_core::summary::{MetricsSummary, QualityIndicators};
use casa_core::trajectory::validate;

use crate::error::PipelineError;
use crate::report::{AnalysisReport, OutcomeCounts, TrackOutcome, TrackReport};
use crate::request::{AnalysisRequest, TrackInput};

/// Result of one track before aggregation.
struct TrackAnalysis {
    report: TrackReport,
    metrics: Option<CasaMetrics>,
    /// Sample count of a validated trajectory; `None` when validation failed.
    sample_count: Option<usize>,
}

#[derive(Debug)]
pub struct AnalysisPipeline<Q: QualityModel = DefaultQualityModel> {
    settings: AnalysisSettings,
    thresholds: MotilityThresholds,
    calculator: Arc<CasaCalculator<Q>>,
}

impl AnalysisPipeline<DefaultQualityModel> {
    pub fn new(settings: AnalysisSettings) -> Result<Self, CoreError> {
        Self::with_calculator(settings, CasaCalculator::new())
    }
}

impl<Q: QualityModel + 'static> AnalysisPipeline<Q> {
    pub fn with_calculator(
        settings: AnalysisSettings,
        calculator: CasaCalculator<Q>,
    ) -> Result<Self, CoreError> {
        settings.check()?;
        Ok(Self {
            thresholds: MotilityThresholds::from(&settings),
            settings,
            calculator: Arc::new(calculator),
        })
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// Analyze every track of `request`.
    pub async fn run(&self, request: AnalysisRequest) -> Result<AnalysisReport, PipelineError> {
        let started_at = chrono::Utc::now();
        let clock = Instant::now();
        let run_id = Uuid::now_v7();

        let calibration = self
            .settings
            .calibration(request.pixel_to_distance_ratio, request.frame_rate)?;
        reject_duplicate_ids(&request.tracks)?;

        tracing::info!(
            %run_id,
            tracks = request.tracks.len(),
            pixel_to_distance_ratio = calibration.pixel_to_distance_ratio(),
            frame_rate = calibration.frame_rate(),
            "Starting CASA analysis run"
        );

        let semaphore = Arc::new(Semaphore::new(
            self.settings.max_concurrent_tracks.min(Semaphore::MAX_PERMITS),
        ));
        let mut handles = Vec::with_capacity(request.tracks.len());

        for track in request.tracks {
            let sem = Arc::clone(&semaphore);
            let calculator = Arc::clone(&self.calculator);
            let thresholds = self.thresholds;

            handles.push(tokio::spawn(async move {
                let _permit = sem
                    .acquire_owned()
                    .await
                    .map_err(|e| PipelineError::TaskFailed(e.to_string()))?;
                tokio::task::spawn_blocking(move || {
                    analyze_track(track, &calculator, &calibration, &thresholds)
                })
                .await
                .map_err(|e| PipelineError::TaskFailed(e.to_string()))
            }));
        }

        let mut analyses = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(result) => analyses.push(result?),
                Err(e) => {
                    tracing::error!(%run_id, error = %e, "Track task panicked or was cancelled");
                    return Err(PipelineError::TaskFailed(e.to_string()));
                }
            }
        }
        analyses.sort_by_key(|a| a.report.track_id);

        let measured: Vec<&CasaMetrics> =
            analyses.iter().filter_map(|a| a.metrics.as_ref()).collect();
        let lengths: Vec<usize> = analyses.iter().filter_map(|a| a.sample_count).collect();
        let summary = MetricsSummary::from_metrics(&measured);
        let quality = QualityIndicators::compute(&measured, &lengths);
        let motility = MotilityDistribution::from_classes(
            measured.iter().map(|m| classify(m, &self.thresholds)),
        );
        let motile_percent = motility.motile_percent();

        let tracks: Vec<TrackReport> = analyses.into_iter().map(|a| a.report).collect();
        let counts = OutcomeCounts::tally(&tracks);
        let processing_time_secs = clock.elapsed().as_secs_f64();

        tracing::info!(
            %run_id,
            total = counts.total,
            analyzed = counts.analyzed,
            insufficient_data = counts.insufficient_data,
            rejected = counts.rejected,
            processing_time_secs,
            "CASA analysis run complete"
        );

        Ok(AnalysisReport {
            run_id,
            started_at,
            completed_at: chrono::Utc::now(),
            processing_time_secs,
            calibration,
            vap_strategy: self.calculator.vap_strategy(),
            counts,
            summary,
            motility,
            motile_percent,
            quality,
            tracks,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn reject_duplicate_ids(tracks: &[TrackInput]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(tracks.len());
    for track in tracks {
        if !seen.insert(track.track_id) {
            return Err(CoreError::Validation(format!(
                "Duplicate track_id {} in request",
                track.track_id
            )));
        }
    }
    Ok(())
}

fn analyze_track<Q: QualityModel>(
    track: TrackInput,
    calculator: &CasaCalculator<Q>,
    calibration: &CalibrationContext,
    thresholds: &MotilityThresholds,
) -> TrackAnalysis {
    let track_id = track.track_id;

    let trajectory = match validate(track.trajectory) {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!(track_id, error = %e, "Rejected trajectory");
            return TrackAnalysis {
                report: TrackReport {
                    track_id,
                    span: None,
                    outcome: TrackOutcome::Rejected {
                        reason: e.to_string(),
                    },
                },
                metrics: None,
                sample_count: None,
            };
        }
    };

    let sample_count = trajectory.len();
    let span = Some(trajectory.span());

    let Some(metrics) = calculator.compute(&trajectory, calibration) else {
        tracing::debug!(track_id, sample_count, "Insufficient data for CASA metrics");
        return TrackAnalysis {
            report: TrackReport {
                track_id,
                span,
                outcome: TrackOutcome::InsufficientData { sample_count },
            },
            metrics: None,
            sample_count: Some(sample_count),
        };
    };

    // Finite values beyond the fixed-point range reject this track only.
    let record = match metrics.to_record() {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(track_id, sample_count, error = %e, "Metrics out of reportable range");
            return TrackAnalysis {
                report: TrackReport {
                    track_id,
                    span,
                    outcome: TrackOutcome::Rejected {
                        reason: e.to_string(),
                    },
                },
                metrics: None,
                sample_count: Some(sample_count),
            };
        }
    };

    let motility = classify(&metrics, thresholds);
    tracing::debug!(
        track_id,
        sample_count,
        vcl = metrics.curvilinear_velocity,
        vsl = metrics.straight_line_velocity,
        motility = motility.label(),
        "Analyzed track"
    );

    TrackAnalysis {
        report: TrackReport {
            track_id,
            span,
            outcome: TrackOutcome::Analyzed {
                metrics: record,
                motility,
            },
        },
        metrics: Some(metrics),
        sample_count: Some(sample_count),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
