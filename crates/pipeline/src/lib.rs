//! Runs CASA analysis over every track of a recording.

pub mod analysis;
pub mod error;
pub mod report;
pub mod request;

pub use analysis::AnalysisPipeline;
pub use error::PipelineError;
pub use report::{AnalysisReport, TrackOutcome, TrackReport};
pub use request::{AnalysisRequest, TrackInput};
