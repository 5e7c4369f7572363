//! `casa-worker` -- batch CASA analysis of tracked trajectories.
//!
//! Reads one JSON `AnalysisRequest` from the file given as the first
//! argument (or stdin when absent), analyzes every track, and writes the
//! JSON `AnalysisReport` to stdout. Logs go to stderr.
//!
//! # Environment variables
//!
//! See [`config::WorkerConfig::from_env`]. `RUST_LOG` overrides the default
//! filter `casa_worker=info,casa_pipeline=info`.

mod config;

use std::io::{Read, Write};

use casa_pipeline::{AnalysisPipeline, AnalysisRequest};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{LogFormat, WorkerConfig};

const DEFAULT_LOG_FILTER: &str = "casa_worker=info,casa_pipeline=info";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Resolved before tracing so the log format can be chosen; a failure is
    // reported once the subscriber is up.
    let config = WorkerConfig::from_env();
    init_tracing(
        config
            .as_ref()
            .map(|c| c.log_format)
            .unwrap_or(LogFormat::Text),
    );

    let config = config.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid worker configuration");
        std::process::exit(1);
    });

    let input = std::env::args().nth(1);
    let body = read_input(input.as_deref()).unwrap_or_else(|e| {
        tracing::error!(input = input.as_deref().unwrap_or("-"), error = %e, "Failed to read request");
        std::process::exit(1);
    });

    let request: AnalysisRequest = serde_json::from_str(&body).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Request is not a valid analysis request");
        std::process::exit(1);
    });

    let pipeline = AnalysisPipeline::new(config.settings).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build analysis pipeline");
        std::process::exit(1);
    });

    let report = pipeline.run(request).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Analysis run failed");
        std::process::exit(1);
    });

    if let Err(e) = write_report(&report) {
        tracing::error!(run_id = %report.run_id, error = %e, "Failed to write report");
        std::process::exit(1);
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

/// Read the request body from `path`, or stdin for `None` and `"-"`.
fn read_input(path: Option<&str>) -> std::io::Result<String> {
    match path {
        Some(p) if p != "-" => std::fs::read_to_string(p),
        _ => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            Ok(body)
        }
    }
}

fn write_report(report: &casa_pipeline::AnalysisReport) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, report)?;
    writeln!(stdout)?;
    stdout.flush()
}
