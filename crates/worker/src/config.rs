use casa_core::calibration::{
    AnalysisSettings, DEFAULT_FRAME_RATE, DEFAULT_MAX_CONCURRENT_TRACKS,
    DEFAULT_MOTILE_VCL_THRESHOLD, DEFAULT_PIXEL_TO_DISTANCE_RATIO,
    DEFAULT_PROGRESSIVE_VSL_THRESHOLD,
};
use casa_core::error::CoreError;

/// Log output format for the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Validated analysis defaults passed to the pipeline.
    pub settings: AnalysisSettings,
    /// Log line format (default: `text`).
    pub log_format: LogFormat,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default |
    /// |-----------------------------|---------|
    /// | `PIXEL_TO_DISTANCE_RATIO`   | `0.5`   |
    /// | `DEFAULT_FRAME_RATE`        | `30`    |
    /// | `MAX_CONCURRENT_TRACKS`     | `8`     |
    /// | `PROGRESSIVE_VSL_THRESHOLD` | `25`    |
    /// | `MOTILE_VCL_THRESHOLD`      | `5`     |
    /// | `LOG_FORMAT`                | `text`  |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`WorkerConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings = AnalysisSettings {
            pixel_to_distance_ratio: parse_var(
                &lookup,
                "PIXEL_TO_DISTANCE_RATIO",
                DEFAULT_PIXEL_TO_DISTANCE_RATIO,
            )?,
            default_frame_rate: parse_var(&lookup, "DEFAULT_FRAME_RATE", DEFAULT_FRAME_RATE)?,
            max_concurrent_tracks: parse_var(
                &lookup,
                "MAX_CONCURRENT_TRACKS",
                DEFAULT_MAX_CONCURRENT_TRACKS,
            )?,
            progressive_vsl_threshold: parse_var(
                &lookup,
                "PROGRESSIVE_VSL_THRESHOLD",
                DEFAULT_PROGRESSIVE_VSL_THRESHOLD,
            )?,
            motile_vcl_threshold: parse_var(
                &lookup,
                "MOTILE_VCL_THRESHOLD",
                DEFAULT_MOTILE_VCL_THRESHOLD,
            )?,
        };
        settings.check()?;

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(CoreError::Validation(format!(
                    "LOG_FORMAT must be 'text' or 'json', got '{other}'"
                )))
            }
        };

        Ok(Self {
            settings,
            log_format,
        })
    }
}

/// Parse `key` if set and non-empty, else return `default`.
fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, CoreError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|_| {
            CoreError::Validation(format!("{key} must be a valid number, got '{raw}'"))
        }),
        _ => Ok(default),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
