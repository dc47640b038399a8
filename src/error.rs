//! Error types for the metrics pipeline and its configuration.

use thiserror::Error;

/// Why a single export did not land. Logged by the exporter and dropped;
/// never propagated into the scheduler or the request path.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend rejected metric with {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Config loading / validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config failed: {0}")]
    Read(#[from] std::io::Error),
    #[error("invalid yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
