//! Service config loader (strict parsing).

use std::fs;

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};
use crate::metrics::CounterReset;

/// Environment variable that overrides `metrics.api_key`.
pub const API_KEY_ENV: &str = "METRICS_API_KEY";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    pub metrics: MetricsConfig,
}

impl Config {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        self.metrics.validate()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Backend push endpoint.
    pub url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    #[serde(default)]
    pub counter_reset: CounterReset,

    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl MetricsConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ConfigError::Invalid("metrics.url must be an http(s) URL".into()));
        }
        if !(100..=3_600_000).contains(&self.period_ms) {
            return Err(ConfigError::Invalid(
                "metrics.period_ms must be between 100 and 3600000".into(),
            ));
        }
        if self.max_in_flight == 0 {
            return Err(ConfigError::Invalid("metrics.max_in_flight must be at least 1".into()));
        }
        if !(100..=120_000).contains(&self.request_timeout_ms) {
            return Err(ConfigError::Invalid(
                "metrics.request_timeout_ms must be between 100 and 120000".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:3000".into()
}
fn default_period_ms() -> u64 {
    1000
}
fn default_max_in_flight() -> usize {
    256
}
fn default_request_timeout_ms() -> u64 {
    10_000
}

pub fn load_from_file(path: &str) -> ConfigResult<Config> {
    let s = fs::read_to_string(path)?;
    let mut cfg = load_from_str(&s)?;
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        cfg.metrics.api_key = key;
    }
    Ok(cfg)
}

pub fn load_from_str(s: &str) -> ConfigResult<Config> {
    let cfg: Config = serde_yaml::from_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}
