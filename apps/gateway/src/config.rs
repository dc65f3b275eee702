//! Gateway settings, read from the environment (and a `.env` file when present).
//!
//! | Variable | Default |
//! |---|---|
//! | `AURORA_LAWS_PATH` | `laws.yaml` |
//! | `AURORA_PREVIEW_CHARS` | `100` |
//! | `AURORA_RELOAD_INTERVAL_SECS` | `0` (hot reload off) |
//! | `AURORA_LOG_FORMAT` | `pretty` |
//!
//! Log verbosity itself comes from `RUST_LOG`.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

use crate::error::{GatewayError, Result};
use crate::judge::DEFAULT_PREVIEW_CHARS;

pub const ENV_LAWS_PATH: &str = "AURORA_LAWS_PATH";
pub const ENV_PREVIEW_CHARS: &str = "AURORA_PREVIEW_CHARS";
pub const ENV_RELOAD_INTERVAL: &str = "AURORA_RELOAD_INTERVAL_SECS";
pub const ENV_LOG_FORMAT: &str = "AURORA_LOG_FORMAT";

const DEFAULT_LAWS_PATH: &str = "laws.yaml";

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
    /// Bunyan-compatible JSON records
    Bunyan,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
            LogFormat::Bunyan => "bunyan",
        })
    }
}

impl FromStr for LogFormat {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "bunyan" => Ok(LogFormat::Bunyan),
            other => Err(GatewayError::Config(format!("unknown log format '{}'", other))),
        }
    }
}

/// Everything the gateway needs at startup.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GatewayConfig {
    /// Law file; `.json` is read as JSON, anything else as YAML.
    pub laws_path: PathBuf,
    /// Number of prompt characters echoed back in a result.
    #[validate(range(min = 1, max = 10000))]
    pub preview_chars: usize,
    /// Seconds between law file checks; 0 disables hot reload.
    pub reload_interval_secs: u64,
    pub log_format: LogFormat,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            laws_path: PathBuf::from(DEFAULT_LAWS_PATH),
            preview_chars: DEFAULT_PREVIEW_CHARS,
            reload_interval_secs: 0,
            log_format: LogFormat::default(),
        }
    }
}

impl GatewayConfig {
    /// Read `.env` (if any), then the process environment.
    pub fn load() -> Result<Self> {
        // A missing .env file is the normal case
        dotenv::dotenv().ok();
        Self::from_env()
    }

    /// Build from the process environment only. Unset variables take their defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = read_var(ENV_LAWS_PATH) {
            config.laws_path = PathBuf::from(path);
        }
        if let Some(raw) = read_var(ENV_PREVIEW_CHARS) {
            config.preview_chars = parse_number(ENV_PREVIEW_CHARS, &raw)?;
        }
        if let Some(raw) = read_var(ENV_RELOAD_INTERVAL) {
            config.reload_interval_secs = parse_number(ENV_RELOAD_INTERVAL, &raw)?;
        }
        if let Some(raw) = read_var(ENV_LOG_FORMAT) {
            config.log_format = raw.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Hot reload period, if enabled.
    pub fn reload_interval(&self) -> Option<Duration> {
        (self.reload_interval_secs > 0).then(|| Duration::from_secs(self.reload_interval_secs))
    }
}

fn read_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_number<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| GatewayError::Config(format!("{} must be a non-negative integer, got '{}'", name, raw)))
}
