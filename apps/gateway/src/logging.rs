//! Tracing subscriber setup.
//!
//! All output goes to stderr so `judge`/`batch` results on stdout stay
//! machine-readable. Verbosity follows `RUST_LOG` and defaults to `info`.

use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::LogFormat;
use crate::error::{GatewayError, Result};

const SERVICE_NAME: &str = "aurora-gateway";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing(format: LogFormat) -> Result<()> {
    let registry = Registry::default().with(env_filter());

    let installed = match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Bunyan => registry
            .with(JsonStorageLayer)
            .with(BunyanFormattingLayer::new(SERVICE_NAME.into(), std::io::stderr))
            .try_init(),
    };

    installed.map_err(|e| GatewayError::Config(format!("cannot install log subscriber: {}", e)))
}
