use std::io;
use thiserror::Error;

/// Gateway-wide error type, consolidating all possible errors into a single enum.
///
/// Note that a "bad" prompt is never an error: oversized or forbidden input is
/// expressed as a DENY decision by a matching law.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed or missing law definitions, or invalid gateway settings.
    /// Fatal at load time: no partial law set is ever served.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents data validation errors on caller-supplied structures.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An unexpected failure inside a pipeline stage. The evaluation fails as a
    /// whole and must not be reported as a decision.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl GatewayError {
    /// True for failures that belong to a single evaluation rather than to the
    /// process configuration.
    pub fn is_evaluation_failure(&self) -> bool {
        matches!(self, GatewayError::Internal(_))
    }

    /// Prefix a configuration error with where it happened.
    pub fn within(self, location: impl std::fmt::Display) -> Self {
        match self {
            GatewayError::Config(msg) => GatewayError::Config(format!("{}: {}", location, msg)),
            other => other,
        }
    }
}

impl Clone for GatewayError {
    fn clone(&self) -> Self {
        match self {
            GatewayError::Config(s) => GatewayError::Config(s.clone()),
            GatewayError::Validation(s) => GatewayError::Validation(s.clone()),
            GatewayError::Internal(s) => GatewayError::Internal(s.clone()),
            GatewayError::Io(e) => GatewayError::Io(io::Error::new(e.kind(), e.to_string())),
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Config(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for GatewayError {
    fn from(err: serde_yaml::Error) -> Self {
        GatewayError::Config(format!("YAML error: {}", err))
    }
}

impl From<validator::ValidationErrors> for GatewayError {
    fn from(err: validator::ValidationErrors) -> Self {
        GatewayError::Config(format!("Validation errors: {}", err))
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, GatewayError>;
