//! Error types for configuration, classification, and annotator setup.

use serde::Serialize;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Coarse failure class of a single classification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Connection refused, DNS, TLS, or timeout.
    Transport,
    /// The endpoint answered with a non-success status.
    Http,
    /// The body was not the expected JSON shape.
    Decode,
}

/// Failure of one classification request. Never escapes an annotation pass.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response body ({message}): {body}")]
    Decode { message: String, body: String },
}

impl ClassifyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) | Self::Timeout { .. } => ErrorKind::Transport,
            Self::Status { .. } => ErrorKind::Http,
            Self::Decode { .. } => ErrorKind::Decode,
        }
    }
}

/// Top-level library error.
#[derive(Debug, Error)]
pub enum FlagError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
