//! Configuration errors

use crate::logging::{codes, Code};
use std::path::PathBuf;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or parsing conversion settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration TOML: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("Unknown verdict '{value}' (expected NONE, PASSED/SUCCESS, INCONCLUSIVE, FAILED or ERROR)")]
    InvalidVerdict { value: String },

    #[error("Unknown report language '{value}' (expected 'de' or 'en')")]
    InvalidLanguage { value: String },
}

impl ConfigError {
    /// Create read failure error
    pub fn read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFailed {
            path: path.into(),
            source,
        }
    }

    /// Create invalid verdict error
    pub fn invalid_verdict(value: &str) -> Self {
        Self::InvalidVerdict {
            value: value.to_string(),
        }
    }

    /// Create invalid language error
    pub fn invalid_language(value: &str) -> Self {
        Self::InvalidLanguage {
            value: value.to_string(),
        }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::ReadFailed { .. } => codes::config::CONFIG_READ_FAILED,
            Self::ParseFailed(_) => codes::config::CONFIG_PARSE_FAILED,
            Self::InvalidVerdict { .. } => codes::config::INVALID_VERDICT,
            Self::InvalidLanguage { .. } => codes::config::INVALID_LANGUAGE,
        }
    }
}
