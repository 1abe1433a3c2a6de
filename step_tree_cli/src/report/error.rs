//! Report loading and batch errors

use std::path::{Path, PathBuf};
use step_tree::logging::{codes, Code};
use step_tree::{ConfigError, ConversionError};

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Input not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid report JSON in {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No report files found in {path}")]
    EmptyInput { path: PathBuf },

    #[error("Directory traversal failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConversionError),
}

impl ReportError {
    pub fn not_found(path: &Path) -> Self {
        Self::NotFound {
            path: path.to_path_buf(),
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn decode(path: &Path, source: serde_json::Error) -> Self {
        Self::Decode {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn empty_input(path: &Path) -> Self {
        Self::EmptyInput {
            path: path.to_path_buf(),
        }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::Config(error) => error.error_code(),
            Self::Conversion(error) => error.error_code(),
            _ => codes::process::REPORT_LOAD_FAILED,
        }
    }
}
