//! Conversion errors

use crate::logging::{codes, Code};

pub type ConversionResult<T> = Result<T, ConversionError>;

/// Fatal conditions that abort the conversion of a case
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Sub-case '{case}' nested {depth} levels deep, limit is {limit}")]
    SubCaseNestingTooDeep {
        case: String,
        depth: usize,
        limit: usize,
    },
}

impl ConversionError {
    /// Create nesting limit error
    pub fn nesting_too_deep(case: &str, depth: usize, limit: usize) -> Self {
        Self::SubCaseNestingTooDeep {
            case: case.to_string(),
            depth,
            limit,
        }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::SubCaseNestingTooDeep { .. } => codes::process::SUB_CASE_NESTING_TOO_DEEP,
        }
    }
}
