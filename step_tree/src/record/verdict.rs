//! Canonical verdicts and host verdict canonicalization

use crate::config::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical outcome label of a step or test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Verdict {
    None,
    Passed,
    Inconclusive,
    Failed,
    Error,
}

impl Verdict {
    /// Map a raw host verdict onto the canonical vocabulary.
    ///
    /// The comparison is case-sensitive. The host reports a pass as `SUCCESS`; the
    /// canonical `PASSED` spelling is accepted as well. Anything else yields `None`.
    pub fn canonicalize(raw: &str) -> Option<Self> {
        match raw {
            "NONE" => Some(Verdict::None),
            "SUCCESS" | "PASSED" => Some(Verdict::Passed),
            "INCONCLUSIVE" => Some(Verdict::Inconclusive),
            "FAILED" => Some(Verdict::Failed),
            "ERROR" => Some(Verdict::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::None => "NONE",
            Verdict::Passed => "PASSED",
            Verdict::Inconclusive => "INCONCLUSIVE",
            Verdict::Failed => "FAILED",
            Verdict::Error => "ERROR",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Verdict {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, ConfigError> {
        Verdict::canonicalize(value.trim()).ok_or_else(|| ConfigError::invalid_verdict(&value))
    }
}

/// Parse a host verdict list such as `"FAILED; ERROR"`.
///
/// Entries are separated by `;` and trimmed; empty entries are ignored, so an empty
/// setting yields an empty list.
pub fn parse_verdict_list(value: &str) -> ConfigResult<Vec<Verdict>> {
    value
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| Verdict::canonicalize(entry).ok_or_else(|| ConfigError::invalid_verdict(entry)))
        .collect()
}
