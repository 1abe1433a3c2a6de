// RUNTIME PREFERENCES (conversion behaviour)

use super::error::{ConfigError, ConfigResult};
use super::locale::Language;
use crate::logging::{codes, LogLevel};
use crate::record::{parse_verdict_list, Verdict};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Default nesting limit for inline sub-case expansion
pub const DEFAULT_MAX_SUB_CASE_DEPTH: usize = 64;

/// Default number of discovered sub-case levels reprocessed as independent cases
pub const DEFAULT_MAX_SUB_CASE_LEVEL: usize = 10;

/// Optional step kinds that are only captured on request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialTestStep {
    Calculation,
}

impl SpecialTestStep {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Calculation" => Some(SpecialTestStep::Calculation),
            _ => None,
        }
    }

    /// Parse a `;` separated list, ignoring unknown entries
    pub fn parse_list(value: &str) -> Vec<Self> {
        value.split(';').filter_map(Self::parse).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Least severe level that reaches the logger
    pub min_log_level: LogLevel,

    /// Emit JSON lines instead of plain text
    pub use_structured_logging: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            min_log_level: env::var("STEPTREE_LOG_LEVEL")
                .ok()
                .and_then(|v| LogLevel::parse(&v))
                .unwrap_or(LogLevel::Info),
            use_structured_logging: env::var("STEPTREE_STRUCTURED_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

/// Settings that steer how report steps are turned into a step tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Whether test steps are emitted at all
    pub include_test_steps: bool,

    /// Step kinds captured in addition to the regular ones
    pub capture_special_test_steps: Vec<SpecialTestStep>,

    /// Verdicts for which a called sub-case is expanded inline
    pub capture_sub_case_on_verdict: Vec<Verdict>,

    /// Language of the report, selects localized markers
    pub language: Language,

    /// Maximum nesting of inline sub-case expansion before a case is aborted
    pub max_sub_case_depth: usize,

    /// Levels of discovered sub-cases that are converted as cases of their own
    pub max_sub_case_level: usize,

    pub logging: LoggingPreferences,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            include_test_steps: env::var("STEPTREE_INCLUDE_TEST_STEPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            capture_special_test_steps: env::var("STEPTREE_CAPTURE_SPECIAL_TEST_STEPS")
                .ok()
                .map(|v| SpecialTestStep::parse_list(&v))
                .unwrap_or_default(),
            capture_sub_case_on_verdict: env::var("STEPTREE_CAPTURE_SUB_CASE_ON_VERDICT")
                .ok()
                .and_then(|v| parse_verdict_list(&v).ok())
                .unwrap_or_default(),
            language: env::var("STEPTREE_LANGUAGE")
                .ok()
                .and_then(|v| Language::parse(&v).ok())
                .unwrap_or_default(),
            max_sub_case_depth: env::var("STEPTREE_MAX_SUB_CASE_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_SUB_CASE_DEPTH),
            max_sub_case_level: env::var("STEPTREE_MAX_SUB_CASE_LEVEL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_SUB_CASE_LEVEL),
            logging: LoggingPreferences::default(),
        }
    }
}

impl ConversionConfig {
    /// Parse settings from TOML; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load settings from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::read_failed(path, source))?;
        let config = Self::from_toml_str(&content)?;

        crate::log_success!(
            codes::success::CONFIG_LOADED,
            "Conversion settings loaded",
            "path" => path.display(),
            "language" => config.language.as_str()
        );

        Ok(config)
    }

    pub fn with_include_test_steps(mut self, include: bool) -> Self {
        self.include_test_steps = include;
        self
    }

    pub fn with_special_test_steps(mut self, steps: Vec<SpecialTestStep>) -> Self {
        self.capture_special_test_steps = steps;
        self
    }

    pub fn with_sub_case_verdicts(mut self, verdicts: Vec<Verdict>) -> Self {
        self.capture_sub_case_on_verdict = verdicts;
        self
    }

    /// Set the expansion allow-list from its host form, e.g. `"FAILED; ERROR"`
    pub fn with_sub_case_verdict_list(mut self, value: &str) -> ConfigResult<Self> {
        self.capture_sub_case_on_verdict = parse_verdict_list(value)?;
        Ok(self)
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_max_sub_case_depth(mut self, depth: usize) -> Self {
        self.max_sub_case_depth = depth;
        self
    }

    pub fn with_max_sub_case_level(mut self, level: usize) -> Self {
        self.max_sub_case_level = level;
        self
    }

    pub fn captures_calculation(&self) -> bool {
        self.capture_special_test_steps
            .contains(&SpecialTestStep::Calculation)
    }

    pub fn expands_on_verdict(&self, verdict: Option<Verdict>) -> bool {
        verdict.is_some_and(|v| self.capture_sub_case_on_verdict.contains(&v))
    }
}
