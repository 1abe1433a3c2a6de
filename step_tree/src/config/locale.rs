//! Report language and the localized markers that depend on it

use super::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    De,
    En,
}

impl Language {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "de" => Ok(Language::De),
            "en" => Ok(Language::En),
            _ => Err(ConfigError::invalid_language(value)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
        }
    }

    pub fn localization(&self) -> &'static Localization {
        match self {
            Language::De => &GERMAN,
            Language::En => &ENGLISH,
        }
    }
}

/// Localized texts the host writes into reports, or that converted steps carry
#[derive(Debug)]
pub struct Localization {
    /// Name of an analysis job step
    pub analysis_job: &'static str,
    /// Label prefix of a calculation step
    pub calculation: &'static str,
    /// Description prefix of a calculation step
    pub value: &'static str,
    /// Marker cell of the expected-value row in a keyword comparison table
    pub expected_marker: &'static str,
}

static GERMAN: Localization = Localization {
    analysis_job: "Analyse-Job",
    calculation: "Berechnung",
    value: "Wert",
    expected_marker: "SOLL:",
};

static ENGLISH: Localization = Localization {
    analysis_job: "Analysis job",
    calculation: "Calculation",
    value: "Value",
    expected_marker: "EXPECTED:",
};
