//! Exchange-format rendering of classified steps
//!
//! Field names follow the exchange schema. Every text is stripped of ASCII control
//! characters before it is rendered.

use super::types::{Category, ClassifiedStep};
use crate::record::Verdict;
use crate::utils::replace_ascii_ctrl_chars;
use serde::{Serialize, Serializer};

/// Language tag written into every localized text
pub const EXCHANGE_LANGUAGE: &str = "DE";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedText {
    #[serde(rename = "@L")]
    pub language: &'static str,
    #[serde(rename = "#")]
    pub text: String,
}

impl LocalizedText {
    fn new(text: &str) -> Self {
        Self {
            language: EXCHANGE_LANGUAGE,
            text: replace_ascii_ctrl_chars(text).into_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongName {
    #[serde(rename = "L-4")]
    pub l4: LocalizedText,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Description {
    #[serde(rename = "L-2")]
    pub l2: LocalizedText,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paragraph {
    #[serde(rename = "L-1")]
    pub l1: LocalizedText,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectedResult {
    #[serde(rename = "P")]
    pub paragraph: Paragraph,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerdictDefinition {
    #[serde(rename = "REPORT-FREQUENCY")]
    pub report_frequency: &'static str,
    #[serde(rename = "PROVIDES-VERDICT")]
    pub provides_verdict: &'static str,
    #[serde(rename = "EXPECTED-RESULT")]
    pub expected_result: ExpectedResult,
}

/// One step in exchange form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeStep {
    #[serde(rename = "SHORT-NAME")]
    pub short_name: String,
    #[serde(rename = "LONG-NAME")]
    pub long_name: LongName,
    #[serde(rename = "CATEGORY", serialize_with = "serialize_category")]
    pub category: Option<Category>,
    #[serde(rename = "VERDICT")]
    pub verdict: Option<Verdict>,
    #[serde(rename = "DESC", skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    #[serde(rename = "VERDICT-DEFINITION", skip_serializing_if = "Option::is_none")]
    pub verdict_definition: Option<VerdictDefinition>,
}

/// A step with children, rendered as a folder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeFolder {
    #[serde(flatten)]
    pub step: ExchangeStep,
    #[serde(rename = "TEST-STEPS")]
    pub children: Vec<ExchangeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExchangeNode {
    #[serde(rename = "TEST-STEP")]
    Step(ExchangeStep),
    #[serde(rename = "TEST-STEP-FOLDER")]
    Folder(ExchangeFolder),
}

/// Exchange form of a whole case tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeTree {
    #[serde(rename = "SHORT-NAME")]
    pub short_name: String,
    #[serde(rename = "TEST-STEPS")]
    pub steps: Vec<ExchangeNode>,
}

// Unset categories are written as `false`
fn serialize_category<S: Serializer>(
    category: &Option<Category>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match category {
        Some(category) => serializer.serialize_str(category.as_str()),
        None => serializer.serialize_bool(false),
    }
}

impl From<&ClassifiedStep> for ExchangeStep {
    fn from(step: &ClassifiedStep) -> Self {
        let description = step
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(|d| Description {
                l2: LocalizedText::new(d),
            });

        // Control characters are removed first so a definition of only control
        // characters is dropped as empty.
        let verdict_definition = step
            .expected_result
            .as_deref()
            .map(replace_ascii_ctrl_chars)
            .filter(|e| !e.is_empty())
            .map(|expected| VerdictDefinition {
                report_frequency: "SINGLE",
                provides_verdict: "EVALUATE",
                expected_result: ExpectedResult {
                    paragraph: Paragraph {
                        l1: LocalizedText::new(&expected),
                    },
                },
            });

        Self {
            short_name: step.short_name(),
            long_name: LongName {
                l4: LocalizedText::new(&step.label),
            },
            category: step.category,
            verdict: step.verdict,
            description,
            verdict_definition,
        }
    }
}

impl ClassifiedStep {
    pub fn to_exchange(&self) -> ExchangeStep {
        ExchangeStep::from(self)
    }
}
