//! Classified steps
use crate::record::Verdict;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category tag of a classified step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "TRACE_ANALYSIS_PLOT")]
    TraceAnalysisPlot,
    #[serde(rename = "TRACEANALYSE")]
    TraceAnalysis,
    #[serde(rename = "SUB_PACKAGE")]
    SubPackage,
    #[serde(rename = "AXS")]
    Axs,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::TraceAnalysisPlot => "TRACE_ANALYSIS_PLOT",
            Category::TraceAnalysis => "TRACEANALYSE",
            Category::SubPackage => "SUB_PACKAGE",
            Category::Axs => "AXS",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reportable step produced by exactly one classification rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedStep {
    pub id: String,
    pub label: String,
    pub verdict: Option<Verdict>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub expected_result: Option<String>,
}

impl ClassifiedStep {
    pub fn new(id: impl Into<String>, label: impl Into<String>, verdict: Option<Verdict>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            verdict,
            category: None,
            description: None,
            expected_result: None,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the expected result; empty text leaves it unset
    pub fn with_expected_result(mut self, expected: Option<&str>) -> Self {
        self.expected_result = expected.filter(|e| !e.is_empty()).map(str::to_string);
        self
    }

    /// Exchange short name of the step
    pub fn short_name(&self) -> String {
        format!("step_{}", self.id)
    }
}
