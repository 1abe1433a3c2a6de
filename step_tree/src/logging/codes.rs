//! Consolidated event codes and classification system
//!
//! Single source of truth for all codes emitted by the step tree engine and their metadata.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for error, warning and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CLASSIFICATION TYPES
// ============================================================================

/// Event severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct CodeMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub description: &'static str,
}

impl CodeMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        description: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            description,
        }
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// System codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Configuration codes
pub mod config {
    use super::Code;

    pub const CONFIG_READ_FAILED: Code = Code::new("E010");
    pub const CONFIG_PARSE_FAILED: Code = Code::new("E011");
    pub const INVALID_VERDICT: Code = Code::new("E012");
    pub const INVALID_LANGUAGE: Code = Code::new("E013");
}

/// Tree building codes
pub mod tree {
    use super::Code;

    pub const DEPTH_JUMP_SALVAGED: Code = Code::new("W020");
    pub const DEPTH_ABOVE_ROOT: Code = Code::new("W021");
}

/// Case processing codes
pub mod process {
    use super::Code;

    pub const SUB_CASE_NESTING_TOO_DEEP: Code = Code::new("E030");
    pub const EMPTY_CASE: Code = Code::new("W031");
    pub const MISSING_CALLEE: Code = Code::new("W032");
    pub const REPORT_LOAD_FAILED: Code = Code::new("E033");
}

/// Success and informational codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const CONFIG_LOADED: Code = Code::new("I010");
    pub const CASE_CONVERTED: Code = Code::new("I030");
    pub const ERROR_STEP_SYNTHESIZED: Code = Code::new("I031");
    pub const REPORT_CONVERTED: Code = Code::new("I032");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

static CODE_REGISTRY: OnceLock<HashMap<&'static str, CodeMetadata>> = OnceLock::new();

fn get_code_registry() -> &'static HashMap<&'static str, CodeMetadata> {
    CODE_REGISTRY.get_or_init(|| {
        let entries = [
            CodeMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                "Internal engine error",
            ),
            CodeMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                "Logging or engine initialization failed",
            ),
            CodeMetadata::new(
                "E010",
                "Configuration",
                Severity::High,
                true,
                "Configuration file could not be read",
            ),
            CodeMetadata::new(
                "E011",
                "Configuration",
                Severity::High,
                true,
                "Configuration file is not valid TOML",
            ),
            CodeMetadata::new(
                "E012",
                "Configuration",
                Severity::Medium,
                true,
                "Unknown verdict in a verdict list setting",
            ),
            CodeMetadata::new(
                "E013",
                "Configuration",
                Severity::Medium,
                true,
                "Unknown report language",
            ),
            CodeMetadata::new(
                "W020",
                "Tree",
                Severity::Low,
                true,
                "Depth jump of more than one level attached to deepest ancestor",
            ),
            CodeMetadata::new(
                "W021",
                "Tree",
                Severity::Low,
                true,
                "Record shallower than the case root attached to the root",
            ),
            CodeMetadata::new(
                "E030",
                "Process",
                Severity::Critical,
                false,
                "Sub-case call chain exceeds the nesting limit",
            ),
            CodeMetadata::new(
                "W031",
                "Process",
                Severity::Low,
                true,
                "Test case produced no reportable steps",
            ),
            CodeMetadata::new(
                "W032",
                "Process",
                Severity::Low,
                true,
                "Sub-case call without callee data",
            ),
            CodeMetadata::new(
                "E033",
                "Process",
                Severity::High,
                true,
                "Report export could not be loaded",
            ),
        ];

        entries
            .into_iter()
            .map(|metadata| (metadata.code, metadata))
            .collect()
    })
}

/// Get complete metadata for a code
pub fn get_code_metadata(code: &str) -> Option<&'static CodeMetadata> {
    get_code_registry().get(code)
}

/// Get severity from code
pub fn get_severity(code: &str) -> Severity {
    get_code_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Low)
}

/// Check if the condition behind a code is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_code_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_code_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown code")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_code_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("General")
}
