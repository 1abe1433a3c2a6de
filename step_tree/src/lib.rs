//! Step tree reconstruction for test execution reports
//!
//! Turns the flat, depth-annotated step records of a test case into a tree of
//! classified steps, expanding called sub-cases inline where configured.

pub mod config;
#[macro_use]
pub mod logging;
pub mod process;
pub mod record;
pub mod step;
pub mod tree;
pub mod utils;

// Re-export key types for library consumers
pub use config::{ConfigError, ConversionConfig, Language, LoggingPreferences};
pub use process::{
    convert_case, convert_records, CaseProcessor, ConversionError, ConversionResult, ConvertedCase,
};
pub use record::{StepRecord, TestCase, Verdict};
pub use step::{Category, ClassifiedStep};
pub use tree::{StepNode, StepTree};
