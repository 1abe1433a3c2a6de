//! Step stream processing: skip gate, loop tracking, classification and sub-case expansion

pub mod context;
pub mod error;
pub mod loop_run;
pub mod processor;
pub mod rules;
pub mod skip_gate;

pub use context::{CaseContext, ConvertedCase};
pub use error::{ConversionError, ConversionResult};
pub use loop_run::{LoopRun, LoopState};
pub use processor::{convert_case, convert_records, CaseProcessor};
pub use rules::{classify, Rule, RuleOutcome, RULE_ORDER};
pub use skip_gate::SkipGate;
