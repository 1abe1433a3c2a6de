//! Report records and the adapter the engine reads them through

pub mod types;
pub mod verdict;
pub mod view;

pub use types::{Parameter, StepRecord, TableEntity, TestCase, PASS_THROUGH_PREFIX};
pub use verdict::{parse_verdict_list, Verdict};
pub use view::{SourceType, StepView, ERROR_PACKAGE_INDEX};
