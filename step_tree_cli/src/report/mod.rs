//! Report exports: loading, batch conversion and output

pub mod batch;
pub mod document;
pub mod error;

pub use batch::{convert_report, CaseOutput, CaseStatus, ConversionSummary, ReportOutput};
pub use document::{discover_reports, ReportDocument};
pub use error::{ReportError, ReportResult};
