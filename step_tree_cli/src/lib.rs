//! # Step Tree CLI
//!
//! Reads report exports from disk, converts every test case with the step tree engine
//! and collects the results.

pub mod report;

pub use report::{
    convert_report, discover_reports, ReportDocument, ReportError, ReportOutput, ReportResult,
};

use std::path::Path;
use step_tree::ConversionConfig;

/// Convert every report found at `input` (a file or a directory tree)
pub fn convert_path(input: &Path, config: &ConversionConfig) -> ReportResult<Vec<ReportOutput>> {
    let mut outputs = Vec::new();
    for path in discover_reports(input)? {
        let document = ReportDocument::load(&path)?;
        outputs.push(convert_report(
            &path.display().to_string(),
            &document,
            config,
        ));
    }
    Ok(outputs)
}
