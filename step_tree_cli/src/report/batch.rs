//! Batch conversion of report documents
//!
//! Top-level cases are converted first; the sub-cases each conversion discovers are
//! then converted as cases of their own, level by level, up to the configured depth.

use super::document::ReportDocument;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};
use step_tree::logging::codes;
use step_tree::step::ExchangeTree;
use step_tree::{CaseProcessor, ConversionConfig, TestCase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Converted,
    Empty,
    Failed,
}

/// Conversion outcome of one case
#[derive(Debug, Clone, Serialize)]
pub struct CaseOutput {
    pub ref_path: String,
    /// 0 for top-level cases, n for sub-cases discovered n calls deep
    pub level: usize,
    pub status: CaseStatus,
    pub step_count: usize,
    pub tree: Option<ExchangeTree>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub images: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub identifiers: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    pub cases: usize,
    pub converted: usize,
    pub empty: usize,
    pub failed: usize,
    pub steps: usize,
}

impl ConversionSummary {
    fn record(&mut self, case: &CaseOutput) {
        self.cases += 1;
        self.steps += case.step_count;
        match case.status {
            CaseStatus::Converted => self.converted += 1,
            CaseStatus::Empty => self.empty += 1,
            CaseStatus::Failed => self.failed += 1,
        }
    }

    pub fn merge(&mut self, other: &ConversionSummary) {
        self.cases += other.cases;
        self.converted += other.converted;
        self.empty += other.empty;
        self.failed += other.failed;
        self.steps += other.steps;
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Converted form of one report document
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    pub source: String,
    pub name: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub cases: Vec<CaseOutput>,
    pub summary: ConversionSummary,
    #[serde(skip)]
    pub duration: Duration,
}

impl ReportOutput {
    pub fn summary_line(&self) -> String {
        format!(
            "{}: {} cases, {} converted, {} empty, {} failed, {} steps, {:.2}s",
            self.source,
            self.summary.cases,
            self.summary.converted,
            self.summary.empty,
            self.summary.failed,
            self.summary.steps,
            self.duration.as_secs_f64()
        )
    }
}

/// Convert every case of a document, then its discovered sub-cases
pub fn convert_report(
    source: &str,
    document: &ReportDocument,
    config: &ConversionConfig,
) -> ReportOutput {
    let start = Instant::now();
    let processor = CaseProcessor::new(config);
    let mut cases = Vec::new();
    let mut summary = ConversionSummary::default();

    let mut pending: Vec<TestCase> = document.cases.clone();
    let mut level = 0;

    while !pending.is_empty() {
        let mut discovered = Vec::new();

        for case in &pending {
            let output = match processor.convert(case) {
                Ok(converted) => {
                    if level < config.max_sub_case_level {
                        discovered.extend(converted.sub_cases.iter().cloned());
                    }
                    CaseOutput {
                        ref_path: converted.ref_path.clone(),
                        level,
                        status: if converted.is_empty() {
                            CaseStatus::Empty
                        } else {
                            CaseStatus::Converted
                        },
                        step_count: converted.step_count(),
                        tree: converted.tree.as_ref().map(|tree| tree.to_exchange()),
                        images: converted.images,
                        identifiers: converted.identifiers,
                        error: None,
                    }
                }
                Err(error) => {
                    step_tree::log_error!(
                        error.error_code(),
                        "Case conversion failed",
                        "case" => case.ref_path,
                        "error" => error
                    );
                    CaseOutput {
                        ref_path: case.ref_path.clone(),
                        level,
                        status: CaseStatus::Failed,
                        step_count: 0,
                        tree: None,
                        images: BTreeMap::new(),
                        identifiers: BTreeSet::new(),
                        error: Some(error.to_string()),
                    }
                }
            };

            summary.record(&output);
            cases.push(output);
        }

        pending = discovered;
        level += 1;
    }

    let duration = start.elapsed();
    step_tree::log_success!(
        codes::success::REPORT_CONVERTED,
        "Report converted",
        "source" => source,
        "cases" => summary.cases,
        "failed" => summary.failed,
        "duration_ms" => duration.as_millis()
    );

    ReportOutput {
        source: source.to_string(),
        name: document.name.clone(),
        generated_at: Utc::now(),
        cases,
        summary,
        duration,
    }
}
