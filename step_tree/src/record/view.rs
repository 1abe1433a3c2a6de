//! Normalized read-only view over a [`StepRecord`]

use super::types::{StepRecord, TableEntity, TestCase};
use super::verdict::Verdict;
use crate::utils::filter_short_name;

/// Source index the host assigns to steps of a package that failed to load
pub const ERROR_PACKAGE_INDEX: &str = "ERRORPACKAGE";

/// Source classification of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Utility,
    Package,
    ParallelPackage,
    Call,
    Undefined,
    Other,
}

impl SourceType {
    pub fn parse(value: &str) -> Self {
        match value {
            "UTILITY" => SourceType::Utility,
            "PACKAGE" => SourceType::Package,
            "PARALLEL_PACKAGE" => SourceType::ParallelPackage,
            "CALL" => SourceType::Call,
            "UNDEFINED" => SourceType::Undefined,
            _ => SourceType::Other,
        }
    }

    pub fn is_package_call(&self) -> bool {
        matches!(self, SourceType::Package | SourceType::ParallelPackage)
    }
}

/// Uniform accessors over a raw record.
///
/// Missing text degrades to empty strings, the sub-type is upper-cased once for
/// comparisons and the verdict is canonicalized. Construction never fails.
#[derive(Debug, Clone)]
pub struct StepView<'a> {
    record: &'a StepRecord,
    depth_offset: i32,
    source_type: SourceType,
    cmp_sub_type: String,
}

impl<'a> StepView<'a> {
    pub fn new(record: &'a StepRecord) -> Self {
        Self {
            record,
            depth_offset: 0,
            source_type: SourceType::parse(record.src_type.as_deref().unwrap_or_default()),
            cmp_sub_type: record
                .src_sub_type
                .as_deref()
                .unwrap_or_default()
                .to_uppercase(),
        }
    }

    /// Shift the reported depth, used to place a callee's steps below its call
    pub fn rebased(mut self, offset: i32) -> Self {
        self.depth_offset = offset;
        self
    }

    pub fn record(&self) -> &'a StepRecord {
        self.record
    }

    pub fn depth(&self) -> i32 {
        self.record.exec_level + self.depth_offset
    }

    pub fn identifier(&self) -> Option<&'a str> {
        self.record.src.as_deref()
    }

    /// Identifier reduced to short-name characters
    pub fn step_id(&self) -> String {
        filter_short_name(self.identifier().unwrap_or_default())
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    /// Upper-cased source sub-type
    pub fn cmp_sub_type(&self) -> &str {
        &self.cmp_sub_type
    }

    pub fn activity(&self) -> &'a str {
        self.record.activity.as_deref().unwrap_or_default()
    }

    pub fn name(&self) -> &'a str {
        self.record.name.as_deref().unwrap_or_default()
    }

    /// Free-text info, `None` when absent or empty
    pub fn info(&self) -> Option<&'a str> {
        non_empty(self.record.info.as_deref())
    }

    pub fn label(&self) -> &'a str {
        self.record.label.as_deref().unwrap_or_default()
    }

    pub fn target_value(&self) -> Option<&'a str> {
        non_empty(self.record.target_value.as_deref())
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.record
            .original_result
            .as_deref()
            .and_then(Verdict::canonicalize)
    }

    pub fn entities(&self) -> &'a [TableEntity] {
        &self.record.entities
    }

    pub fn image_files(&self) -> &'a [String] {
        &self.record.image_files
    }

    pub fn callee(&self) -> Option<&'a TestCase> {
        self.record.callee.as_deref()
    }

    /// Whether the step was revalued after execution or belongs to an error package.
    ///
    /// A missing current result counts as unchanged.
    pub fn has_deep_revaluation(&self) -> bool {
        let revalued = self
            .record
            .result
            .as_ref()
            .is_some_and(|result| Some(result) != self.record.original_result.as_ref());

        revalued || self.record.src_index.as_deref() == Some(ERROR_PACKAGE_INDEX)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
