//! Report export documents and their discovery on disk

use super::error::{ReportError, ReportResult};
use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use step_tree::TestCase;
use walkdir::WalkDir;

/// A report export: the top-level test cases of one execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportDocument {
    pub name: Option<String>,
    pub cases: Vec<TestCase>,
}

impl ReportDocument {
    /// Decode a report; the top level must be a JSON object
    pub fn from_json_str(content: &str, path: &Path) -> ReportResult<Self> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| ReportError::decode(path, e))?;
        if !value.is_object() {
            let error = serde_json::Error::invalid_type(unexpected(&value), &"a report object");
            return Err(ReportError::decode(path, error));
        }
        serde_json::from_value(value).map_err(|e| ReportError::decode(path, e))
    }

    pub fn load(path: &Path) -> ReportResult<Self> {
        if !path.exists() {
            return Err(ReportError::not_found(path));
        }
        let content = fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
        Self::from_json_str(&content, path)
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s.as_str()),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

/// Find report files: the file itself, or every `.json` file below a directory
pub fn discover_reports(path: &Path) -> ReportResult<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(ReportError::not_found(path));
    }

    let mut reports = Vec::new();
    for entry in WalkDir::new(path).follow_links(false) {
        let entry = entry?;
        let is_json = entry
            .path()
            .extension()
            .is_some_and(|extension| extension == "json");
        if entry.file_type().is_file() && is_json {
            reports.push(entry.into_path());
        }
    }

    if reports.is_empty() {
        return Err(ReportError::empty_input(path));
    }
    reports.sort();
    Ok(reports)
}
