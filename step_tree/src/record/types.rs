//! Raw report records as delivered by the report store
use serde::{Deserialize, Serialize};

/// One executed sub-step of a test case, in execution order.
///
/// Every text attribute is optional; absence degrades to neutral values in
/// [`StepView`](super::StepView).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepRecord {
    /// Identifying reference of the step; records without one are not reportable
    pub src: Option<String>,
    /// Execution depth
    pub exec_level: i32,
    pub src_type: Option<String>,
    pub src_sub_type: Option<String>,
    pub src_index: Option<String>,
    pub activity: Option<String>,
    pub name: Option<String>,
    pub info: Option<String>,
    /// Verdict as recorded during execution
    pub original_result: Option<String>,
    /// Verdict after later revaluation
    pub result: Option<String>,
    /// Line label of a calculation
    pub label: Option<String>,
    /// Target value of a calculation
    pub target_value: Option<String>,
    pub entities: Vec<TableEntity>,
    /// Image files produced by this step
    pub image_files: Vec<String>,
    /// Test case invoked by a package call
    pub callee: Option<Box<TestCase>>,
}

impl StepRecord {
    pub fn new(src: &str, exec_level: i32) -> Self {
        Self {
            src: Some(src.to_string()),
            exec_level,
            ..Self::default()
        }
    }

    pub fn with_src_type(mut self, src_type: &str) -> Self {
        self.src_type = Some(src_type.to_string());
        self
    }

    pub fn with_src_sub_type(mut self, src_sub_type: &str) -> Self {
        self.src_sub_type = Some(src_sub_type.to_string());
        self
    }

    pub fn with_src_index(mut self, src_index: &str) -> Self {
        self.src_index = Some(src_index.to_string());
        self
    }

    pub fn with_activity(mut self, activity: &str) -> Self {
        self.activity = Some(activity.to_string());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_info(mut self, info: &str) -> Self {
        self.info = Some(info.to_string());
        self
    }

    /// Set the recorded verdict; the current result follows it unless set afterwards
    pub fn with_original_result(mut self, verdict: &str) -> Self {
        self.original_result = Some(verdict.to_string());
        self.result = Some(verdict.to_string());
        self
    }

    pub fn with_result(mut self, verdict: &str) -> Self {
        self.result = Some(verdict.to_string());
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_target_value(mut self, target_value: &str) -> Self {
        self.target_value = Some(target_value.to_string());
        self
    }

    pub fn with_entity(mut self, entity: TableEntity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_image_file(mut self, file: &str) -> Self {
        self.image_files.push(file.to_string());
        self
    }

    pub fn with_callee(mut self, callee: TestCase) -> Self {
        self.callee = Some(Box::new(callee));
        self
    }
}

/// Structured info cell attached to a step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableEntity {
    pub entity_type: String,
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl TableEntity {
    pub const TABLE_CELL: &'static str = "tableentity_cell";

    /// Create a table cell entity
    pub fn table_cell(name: &str, rows: Vec<Vec<String>>) -> Self {
        Self {
            entity_type: Self::TABLE_CELL.to_string(),
            name: name.to_string(),
            rows,
        }
    }

    pub fn is_table_cell(&self, name: &str) -> bool {
        self.entity_type == Self::TABLE_CELL && self.name == name
    }

    pub fn first_row(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }
}

/// Input parameter of a test case call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

/// A reportable test case and its full step stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestCase {
    /// Reference path, used as the label of the tree root
    pub ref_path: String,
    pub name: String,
    pub activity: Option<String>,
    pub original_result: Option<String>,
    pub result: Option<String>,
    /// Reason the case could not be called or loaded
    pub call_error: Option<String>,
    pub parameters: Vec<Parameter>,
    pub steps: Vec<StepRecord>,
}

impl TestCase {
    pub fn new(ref_path: &str) -> Self {
        Self {
            ref_path: ref_path.to_string(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_activity(mut self, activity: &str) -> Self {
        self.activity = Some(activity.to_string());
        self
    }

    pub fn with_original_result(mut self, verdict: &str) -> Self {
        self.original_result = Some(verdict.to_string());
        self.result = Some(verdict.to_string());
        self
    }

    pub fn with_call_error(mut self, error: &str) -> Self {
        self.call_error = Some(error.to_string());
        self
    }

    pub fn with_parameter(mut self, name: &str, value: &str) -> Self {
        self.parameters.push(Parameter {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn with_steps(mut self, steps: Vec<StepRecord>) -> Self {
        self.steps = steps;
        self
    }

    /// Whether this case only forwards a generic keyword call
    pub fn is_pass_through(&self) -> bool {
        self.activity
            .as_deref()
            .is_some_and(|activity| activity.starts_with(PASS_THROUGH_PREFIX))
    }
}

/// Activity prefix of generic keyword calls that have no mapped test case
pub const PASS_THROUGH_PREFIX: &str = "SWK -> TA";
