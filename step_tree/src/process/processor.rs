//! Case conversion pipeline
//!
//! Records flow through pre-filters, the skip gate, conditional marker handling and the
//! rule chain; accepted steps are inserted into the case tree. Sub-case calls that
//! qualify for expansion feed the callee's own records back through the same pipeline,
//! sharing the case context.

use super::context::{CaseContext, ConvertedCase};
use super::error::{ConversionError, ConversionResult};
use super::rules::{classify, RuleOutcome};
use crate::config::ConversionConfig;
use crate::logging::codes;
use crate::record::{SourceType, StepRecord, StepView, TestCase, Verdict};
use crate::step::ClassifiedStep;
use crate::tree::StepTree;

/// Activity of aborted steps, which carry no reportable content
const ABORT_ACTIVITY: &str = "ABORT";

/// Activity prefixes of conditional blocks
const CONDITIONAL_ACTIVITY_PREFIXES: [&str; 2] = ["SWITCHDEF", "IF"];

/// Name prefix of compile-time conditionals
const IFDEF_NAME_PREFIX: &str = "IFDEF";

/// Converts test cases into step trees
#[derive(Debug, Clone, Copy)]
pub struct CaseProcessor<'c> {
    config: &'c ConversionConfig,
}

impl<'c> CaseProcessor<'c> {
    pub fn new(config: &'c ConversionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &'c ConversionConfig {
        self.config
    }

    /// Convert one case with a fresh context
    pub fn convert(&self, case: &TestCase) -> ConversionResult<ConvertedCase> {
        let mut ctx = CaseContext::new(self.config, &case.ref_path);

        if self.config.include_test_steps {
            for record in &case.steps {
                self.process_record(&mut ctx, StepView::new(record), 0)?;
            }
        }

        if ctx.tree.is_none() {
            match case.call_error.as_deref() {
                Some(error) => {
                    ctx.tree = Some(error_tree(case, error));
                    crate::log_success!(
                        codes::success::ERROR_STEP_SYNTHESIZED,
                        "Case has no steps, call error recorded as step",
                        "case" => case.ref_path,
                        "error" => error
                    );
                }
                None => {
                    crate::log_warning!(
                        codes::process::EMPTY_CASE,
                        "Case produced no steps",
                        "case" => case.ref_path
                    );
                }
            }
        }

        let converted = ctx.into_converted();
        crate::log_success!(
            codes::success::CASE_CONVERTED,
            "Case converted",
            "case" => converted.ref_path,
            "steps" => converted.step_count(),
            "sub_cases" => converted.sub_cases.len()
        );

        Ok(converted)
    }

    /// Feed one record through the pipeline
    pub fn process_record(
        &self,
        ctx: &mut CaseContext<'_>,
        view: StepView<'_>,
        nesting: usize,
    ) -> ConversionResult<()> {
        if view.identifier().is_none() {
            return Ok(());
        }

        let activity = view.activity().to_uppercase();
        if activity == ABORT_ACTIVITY {
            return Ok(());
        }

        let depth = view.depth();
        if ctx.gate.should_skip(depth) {
            return Ok(());
        }

        if view.source_type() == SourceType::Utility {
            let ifdef = view.name().to_uppercase().starts_with(IFDEF_NAME_PREFIX);
            let conditional = CONDITIONAL_ACTIVITY_PREFIXES
                .iter()
                .any(|prefix| activity.starts_with(prefix));

            if conditional || ifdef {
                // Only the taken branch is reported; its sub-steps are not
                ctx.gate.set(depth);
                if ifdef {
                    return Ok(());
                }
            }
        }

        match classify(&view, ctx) {
            RuleOutcome::Decline | RuleOutcome::Reject => {}
            RuleOutcome::Accept(step) => ctx.insert(depth, step),
            RuleOutcome::Call { step, expand } => {
                ctx.insert(depth, step);
                if expand {
                    if let Some(callee) = view.callee() {
                        self.expand(ctx, callee, depth, nesting + 1)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Inline a callee's records below its call step at `call_depth`
    fn expand(
        &self,
        ctx: &mut CaseContext<'_>,
        callee: &TestCase,
        call_depth: i32,
        nesting: usize,
    ) -> ConversionResult<()> {
        let limit = self.config.max_sub_case_depth;
        if nesting > limit {
            let error = ConversionError::nesting_too_deep(&callee.ref_path, nesting, limit);
            crate::log_error!(error.error_code(), &error.to_string(), "case" => ctx.ref_path);
            return Err(error);
        }

        let Some(min_depth) = callee.steps.iter().map(|step| step.exec_level).min() else {
            return Ok(());
        };
        let offset = call_depth + 1 - min_depth;

        crate::log_debug!(
            "Expanding sub-case",
            "callee" => callee.ref_path,
            "call_depth" => call_depth,
            "nesting" => nesting
        );

        for record in &callee.steps {
            self.process_record(ctx, StepView::new(record).rebased(offset), nesting)?;
        }
        Ok(())
    }
}

/// Tree holding a single step that reports why the case could not run
fn error_tree(case: &TestCase, error: &str) -> StepTree {
    let verdict = case
        .original_result
        .as_deref()
        .and_then(Verdict::canonicalize);
    let mut tree = StepTree::new(&case.ref_path, -1);
    tree.insert(0, ClassifiedStep::new("0", error, verdict));
    tree
}

/// Convert one case with the given settings
pub fn convert_case(case: &TestCase, config: &ConversionConfig) -> ConversionResult<ConvertedCase> {
    CaseProcessor::new(config).convert(case)
}

/// Convert a bare record stream as if it were the steps of the case at `ref_path`
pub fn convert_records(
    ref_path: &str,
    records: &[StepRecord],
    config: &ConversionConfig,
) -> ConversionResult<ConvertedCase> {
    let case = TestCase::new(ref_path).with_steps(records.to_vec());
    convert_case(&case, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Language, SpecialTestStep};
    use crate::record::TableEntity;
    use crate::step::Category;
    use assert_matches::assert_matches;

    const LOOP: &str = "3DA58CF0-4FEF-11DC-BE56-0013728784EE:LOOP";

    fn loop_item(id: &str, verdict: &str, depth: i32) -> StepRecord {
        StepRecord::new(id, depth)
            .with_src_type("UTILITY")
            .with_src_sub_type(LOOP)
            .with_activity(id)
            .with_original_result(verdict)
    }

    fn block(id: &str, depth: i32) -> StepRecord {
        StepRecord::new(id, depth)
            .with_src_type("UTILITY")
            .with_src_sub_type("007:BLOCK")
            .with_activity(id)
            .with_original_result("SUCCESS")
    }

    fn package_call(id: &str, depth: i32, verdict: &str, callee: TestCase) -> StepRecord {
        StepRecord::new(id, depth)
            .with_src_type("PACKAGE")
            .with_name(id)
            .with_original_result(verdict)
            .with_callee(callee)
    }

    fn config() -> ConversionConfig {
        ConversionConfig::default()
            .with_include_test_steps(true)
            .with_sub_case_verdicts(Vec::new())
            .with_special_test_steps(Vec::new())
            .with_language(Language::De)
            .with_max_sub_case_depth(64)
    }

    fn outline(records: Vec<StepRecord>, config: &ConversionConfig) -> String {
        convert_records("pkg/case.pkg", &records, config)
            .unwrap()
            .tree
            .map(|tree| tree.outline())
            .unwrap_or_default()
    }

    #[test]
    fn test_loop_keeps_first_branch_matching_root_verdict() {
        let records = vec![
            loop_item("root", "FAILED", 0),
            loop_item("b1", "SUCCESS", 1),
            loop_item("b2", "FAILED", 1),
            block("block", 2),
            loop_item("b3", "FAILED", 1),
            loop_item("b4", "SUCCESS", 1),
        ];
        assert_eq!(outline(records, &config()), "root[b2[block]]");
    }

    #[test]
    fn test_loop_with_blocks_and_trailing_step() {
        let records = vec![
            loop_item("Root", "FAILED", 0),
            loop_item("Branch1", "SUCCESS", 1),
            block("Block1", 2),
            loop_item("Branch2", "FAILED", 1),
            block("Block2", 2),
            loop_item("Branch3", "FAILED", 1),
            block("Block3", 2),
            block("OnRoot", 0),
            block("AfterRoot", 1),
        ];
        assert_eq!(
            outline(records, &config()),
            "Root[Branch2[Block2]], OnRoot[AfterRoot]"
        );
    }

    #[test]
    fn test_loop_branches_at_root_depth() {
        let records = vec![
            loop_item("Root", "FAILED", 0),
            loop_item("Branch1", "SUCCESS", 0),
            loop_item("Branch2", "FAILED", 0),
            loop_item("Branch3", "FAILED", 0),
            loop_item("Branch4", "SUCCESS", 0),
        ];
        assert_eq!(outline(records, &config()), "Root, Branch2");
    }

    #[test]
    fn test_loop_without_matching_branch_returns_to_idle() {
        let records = vec![
            loop_item("first", "FAILED", 0),
            loop_item("b1", "SUCCESS", 1),
            block("hidden", 2),
            block("after", 0),
            loop_item("second", "SUCCESS", 0),
            loop_item("c1", "SUCCESS", 1),
            block("shown", 2),
        ];
        assert_eq!(
            outline(records, &config()),
            "first, after, second[c1[shown]]"
        );
    }

    #[test]
    fn test_conditional_after_loop_prunes_its_sub_steps() {
        let records = vec![
            loop_item("root", "FAILED", 0),
            loop_item("b1", "FAILED", 1),
            block("inner", 2),
            StepRecord::new("if", 0)
                .with_src_type("UTILITY")
                .with_src_sub_type("007:BLOCK")
                .with_activity("If a > b"),
            block("then", 1),
            block("else_branch_child", 1),
            block("after", 0),
        ];
        assert_eq!(outline(records, &config()), "root[b1[inner]], if, after");
    }

    #[test]
    fn test_gate_closes_on_shallower_record() {
        let records = vec![
            block("top", 0),
            StepRecord::new("if", 1)
                .with_src_type("UTILITY")
                .with_src_sub_type("007:BLOCK")
                .with_activity("If a > b"),
            block("then", 2),
            block("nested", 3),
            block("next", 1),
            block("child", 2),
        ];
        assert_eq!(outline(records, &config()), "top[if, next[child]]");
    }

    #[test]
    fn test_ifdef_is_dropped_with_its_subtree() {
        let records = vec![
            block("top", 0),
            StepRecord::new("ifdef", 1)
                .with_src_type("UTILITY")
                .with_src_sub_type("007:BLOCK")
                .with_name("IfDef FEATURE"),
            block("inner", 2),
            block("next", 1),
        ];
        assert_eq!(outline(records, &config()), "top[next]");
    }

    #[test]
    fn test_switch_sets_gate() {
        let records = vec![
            StepRecord::new("switch", 0)
                .with_src_type("UTILITY")
                .with_src_sub_type("007:BLOCK")
                .with_activity("switchdef x"),
            block("case", 1),
            block("after", 0),
        ];
        assert_eq!(outline(records, &config()), "switch, after");
    }

    #[test]
    fn test_loop_priority_over_conditional_block() {
        // Loop tag and conditional activity on the same record: the loop rule classifies it
        let records = vec![StepRecord::new("both", 0)
            .with_src_type("UTILITY")
            .with_src_sub_type("3DA58CF0-4FEF-11DC-BE56-0013728784EE:BLOCK")
            .with_activity("If loop")
            .with_original_result("FAILED")];
        let converted = convert_records("pkg", &records, &config()).unwrap();
        let tree = converted.tree.unwrap();
        let step = &tree.children()[0].step;
        assert!(step.description.is_some());
    }

    #[test]
    fn test_unmatched_records_leave_no_trace() {
        let records = vec![
            StepRecord::new("x", 0)
                .with_src_type("UNKNOWN_X")
                .with_src_sub_type("?"),
            block("kept", 0),
        ];
        let converted = convert_records("pkg", &records, &config()).unwrap();
        assert_eq!(converted.tree.as_ref().unwrap().outline(), "kept");
        assert!(converted.images.is_empty());
        assert!(converted.sub_cases.is_empty());
        assert!(converted.identifiers.is_empty());
    }

    #[test]
    fn test_records_without_identifier_or_aborted_are_dropped() {
        let mut anonymous = block("anon", 0);
        anonymous.src = None;
        let records = vec![
            anonymous,
            block("abort", 0).with_activity("Abort"),
            block("kept", 0),
        ];
        assert_eq!(outline(records, &config()), "kept");
    }

    #[test]
    fn test_root_sits_above_first_accepted_step() {
        let records = vec![
            StepRecord::new("ignored", 0).with_src_type("UNKNOWN"),
            block("first", 3),
        ];
        let converted = convert_records("pkg/a.pkg", &records, &config()).unwrap();
        let tree = converted.tree.unwrap();
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.label(), "pkg/a.pkg");
    }

    fn callee() -> TestCase {
        TestCase::new("pkg/inner.pkg")
            .with_original_result("FAILED")
            .with_steps(vec![block("inner_a", 0), block("inner_b", 1)])
    }

    #[test]
    fn test_sub_case_expands_on_listed_verdict() {
        let config = config().with_sub_case_verdicts(vec![Verdict::Failed]);
        let records = vec![
            package_call("call", 0, "FAILED", callee()),
            block("after", 0),
        ];
        let converted = convert_records("pkg/outer.pkg", &records, &config).unwrap();

        assert_eq!(
            converted.tree.as_ref().unwrap().outline(),
            "call[inner_a[inner_b]], after"
        );
        assert_eq!(converted.sub_cases.len(), 1);
        assert_eq!(converted.sub_cases[0].ref_path, "pkg/inner.pkg");
    }

    #[test]
    fn test_sub_case_stays_leaf_without_listed_verdict() {
        let config = config().with_sub_case_verdicts(vec![Verdict::Error]);
        let records = vec![package_call("call", 0, "FAILED", callee())];
        let converted = convert_records("pkg/outer.pkg", &records, &config).unwrap();

        let tree = converted.tree.unwrap();
        assert_eq!(tree.outline(), "call");
        assert_eq!(tree.children()[0].step.category, Some(Category::SubPackage));
        assert_eq!(converted.sub_cases.len(), 1);
    }

    #[test]
    fn test_sub_case_expands_on_deep_revaluation() {
        let records = vec![package_call("call", 1, "FAILED", callee()).with_result("SUCCESS")];
        assert_eq!(outline(records, &config()), "call[inner_a[inner_b]]");

        let records = vec![package_call("call", 1, "ERROR", callee()).with_src_index("ERRORPACKAGE")];
        assert_eq!(outline(records, &config()), "call[inner_a[inner_b]]");
    }

    #[test]
    fn test_callee_with_absolute_depths_is_unchanged() {
        let config = config().with_sub_case_verdicts(vec![Verdict::Failed]);
        let absolute = TestCase::new("pkg/inner.pkg")
            .with_steps(vec![block("inner_a", 3), block("inner_b", 4)]);
        let records = vec![block("top", 1), package_call("call", 2, "FAILED", absolute)];
        let converted = convert_records("pkg", &records, &config).unwrap();
        let tree = converted.tree.unwrap();

        assert_eq!(tree.outline(), "top[call[inner_a[inner_b]]]");
        assert_eq!(tree.find("inner_a").map(|n| n.depth), Some(3));
    }

    #[test]
    fn test_nested_expansion_limit() {
        let config = config()
            .with_sub_case_verdicts(vec![Verdict::Failed])
            .with_max_sub_case_depth(2);

        let mut case = TestCase::new("pkg/leaf.pkg").with_steps(vec![block("leaf", 0)]);
        for level in 0..3 {
            let call = package_call(&format!("call{}", level), 0, "FAILED", case);
            case = TestCase::new(&format!("pkg/level{}.pkg", level)).with_steps(vec![call]);
        }

        assert_matches!(
            convert_case(&case, &config),
            Err(ConversionError::SubCaseNestingTooDeep { depth: 3, limit: 2, .. })
        );

        let relaxed = config.with_max_sub_case_depth(3);
        let converted = convert_case(&case, &relaxed).unwrap();
        assert_eq!(
            converted.tree.unwrap().outline(),
            "call2[call1[call0[leaf]]]"
        );
    }

    #[test]
    fn test_error_step_for_case_without_steps() {
        let case = TestCase::new("pkg/broken.pkg")
            .with_original_result("SUCCESS")
            .with_call_error("Package could not be loaded");
        let converted = convert_case(&case, &config()).unwrap();
        let tree = converted.tree.unwrap();

        assert_eq!(tree.depth(), -1);
        assert_eq!(tree.label(), "pkg/broken.pkg");
        let step = &tree.children()[0];
        assert_eq!(step.depth, 0);
        assert_eq!(step.step.id, "0");
        assert_eq!(step.step.label, "Package could not be loaded");
        assert_eq!(step.step.verdict, Some(Verdict::Passed));
        assert_eq!(step.step.category, None);
    }

    #[test]
    fn test_empty_case() {
        let case = TestCase::new("pkg/empty.pkg");
        let converted = convert_case(&case, &config()).unwrap();
        assert!(converted.is_empty());
        assert_eq!(converted.step_count(), 0);
    }

    #[test]
    fn test_steps_disabled() {
        let case = TestCase::new("pkg/a.pkg").with_steps(vec![block("a", 0)]);
        let converted = convert_case(&case, &config().with_include_test_steps(false)).unwrap();
        assert!(converted.is_empty());

        let failing = case.with_call_error("boom");
        let converted = convert_case(&failing, &config().with_include_test_steps(false)).unwrap();
        assert_eq!(converted.tree.unwrap().outline(), "0");
    }

    #[test]
    fn test_repeated_analysis_jobs_get_distinct_ids() {
        let job = |depth| {
            StepRecord::new("same", depth)
                .with_src_type("UTILITY")
                .with_name("Analyse-Job")
                .with_info("Job")
        };
        let records = vec![job(0), job(0), job(0)];
        assert_eq!(
            outline(records, &config()),
            "traceanalyse_Job, traceanalyse_Job_1, traceanalyse_Job_2"
        );
    }

    #[test]
    fn test_side_channels() {
        let config = config().with_special_test_steps(vec![SpecialTestStep::Calculation]);
        let records = vec![
            StepRecord::new("plot", 0)
                .with_src_type("UNDEFINED")
                .with_src_sub_type("IMAGE")
                .with_image_file("a.png")
                .with_image_file("b.png"),
            package_call("call", 0, "SUCCESS", callee()).with_entity(TableEntity::table_cell(
                "keywordId",
                vec![vec!["42".to_string()]],
            )),
            package_call("again", 0, "SUCCESS", callee()).with_entity(TableEntity::table_cell(
                "keywordId",
                vec![vec!["42".to_string()]],
            )),
        ];
        let converted = convert_records("pkg", &records, &config).unwrap();

        assert_eq!(converted.images["plot"], vec!["a.png", "b.png"]);
        assert_eq!(converted.identifiers.len(), 1);
        assert!(converted.identifiers.contains("42"));
        assert_eq!(converted.sub_cases.len(), 2);
    }
}
