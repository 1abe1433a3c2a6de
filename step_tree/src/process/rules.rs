//! Classification rules
//!
//! Rules run in the fixed order of [`RULE_ORDER`]; the first rule that accepts or
//! rejects a record ends the chain. The loop rule runs first because it updates the
//! skip gate and the loop tracker that every later record depends on.

use super::context::CaseContext;
use super::loop_run::LoopState;
use crate::logging::codes;
use crate::record::{SourceType, StepView, TableEntity, TestCase};
use crate::step::{Category, ClassifiedStep};
use crate::utils::filter_short_name;

/// Sub-type tag shared by loop roots and loop branches
pub const LOOP_TAG: &str = "3DA58CF0-4FEF-11DC-BE56-0013728784EE";

/// Sub-type prefix of calculation steps
pub const CALCULATION_TAG: &str = "4115FA00-5F3C-11DF-8A53-001C233B3528:";

/// Sub-type of plot steps
pub const IMAGE_TAG: &str = "IMAGE";

pub const BLOCK_TAGS: [&str; 3] = [":BLOCK", ":PRECONDITION", ":POSTCONDITION"];

pub const MULTI_CHECK_TAG: &str = ":MULTI-CHECK";

pub const MULTI_CHECK_LABEL: &str = "Multi-Check";

pub const LOOP_ROOT_DESCRIPTION: &str =
    "Only the first block that resulted in the loop's aggregate result is displayed.";

/// Table cell listing keyword identifiers of a call
pub const KEYWORD_ID_CELL: &str = "keywordId";

/// Table cell holding the expected values of a keyword call
pub const KEYWORD_COMPARE_CELL: &str = "keywordReprCompare";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Loop,
    Plot,
    Block,
    MultiCheck,
    AnalysisJob,
    Calculation,
    SubCaseCall,
    ExternalCall,
}

pub const RULE_ORDER: [Rule; 8] = [
    Rule::Loop,
    Rule::Plot,
    Rule::Block,
    Rule::MultiCheck,
    Rule::AnalysisJob,
    Rule::Calculation,
    Rule::SubCaseCall,
    Rule::ExternalCall,
];

/// Outcome of evaluating one rule against a record
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// The rule does not apply; the next rule is tried
    Decline,
    /// The rule consumed the record without producing a step
    Reject,
    Accept(ClassifiedStep),
    /// A sub-case call step; `expand` requests inlining of the callee's steps
    Call { step: ClassifiedStep, expand: bool },
}

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Loop => "loop",
            Rule::Plot => "plot",
            Rule::Block => "block",
            Rule::MultiCheck => "multi_check",
            Rule::AnalysisJob => "analysis_job",
            Rule::Calculation => "calculation",
            Rule::SubCaseCall => "sub_case_call",
            Rule::ExternalCall => "external_call",
        }
    }

    pub fn evaluate(&self, view: &StepView<'_>, ctx: &mut CaseContext<'_>) -> RuleOutcome {
        match self {
            Rule::Loop => evaluate_loop(view, ctx),
            Rule::Plot => evaluate_plot(view, ctx),
            Rule::Block => evaluate_block(view),
            Rule::MultiCheck => evaluate_multi_check(view),
            Rule::AnalysisJob => evaluate_analysis_job(view, ctx),
            Rule::Calculation => evaluate_calculation(view, ctx),
            Rule::SubCaseCall => evaluate_sub_case_call(view, ctx),
            Rule::ExternalCall => evaluate_external_call(view),
        }
    }
}

/// Run the rule chain; a record no rule claims is declined
pub fn classify(view: &StepView<'_>, ctx: &mut CaseContext<'_>) -> RuleOutcome {
    for rule in RULE_ORDER {
        let outcome = rule.evaluate(view, ctx);
        if outcome != RuleOutcome::Decline {
            crate::log_debug!(
                "Record classified",
                "rule" => rule.name(),
                "step" => view.step_id(),
                "depth" => view.depth()
            );
            return outcome;
        }
    }
    RuleOutcome::Decline
}

fn base_step(view: &StepView<'_>, label: &str) -> ClassifiedStep {
    ClassifiedStep::new(view.step_id(), label, view.verdict())
}

fn is_utility(view: &StepView<'_>) -> bool {
    view.source_type() == SourceType::Utility
}

pub fn is_loop_marker(view: &StepView<'_>) -> bool {
    is_utility(view) && view.cmp_sub_type().contains(LOOP_TAG)
}

fn evaluate_loop(view: &StepView<'_>, ctx: &mut CaseContext<'_>) -> RuleOutcome {
    let depth = view.depth();
    let marker = is_loop_marker(view);

    match ctx.loop_run.state() {
        LoopState::BranchActive { branch_depth, .. } => {
            if depth > branch_depth {
                // Inside the selected branch; later rules classify its steps
                return RuleOutcome::Decline;
            }
            ctx.loop_run.reset();
            if depth == branch_depth {
                // Sibling branch: prune it and the branches after it
                ctx.gate.set(branch_depth - 1);
                crate::log_debug!("Loop branch ended, sibling pruned", "depth" => depth);
                return RuleOutcome::Reject;
            }
            // Left the loop; a gate set for this record by a conditional stays in place
        }
        LoopState::Active { root_depth, .. } if !marker && depth <= root_depth => {
            // Loop without a matching branch
            ctx.loop_run.reset();
        }
        _ => {}
    }

    if !marker {
        return RuleOutcome::Decline;
    }

    let step = base_step(view, view.activity());
    match ctx.loop_run.state() {
        LoopState::Idle => {
            ctx.loop_run.start(view.verdict(), depth);
            RuleOutcome::Accept(step.with_description(LOOP_ROOT_DESCRIPTION))
        }
        LoopState::Active { .. } => {
            if ctx.loop_run.try_begin_branch(view.verdict(), depth) {
                ctx.gate.reset();
                crate::log_debug!("Loop branch selected", "step" => step.id, "depth" => depth);
                RuleOutcome::Accept(step)
            } else {
                ctx.gate.set(depth);
                crate::log_debug!("Loop branch pruned", "step" => step.id, "depth" => depth);
                RuleOutcome::Reject
            }
        }
        LoopState::BranchActive { .. } => RuleOutcome::Decline,
    }
}

fn evaluate_plot(view: &StepView<'_>, ctx: &mut CaseContext<'_>) -> RuleOutcome {
    if view.source_type() != SourceType::Undefined || view.cmp_sub_type() != IMAGE_TAG {
        return RuleOutcome::Decline;
    }

    let mut step = base_step(view, view.activity()).with_expected_result(view.info());
    let images = view.image_files();
    if !images.is_empty() {
        ctx.add_images(&step.id, images);
        step = step.with_category(Category::TraceAnalysisPlot);
    }
    RuleOutcome::Accept(step)
}

fn evaluate_block(view: &StepView<'_>) -> RuleOutcome {
    let sub_type = view.cmp_sub_type();
    if !is_utility(view) || !BLOCK_TAGS.iter().any(|tag| sub_type.contains(tag)) {
        return RuleOutcome::Decline;
    }
    RuleOutcome::Accept(base_step(view, view.activity()).with_expected_result(view.info()))
}

fn evaluate_multi_check(view: &StepView<'_>) -> RuleOutcome {
    if !is_utility(view) || !view.cmp_sub_type().contains(MULTI_CHECK_TAG) {
        return RuleOutcome::Decline;
    }
    RuleOutcome::Accept(base_step(view, MULTI_CHECK_LABEL).with_expected_result(view.info()))
}

fn evaluate_analysis_job(view: &StepView<'_>, ctx: &mut CaseContext<'_>) -> RuleOutcome {
    if !is_utility(view)
        || view.name().to_uppercase() != ctx.localization.analysis_job.to_uppercase()
    {
        return RuleOutcome::Decline;
    }

    // Repeated calls of a parameterized case report the same job id
    let info = view.info().unwrap_or_default();
    let base = format!("traceanalyse_{}", filter_short_name(info));
    let id = ctx.unique_analysis_job_id(&base);

    RuleOutcome::Accept(
        ClassifiedStep::new(id, info, view.verdict()).with_category(Category::TraceAnalysis),
    )
}

fn evaluate_calculation(view: &StepView<'_>, ctx: &mut CaseContext<'_>) -> RuleOutcome {
    if !ctx.config.captures_calculation()
        || !is_utility(view)
        || !view.cmp_sub_type().contains(CALCULATION_TAG)
    {
        return RuleOutcome::Decline;
    }

    let label = format!("{}: {}", ctx.localization.calculation, view.label());
    let mut step = base_step(view, &label).with_expected_result(view.target_value());
    if let Some(info) = view.info() {
        step = step.with_description(format!("{}: {}", ctx.localization.value, info));
    }
    RuleOutcome::Accept(step)
}

fn evaluate_sub_case_call(view: &StepView<'_>, ctx: &mut CaseContext<'_>) -> RuleOutcome {
    let source_type = view.source_type();
    if !source_type.is_package_call() {
        return RuleOutcome::Decline;
    }

    let mut step = base_step(view, view.name()).with_category(Category::SubPackage);
    let callee = view.callee();

    ctx.identifiers.extend(keyword_ids(view.entities()));

    let expected = expected_values(view.entities(), ctx.localization.expected_marker)
        .or_else(|| callee.and_then(parameter_summary));
    step = step.with_expected_result(expected.as_deref());

    let Some(callee) = callee else {
        crate::log_warning!(
            codes::process::MISSING_CALLEE,
            "Sub-case call without callee, not expanded",
            "step" => step.id,
            "case" => ctx.ref_path
        );
        return RuleOutcome::Call {
            step,
            expand: false,
        };
    };

    if callee.is_pass_through() {
        return RuleOutcome::Call {
            step,
            expand: false,
        };
    }
    ctx.sub_cases.push(callee.clone());

    let on_verdict =
        source_type == SourceType::Package && ctx.config.expands_on_verdict(step.verdict);
    let expand = on_verdict || view.has_deep_revaluation();

    RuleOutcome::Call { step, expand }
}

fn evaluate_external_call(view: &StepView<'_>) -> RuleOutcome {
    if view.source_type() != SourceType::Call {
        return RuleOutcome::Decline;
    }
    RuleOutcome::Accept(base_step(view, view.name()).with_category(Category::Axs))
}

/// Identifiers from the first row of every keyword id cell
fn keyword_ids(entities: &[TableEntity]) -> impl Iterator<Item = String> + '_ {
    entities
        .iter()
        .filter(|entity| entity.is_table_cell(KEYWORD_ID_CELL))
        .filter_map(TableEntity::first_row)
        .flat_map(|row| row.iter().cloned())
}

/// Expected values from the first row of a keyword comparison cell.
///
/// The row looks like `["SOLL:", "<signal>", "<value>", ...]`; the cells after the
/// signal are joined with spaces.
fn expected_values(entities: &[TableEntity], marker: &str) -> Option<String> {
    entities
        .iter()
        .filter(|entity| entity.is_table_cell(KEYWORD_COMPARE_CELL))
        .filter_map(TableEntity::first_row)
        .find_map(|row| {
            (row.len() > 2 && row.iter().any(|cell| cell == marker)).then(|| row[2..].join(" "))
        })
}

/// Callee parameters as `(a=1, b=2)`
fn parameter_summary(callee: &TestCase) -> Option<String> {
    if callee.parameters.is_empty() {
        return None;
    }
    let pairs: Vec<String> = callee
        .parameters
        .iter()
        .map(|param| format!("{}={}", param.name, param.value))
        .collect();
    Some(format!("({})", pairs.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConversionConfig, Language, SpecialTestStep};
    use crate::record::{StepRecord, Verdict};

    fn utility(id: &str, depth: i32, sub_type: &str) -> StepRecord {
        StepRecord::new(id, depth)
            .with_src_type("UTILITY")
            .with_src_sub_type(sub_type)
    }

    /// Settings independent of `STEPTREE_*` variables in the environment
    fn config() -> ConversionConfig {
        ConversionConfig::default()
            .with_include_test_steps(true)
            .with_special_test_steps(Vec::new())
            .with_sub_case_verdicts(Vec::new())
            .with_language(Language::De)
            .with_max_sub_case_depth(64)
    }

    fn run(record: &StepRecord, config: &ConversionConfig) -> RuleOutcome {
        let mut ctx = CaseContext::new(config, "pkg");
        classify(&StepView::new(record), &mut ctx)
    }

    fn accepted(outcome: RuleOutcome) -> ClassifiedStep {
        match outcome {
            RuleOutcome::Accept(step) | RuleOutcome::Call { step, .. } => step,
            other => panic!("expected a step, got {:?}", other),
        }
    }

    #[test]
    fn test_main_loop_step() {
        let record = utility("SrcId", 0, "3DA58CF0-4FEF-11DC-BE56-0013728784EE:LOOP")
            .with_name("Schleife")
            .with_activity("For loopCounter=1 to 5")
            .with_info("")
            .with_target_value("")
            .with_original_result("FAILED");

        let step = accepted(run(&record, &config()));
        assert_eq!(step.id, "SrcId");
        assert_eq!(step.label, "For loopCounter=1 to 5");
        assert_eq!(step.verdict, Some(Verdict::Failed));
        assert_eq!(step.description.as_deref(), Some(LOOP_ROOT_DESCRIPTION));
        assert_eq!(step.category, None);
        assert_eq!(step.expected_result, None);
    }

    #[test]
    fn test_calculation_step() {
        let config = config()
            .with_language(Language::De)
            .with_special_test_steps(vec![SpecialTestStep::Calculation]);
        let record = utility("SrcId", 0, "4115FA00-5F3C-11DF-8A53-001C233B3528:Berechnung")
            .with_target_value("Erwartungwert")
            .with_info("Aktueller Wert")
            .with_original_result("FAILED");

        let step = accepted(run(&record, &config));
        assert_eq!(step.label, "Berechnung: ");
        assert_eq!(step.description.as_deref(), Some("Wert: Aktueller Wert"));
        assert_eq!(step.expected_result.as_deref(), Some("Erwartungwert"));
        assert_eq!(step.category, None);
    }

    #[test]
    fn test_calculation_requires_opt_in() {
        let config = config().with_special_test_steps(Vec::new());
        let record = utility("SrcId", 0, "4115FA00-5F3C-11DF-8A53-001C233B3528:Berechnung");
        assert_eq!(run(&record, &config), RuleOutcome::Decline);
    }

    #[test]
    fn test_calculation_in_english() {
        let config = config()
            .with_language(Language::En)
            .with_special_test_steps(vec![SpecialTestStep::Calculation]);
        let record = utility("c", 0, "4115fa00-5f3c-11df-8a53-001c233b3528:calc")
            .with_label("speed")
            .with_info("12");

        let step = accepted(run(&record, &config));
        assert_eq!(step.label, "Calculation: speed");
        assert_eq!(step.description.as_deref(), Some("Value: 12"));
    }

    #[test]
    fn test_block_family() {
        let config = config();
        for sub_type in ["007:BLOCK", "x:precondition", "x:PostCondition"] {
            let record = utility("b", 1, sub_type)
                .with_activity("Block")
                .with_info("expect");
            let step = accepted(run(&record, &config));
            assert_eq!(step.label, "Block");
            assert_eq!(step.expected_result.as_deref(), Some("expect"));
        }
    }

    #[test]
    fn test_multi_check_forces_label() {
        let record = utility("m", 1, "abc:MULTI-CHECK").with_activity("something else");
        let step = accepted(run(&record, &config()));
        assert_eq!(step.label, MULTI_CHECK_LABEL);
        assert_eq!(step.expected_result, None);
    }

    #[test]
    fn test_plot_step_with_images() {
        let config = config();
        let mut ctx = CaseContext::new(&config, "pkg");
        let record = StepRecord::new("plot.1", 1)
            .with_src_type("UNDEFINED")
            .with_src_sub_type("image")
            .with_activity("Plot")
            .with_info("limits")
            .with_image_file("plot_1.png");

        let step = accepted(classify(&StepView::new(&record), &mut ctx));
        assert_eq!(step.id, "plot_1");
        assert_eq!(step.category, Some(Category::TraceAnalysisPlot));
        assert_eq!(step.expected_result.as_deref(), Some("limits"));
        assert_eq!(ctx.images["plot_1"], vec!["plot_1.png"]);
    }

    #[test]
    fn test_plot_step_without_images_has_no_category() {
        let record = StepRecord::new("p", 1)
            .with_src_type("UNDEFINED")
            .with_src_sub_type("IMAGE");
        let step = accepted(run(&record, &config()));
        assert_eq!(step.category, None);

        let other = StepRecord::new("p", 1)
            .with_src_type("UNDEFINED")
            .with_src_sub_type("TEXT");
        assert_eq!(run(&other, &config()), RuleOutcome::Decline);
    }

    #[test]
    fn test_analysis_job() {
        let config = config();
        let mut ctx = CaseContext::new(&config, "pkg");
        let record = StepRecord::new("ignored", 1)
            .with_src_type("UTILITY")
            .with_name("analyse-job")
            .with_info("Job A.1")
            .with_original_result("SUCCESS");

        let step = accepted(classify(&StepView::new(&record), &mut ctx));
        assert_eq!(step.id, "traceanalyse_Job_A_1");
        assert_eq!(step.label, "Job A.1");
        assert_eq!(step.category, Some(Category::TraceAnalysis));
        assert_eq!(step.verdict, Some(Verdict::Passed));
    }

    #[test]
    fn test_external_call() {
        let record = StepRecord::new("axs", 1)
            .with_src_type("CALL")
            .with_name("Tool call");
        let step = accepted(run(&record, &config()));
        assert_eq!(step.label, "Tool call");
        assert_eq!(step.category, Some(Category::Axs));
    }

    #[test]
    fn test_unknown_source_type_is_declined() {
        let config = config();
        let mut ctx = CaseContext::new(&config, "pkg");
        let record = StepRecord::new("x", 0)
            .with_src_type("UNKNOWN_X")
            .with_src_sub_type("NOTHING");

        assert_eq!(
            classify(&StepView::new(&record), &mut ctx),
            RuleOutcome::Decline
        );
        assert!(ctx.loop_run.is_idle());
        assert!(!ctx.gate.is_active());
        assert!(ctx.images.is_empty() && ctx.sub_cases.is_empty());
    }

    #[test]
    fn test_loop_tag_wins_over_block_tag() {
        let record = utility("both", 0, "3DA58CF0-4FEF-11DC-BE56-0013728784EE:BLOCK")
            .with_activity("For i=1 to 2")
            .with_info("expected");
        let step = accepted(run(&record, &config()));
        assert_eq!(step.description.as_deref(), Some(LOOP_ROOT_DESCRIPTION));
        assert_eq!(step.expected_result, None);

        let block = utility("block", 0, "007:BLOCK")
            .with_name("IfDefault")
            .with_info("expected");
        let step = accepted(run(&block, &config()));
        assert_eq!(step.expected_result.as_deref(), Some("expected"));
    }

    #[test]
    fn test_sub_case_call_expected_values() {
        let config = config();
        let mut ctx = CaseContext::new(&config, "pkg");
        let row = |cells: &[&str]| cells.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        let record = StepRecord::new("call", 1)
            .with_src_type("PACKAGE")
            .with_name("SWK Status")
            .with_original_result("FAILED")
            .with_entity(TableEntity::table_cell(
                KEYWORD_ID_CELL,
                vec![row(&["2660", "2661"]), row(&["ignored"])],
            ))
            .with_entity(TableEntity::table_cell(
                KEYWORD_COMPARE_CELL,
                vec![row(&["SOLL:", "Abbiegelicht", "'beidseitig'", "'aus'"])],
            ))
            .with_callee(TestCase::new("pkg/swk.pkg").with_parameter("a", "1"));

        let step = accepted(classify(&StepView::new(&record), &mut ctx));
        assert_eq!(step.label, "SWK Status");
        assert_eq!(step.category, Some(Category::SubPackage));
        assert_eq!(step.expected_result.as_deref(), Some("'beidseitig' 'aus'"));
        assert_eq!(
            ctx.identifiers.iter().cloned().collect::<Vec<_>>(),
            vec!["2660", "2661"]
        );
        assert_eq!(ctx.sub_cases.len(), 1);
    }

    #[test]
    fn test_sub_case_call_parameter_summary() {
        let config = config();
        let record = StepRecord::new("call", 1)
            .with_src_type("PACKAGE")
            .with_entity(TableEntity::table_cell(
                KEYWORD_COMPARE_CELL,
                vec![vec!["IST:".to_string(), "a".to_string(), "b".to_string()]],
            ))
            .with_callee(
                TestCase::new("pkg/inner.pkg")
                    .with_parameter("a", "1")
                    .with_parameter("b", "2"),
            );

        let step = accepted(run(&record, &config));
        assert_eq!(step.expected_result.as_deref(), Some("(a=1, b=2)"));
    }

    #[test]
    fn test_pass_through_call_is_not_recorded() {
        let config = config().with_sub_case_verdicts(vec![Verdict::Failed]);
        let mut ctx = CaseContext::new(&config, "pkg");
        let record = StepRecord::new("SrcId", 1)
            .with_src_type("PACKAGE")
            .with_name("SWK Status")
            .with_original_result("FAILED")
            .with_callee(TestCase::new("pkg/swk.pkg").with_activity("SWK -> TA: Licht"));

        let outcome = classify(&StepView::new(&record), &mut ctx);
        match outcome {
            RuleOutcome::Call { step, expand } => {
                assert_eq!(step.id, "SrcId");
                assert_eq!(step.verdict, Some(Verdict::Failed));
                assert!(!expand);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(ctx.sub_cases.is_empty());
    }

    #[test]
    fn test_parallel_call_ignores_verdict_list() {
        let config = config().with_sub_case_verdicts(vec![Verdict::Failed]);
        let record = StepRecord::new("par", 1)
            .with_src_type("PARALLEL_PACKAGE")
            .with_original_result("FAILED")
            .with_callee(TestCase::new("pkg/par.pkg"));

        assert!(matches!(
            run(&record, &config),
            RuleOutcome::Call { expand: false, .. }
        ));

        let revalued = record.clone().with_result("SUCCESS");
        assert!(matches!(
            run(&revalued, &config),
            RuleOutcome::Call { expand: true, .. }
        ));
    }
}
