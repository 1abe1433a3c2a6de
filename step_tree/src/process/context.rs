//! Per-case mutable state threaded through classification and sub-case expansion

use super::loop_run::LoopRun;
use super::skip_gate::SkipGate;
use crate::config::{ConversionConfig, Localization};
use crate::record::TestCase;
use crate::step::ClassifiedStep;
use crate::tree::StepTree;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Everything one case conversion reads and mutates.
///
/// A fresh context is created per top-level case; nothing is shared between cases.
#[derive(Debug)]
pub struct CaseContext<'c> {
    pub(crate) config: &'c ConversionConfig,
    pub(crate) localization: &'static Localization,
    pub(crate) ref_path: String,
    pub(crate) gate: SkipGate,
    pub(crate) loop_run: LoopRun,
    pub(crate) tree: Option<StepTree>,
    pub(crate) images: BTreeMap<String, Vec<String>>,
    pub(crate) sub_cases: Vec<TestCase>,
    pub(crate) identifiers: BTreeSet<String>,
    pub(crate) analysis_job_ids: HashSet<String>,
}

impl<'c> CaseContext<'c> {
    pub fn new(config: &'c ConversionConfig, ref_path: &str) -> Self {
        Self {
            config,
            localization: config.language.localization(),
            ref_path: ref_path.to_string(),
            gate: SkipGate::new(),
            loop_run: LoopRun::new(),
            tree: None,
            images: BTreeMap::new(),
            sub_cases: Vec::new(),
            identifiers: BTreeSet::new(),
            analysis_job_ids: HashSet::new(),
        }
    }

    /// Insert a step, creating the root one level above the first step
    pub(crate) fn insert(&mut self, depth: i32, step: ClassifiedStep) {
        let ref_path = &self.ref_path;
        self.tree
            .get_or_insert_with(|| StepTree::new(ref_path, depth - 1))
            .insert(depth, step);
    }

    /// Reserve a unique analysis job id: `base`, then `base_1`, `base_2`, ...
    pub(crate) fn unique_analysis_job_id(&mut self, base: &str) -> String {
        let mut id = base.to_string();
        let mut suffix = 0;
        while self.analysis_job_ids.contains(&id) {
            suffix += 1;
            id = format!("{}_{}", base, suffix);
        }
        self.analysis_job_ids.insert(id.clone());
        id
    }

    pub(crate) fn add_images(&mut self, step_id: &str, files: &[String]) {
        self.images
            .entry(step_id.to_string())
            .or_default()
            .extend(files.iter().cloned());
    }

    pub fn into_converted(self) -> ConvertedCase {
        ConvertedCase {
            ref_path: self.ref_path,
            tree: self.tree,
            images: self.images,
            sub_cases: self.sub_cases,
            identifiers: self.identifiers,
        }
    }
}

/// Result of converting one case
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedCase {
    pub ref_path: String,
    /// `None` when no step was accepted and no call error was reported
    pub tree: Option<StepTree>,
    /// Image files keyed by the id of the step that produced them
    pub images: BTreeMap<String, Vec<String>>,
    /// Called cases to be converted independently
    pub sub_cases: Vec<TestCase>,
    /// Keyword identifiers found on sub-case calls
    pub identifiers: BTreeSet<String>,
}

impl ConvertedCase {
    pub fn is_empty(&self) -> bool {
        self.tree.is_none()
    }

    pub fn step_count(&self) -> usize {
        self.tree.as_ref().map_or(0, StepTree::len)
    }
}
