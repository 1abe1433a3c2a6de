//! Depth-driven step tree
//!
//! Records carry no parent pointers; the execution depth is the only structural
//! signal. A new step attaches under the most recently inserted node whose depth is
//! lower than its own, found by walking down the rightmost path of the tree.

use crate::logging::codes;
use crate::step::{ClassifiedStep, ExchangeFolder, ExchangeNode, ExchangeTree};
use serde::Serialize;

/// A classified step placed in the tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepNode {
    pub depth: i32,
    pub step: ClassifiedStep,
    pub children: Vec<StepNode>,
}

impl StepNode {
    fn new(depth: i32, step: ClassifiedStep) -> Self {
        Self {
            depth,
            step,
            children: Vec::new(),
        }
    }

    fn to_exchange(&self) -> ExchangeNode {
        let step = self.step.to_exchange();
        if self.children.is_empty() {
            ExchangeNode::Step(step)
        } else {
            ExchangeNode::Folder(ExchangeFolder {
                step,
                children: self.children.iter().map(StepNode::to_exchange).collect(),
            })
        }
    }

    fn write_outline(&self, out: &mut String) {
        out.push_str(&self.step.id);
        if !self.children.is_empty() {
            out.push('[');
            write_outline_list(&self.children, out);
            out.push(']');
        }
    }
}

/// Root of a case's step tree.
///
/// The root sits at a virtual depth one less than the first accepted record and is
/// labelled with the case's reference path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepTree {
    label: String,
    depth: i32,
    children: Vec<StepNode>,
}

impl StepTree {
    pub fn new(label: &str, depth: i32) -> Self {
        Self {
            label: label.to_string(),
            depth,
            children: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn children(&self) -> &[StepNode] {
        &self.children
    }

    /// Attach a step at the given depth.
    ///
    /// Well-formed streams attach under the nearest shallower node. A depth jump of more
    /// than one level attaches under the deepest node on the current path; a depth at or
    /// above the root attaches directly under the root, one level below it. Both are
    /// logged as warnings.
    pub fn insert(&mut self, depth: i32, step: ClassifiedStep) {
        let mut parent_depth = self.depth;
        let mut siblings = &mut self.children;

        loop {
            let index = match siblings.last() {
                Some(last) if last.depth < depth => siblings.len() - 1,
                _ => break,
            };
            parent_depth = siblings[index].depth;
            siblings = &mut siblings[index].children;
        }

        let depth = if depth <= parent_depth {
            crate::log_warning!(
                codes::tree::DEPTH_ABOVE_ROOT,
                "Step lies at or above the tree root, attached under the root",
                "step" => step.id,
                "depth" => depth,
                "root_depth" => self.depth
            );
            parent_depth + 1
        } else {
            if depth > parent_depth + 1 {
                crate::log_warning!(
                    codes::tree::DEPTH_JUMP_SALVAGED,
                    "Depth jump without intermediate step, attached to deepest ancestor",
                    "step" => step.id,
                    "depth" => depth,
                    "parent_depth" => parent_depth
                );
            }
            depth
        };

        siblings.push(StepNode::new(depth, step));
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of steps in the tree, root excluded
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Pre-order traversal of all steps
    pub fn iter(&self) -> impl Iterator<Item = &StepNode> {
        let mut stack: Vec<&StepNode> = self.children.iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    pub fn find(&self, id: &str) -> Option<&StepNode> {
        self.iter().find(|node| node.step.id == id)
    }

    /// Compact bracket notation of the step ids, e.g. `root[branch[block]], next`
    pub fn outline(&self) -> String {
        let mut out = String::new();
        write_outline_list(&self.children, &mut out);
        out
    }

    pub fn to_exchange(&self) -> ExchangeTree {
        ExchangeTree {
            short_name: self.label.clone(),
            steps: self.children.iter().map(StepNode::to_exchange).collect(),
        }
    }
}

fn write_outline_list(nodes: &[StepNode], out: &mut String) {
    for (index, node) in nodes.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        node.write_outline(out);
    }
}
