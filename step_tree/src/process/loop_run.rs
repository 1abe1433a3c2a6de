//! Loop aggregation tracker
//!
//! Loops are reported as a root step followed by one branch step per iteration. Only
//! the first branch whose verdict equals the loop's own verdict keeps its sub-steps.
//! Loops do not nest: inside a running branch, loop markers are not tracked.

use crate::record::Verdict;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoopState {
    #[default]
    Idle,
    /// Loop root seen, no branch selected yet
    Active {
        verdict: Option<Verdict>,
        root_depth: i32,
    },
    /// Sub-steps of the selected branch are being captured
    BranchActive {
        verdict: Option<Verdict>,
        branch_depth: i32,
    },
}

#[derive(Debug, Clone, Default)]
pub struct LoopRun {
    state: LoopState,
}

impl LoopRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == LoopState::Idle
    }

    /// Remember the verdict and depth of a loop root
    pub fn start(&mut self, verdict: Option<Verdict>, depth: i32) {
        self.state = LoopState::Active {
            verdict,
            root_depth: depth,
        };
    }

    /// Offer a branch marker; returns true when the branch is selected.
    ///
    /// Only an active loop without a selected branch accepts branches.
    pub fn try_begin_branch(&mut self, verdict: Option<Verdict>, depth: i32) -> bool {
        match self.state {
            LoopState::Active {
                verdict: selected, ..
            } if selected == verdict => {
                self.state = LoopState::BranchActive {
                    verdict: selected,
                    branch_depth: depth,
                };
                true
            }
            _ => false,
        }
    }

    /// Depth at which a running branch ends, if one is running
    pub fn branch_depth(&self) -> Option<i32> {
        match self.state {
            LoopState::BranchActive { branch_depth, .. } => Some(branch_depth),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.state = LoopState::Idle;
    }
}
