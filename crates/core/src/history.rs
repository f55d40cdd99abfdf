#![forbid(unsafe_code)]

use crate::ids::{BranchId, TreeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;


/// Smallest legal event/node id. Node ids below this never exist.
pub const FIRST_NODE_ID: i64 = 1;

/// Upper bound above any real node id, used to mark a branch range as
/// referenced for the whole lifetime of its owner.
pub const LAST_NODE_ID: i64 = i64::MAX;

/// One inherited prefix: the owning branch reads `[begin_node_id,
/// end_node_id)` of `branch_id` instead of storing those nodes itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRange {
    pub branch_id: BranchId,
    pub begin_node_id: i64,
    pub end_node_id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryBranch {
    pub tree_id: TreeId,
    pub branch_id: BranchId,
    pub ancestors: Vec<BranchRange>,
}

impl HistoryBranch {
    /// Smallest node id owned by this branch itself. Nodes below it live on
    /// ancestors.
    pub fn begin_node_id(&self) -> i64 {
        match self.ancestors.last() {
            Some(range) => range.end_node_id,
            None => FIRST_NODE_ID,
        }
    }

    /// Ancestor chain of a branch forked from this one at `fork_node_id`
    /// (exclusive boundary; the first node id the fork does not inherit).
    ///
    /// When the fork point lands at or below our own begin node, the fork
    /// inherits only a prefix of our ancestor chain, with the covering entry
    /// truncated to the fork point. Otherwise it inherits the full chain plus
    /// a trailing entry referencing this branch itself.
    pub fn fork_ancestors(&self, fork_node_id: i64) -> Vec<BranchRange> {
        let begin_node_id = self.begin_node_id();
        if begin_node_id >= fork_node_id {
            let mut ancestors = Vec::with_capacity(self.ancestors.len());
            for range in &self.ancestors {
                if range.end_node_id >= fork_node_id {
                    ancestors.push(BranchRange {
                        branch_id: range.branch_id,
                        begin_node_id: range.begin_node_id,
                        end_node_id: fork_node_id,
                    });
                    break;
                }
                ancestors.push(*range);
            }
            ancestors
        } else {
            let mut ancestors = self.ancestors.clone();
            ancestors.push(BranchRange {
                branch_id: self.branch_id,
                begin_node_id,
                end_node_id: fork_node_id,
            });
            ancestors
        }
    }

    /// Node ranges to reclaim when this branch is deleted: every ancestor
    /// entry plus an unbounded trailing entry for the branch itself, ordered
    /// oldest first.
    pub fn prune_ranges(&self) -> Vec<PruneRange> {
        let mut ranges = Vec::with_capacity(self.ancestors.len() + 1);
        for range in &self.ancestors {
            ranges.push(PruneRange {
                branch_id: range.branch_id,
                begin_node_id: range.begin_node_id,
            });
        }
        ranges.push(PruneRange {
            branch_id: self.branch_id,
            begin_node_id: self.begin_node_id(),
        });
        ranges
    }
}

/// A candidate delete range: all nodes of `branch_id` from `begin_node_id`
/// upward, subject to what surviving branches still reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PruneRange {
    pub branch_id: BranchId,
    pub begin_node_id: i64,
}

/// Highest node id still needed from each branch by the given (surviving)
/// branches. A branch needs its own nodes for its whole lifetime, so every
/// listed branch maps to [`LAST_NODE_ID`]; inherited ranges contribute their
/// `end_node_id`.
pub fn max_referenced_end_nodes<'a>(
    branches: impl IntoIterator<Item = &'a HistoryBranch>,
) -> HashMap<BranchId, i64> {
    let mut max_end: HashMap<BranchId, i64> = HashMap::new();
    for branch in branches {
        max_end.insert(branch.branch_id, LAST_NODE_ID);
        for range in &branch.ancestors {
            let entry = max_end.entry(range.branch_id).or_insert(range.end_node_id);
            if *entry < range.end_node_id {
                *entry = range.end_node_id;
            }
        }
    }
    max_end
}

/// Sanity check applied whenever a chain is deserialized: entries must form
/// contiguous, non-empty ranges starting at [`FIRST_NODE_ID`], and must not
/// reference the owning branch.
pub fn validate_ancestors(
    owner: BranchId,
    ancestors: &[BranchRange],
) -> Result<(), AncestorChainError> {
    let mut expected_begin = FIRST_NODE_ID;
    for (index, range) in ancestors.iter().enumerate() {
        if range.branch_id == owner {
            return Err(AncestorChainError::SelfReference { index });
        }
        if range.end_node_id <= range.begin_node_id {
            return Err(AncestorChainError::EmptyRange { index });
        }
        if range.begin_node_id != expected_begin {
            return Err(AncestorChainError::NotContiguous {
                index,
                expected_begin,
                found_begin: range.begin_node_id,
            });
        }
        expected_begin = range.end_node_id;
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AncestorChainError {
    EmptyRange {
        index: usize,
    },
    NotContiguous {
        index: usize,
        expected_begin: i64,
        found_begin: i64,
    },
    SelfReference {
        index: usize,
    },
}

impl std::fmt::Display for AncestorChainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRange { index } => {
                write!(f, "ancestor range {index} is empty or inverted")
            }
            Self::NotContiguous {
                index,
                expected_begin,
                found_begin,
            } => write!(
                f,
                "ancestor range {index} is not contiguous (expected begin {expected_begin}, found {found_begin})"
            ),
            Self::SelfReference { index } => {
                write!(f, "ancestor range {index} references the owning branch")
            }
        }
    }
}

impl std::error::Error for AncestorChainError {}
