#![forbid(unsafe_code)]

use ht_core::history::HistoryBranch;
use ht_core::ids::BranchId;

#[derive(Clone, Debug)]
pub struct ForkBranchRequest {
    pub fork_branch: HistoryBranch,
    /// Exclusive boundary: the first node id the new branch does not inherit.
    /// Must land on a batch boundary of the source; the engine only enforces
    /// that it is past the first node.
    pub fork_node_id: i64,
    pub new_branch_id: BranchId,
    pub info: String,
}

#[derive(Clone, Debug)]
pub struct ForkBranchResponse {
    pub new_branch: HistoryBranch,
}

#[derive(Clone, Debug)]
pub struct CompleteForkRequest {
    pub branch: HistoryBranch,
    pub success: bool,
}

#[derive(Clone, Debug)]
pub struct DeleteBranchRequest {
    pub branch: HistoryBranch,
}

#[derive(Clone, Debug, Default)]
pub struct HistoryTreeSnapshot {
    /// Every branch of the tree, committed and in-progress alike.
    pub branches: Vec<HistoryBranch>,
    /// The in-progress subset, as seen by operators and the delete guard.
    pub forking_in_progress: Vec<ForkingBranch>,
}

#[derive(Clone, Debug)]
pub struct ForkingBranch {
    pub branch_id: BranchId,
    pub fork_time_ms: i64,
    pub info: String,
}
