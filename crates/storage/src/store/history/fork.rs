use super::super::*;
use ht_core::history::HistoryBranch;

impl SqliteStore {
    /// Creates a new branch sharing the source's prefix up to `fork_node_id`
    /// (exclusive). The branch row is written in-progress; the caller appends
    /// its first nodes and then finalizes with [`SqliteStore::complete_fork_branch`].
    pub fn fork_history_branch(
        &mut self,
        request: ForkBranchRequest,
    ) -> Result<ForkBranchResponse, StoreError> {
        if request.fork_node_id < 2 {
            return Err(StoreError::InvalidRequest("cannot fork from the first node"));
        }

        let new_branch = HistoryBranch {
            tree_id: request.fork_branch.tree_id,
            branch_id: request.new_branch_id,
            ancestors: request.fork_branch.fork_ancestors(request.fork_node_id),
        };

        let ancestors = serialize_ancestors(&new_branch.ancestors)?;
        let inserted = insert_branch_row(
            &self.conn,
            &BranchRowInsert {
                tree_id: &new_branch.tree_id,
                branch_id: &new_branch.branch_id,
                in_progress: true,
                created_at_ms: now_ms(),
                ancestors: &ancestors,
                info: &request.info,
            },
        )?;
        if inserted != 1 {
            return Err(StoreError::RowCount {
                table: "history_tree",
                expected: 1,
                actual: inserted,
            });
        }
        Ok(ForkBranchResponse { new_branch })
    }
}
