use super::super::*;
use ht_core::history::{LAST_NODE_ID, max_referenced_end_nodes};

impl SqliteStore {
    /// Removes a branch and reclaims every node range no surviving branch
    /// still references. The caller must already have removed any mutable
    /// pointer to this branch, so no new fork can target it; the engine
    /// additionally refuses while any fork of the tree is in progress.
    pub fn delete_history_branch(&mut self, request: DeleteBranchRequest) -> Result<(), StoreError> {
        let branch = &request.branch;

        // Snapshot taken outside the delete transaction. Safe because the
        // in-progress guard below plus the caller's pointer removal exclude
        // concurrent forks from choosing ranges this delete reclaims.
        let snapshot = self.get_history_tree(&branch.tree_id)?;
        if !snapshot.forking_in_progress.is_empty() {
            return Err(StoreError::ConditionFailed {
                op: "delete_history_branch",
                detail: format!(
                    "{} branch fork(s) in progress",
                    snapshot.forking_in_progress.len()
                ),
            });
        }

        let max_referenced = max_referenced_end_nodes(
            snapshot
                .branches
                .iter()
                .filter(|survivor| survivor.branch_id != branch.branch_id),
        );
        let prune = branch.prune_ranges();

        let tx = self.conn.transaction()?;
        delete_branch_row(&tx, &branch.tree_id, &branch.branch_id)?;

        // Walk tail-first: the most-junior ranges are reclaimed first, and
        // the first range still referenced ends the walk, since everything
        // older than it is referenced as well.
        for range in prune.iter().rev() {
            match max_referenced.get(&range.branch_id) {
                Some(&max_end_node_id) => {
                    if max_end_node_id != LAST_NODE_ID {
                        delete_nodes_from(&tx, &branch.tree_id, &range.branch_id, max_end_node_id)?;
                    }
                    break;
                }
                None => {
                    delete_nodes_from(&tx, &branch.tree_id, &range.branch_id, range.begin_node_id)?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}
