use super::super::*;
use ht_core::history::HistoryBranch;
use ht_core::ids::TreeId;

impl SqliteStore {
    /// Returns every branch of a tree with its deserialized ancestor chain,
    /// plus the in-progress subset. A tree with no branches yields an empty
    /// snapshot.
    pub fn get_history_tree(&self, tree_id: &TreeId) -> Result<HistoryTreeSnapshot, StoreError> {
        let rows = select_branch_rows(&self.conn, tree_id)?;
        let mut snapshot = HistoryTreeSnapshot::default();
        for row in rows {
            if row.in_progress {
                snapshot.forking_in_progress.push(ForkingBranch {
                    branch_id: row.branch_id,
                    fork_time_ms: row.created_at_ms,
                    info: row.info.clone(),
                });
            }
            let ancestors = deserialize_ancestors(row.branch_id, &row.ancestors)?;
            snapshot.branches.push(HistoryBranch {
                tree_id: *tree_id,
                branch_id: row.branch_id,
                ancestors,
            });
        }
        Ok(snapshot)
    }
}
