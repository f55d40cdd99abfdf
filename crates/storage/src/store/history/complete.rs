use super::super::*;
use ht_core::history::FIRST_NODE_ID;

impl SqliteStore {
    /// Finalizes a fork: `success` clears the in-progress flag; otherwise the
    /// branch row and all of its nodes are removed in one transaction.
    pub fn complete_fork_branch(&mut self, request: CompleteForkRequest) -> Result<(), StoreError> {
        let branch = &request.branch;

        if request.success {
            let updated = update_branch_row(&self.conn, &branch.tree_id, &branch.branch_id)?;
            if updated != 1 {
                return Err(StoreError::RowCount {
                    table: "history_tree",
                    expected: 1,
                    actual: updated,
                });
            }
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        delete_nodes_from(&tx, &branch.tree_id, &branch.branch_id, FIRST_NODE_ID)?;
        let deleted = delete_branch_row(&tx, &branch.tree_id, &branch.branch_id)?;
        if deleted != 1 {
            return Err(StoreError::RowCount {
                table: "history_tree",
                expected: 1,
                actual: deleted,
            });
        }
        tx.commit()?;
        Ok(())
    }
}
