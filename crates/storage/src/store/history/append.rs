use super::super::*;
use ht_core::history::FIRST_NODE_ID;

impl SqliteStore {
    /// Appends (or overrides, via a larger `txn_id`) one node on the owning
    /// branch. With `is_new_branch` the node and the branch row are written
    /// in one transaction, creating the branch already committed.
    pub fn append_history_nodes(&mut self, request: AppendNodesRequest) -> Result<(), StoreError> {
        if request.node_id < FIRST_NODE_ID {
            return Err(StoreError::InvalidRequest("node_id must be >= 1"));
        }
        if request.txn_id < 0 {
            return Err(StoreError::InvalidRequest("txn_id must be >= 0"));
        }
        if request.events.data.is_empty() {
            return Err(StoreError::InvalidRequest("events data must not be empty"));
        }
        if request.events.encoding.trim().is_empty() {
            return Err(StoreError::InvalidRequest(
                "events encoding must not be empty",
            ));
        }
        if request.node_id < request.branch.begin_node_id() {
            return Err(StoreError::InvalidRequest("cannot append to ancestor nodes"));
        }

        let branch = &request.branch;

        if request.is_new_branch {
            let ancestors = serialize_ancestors(&branch.ancestors)?;
            let now_ms = now_ms();
            let tx = self.conn.transaction()?;
            let inserted = insert_node(
                &tx,
                &branch.tree_id,
                &branch.branch_id,
                request.node_id,
                request.txn_id,
                &request.events,
            )
            .map_err(map_node_insert_conflict)?;
            if inserted != 1 {
                return Err(StoreError::RowCount {
                    table: "history_node",
                    expected: 1,
                    actual: inserted,
                });
            }
            let inserted = insert_branch_row(
                &tx,
                &BranchRowInsert {
                    tree_id: &branch.tree_id,
                    branch_id: &branch.branch_id,
                    in_progress: false,
                    created_at_ms: now_ms,
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
            tx.commit()?;
            return Ok(());
        }

        let inserted = insert_node(
            &self.conn,
            &branch.tree_id,
            &branch.branch_id,
            request.node_id,
            request.txn_id,
            &request.events,
        )
        .map_err(map_node_insert_conflict)?;
        if inserted != 1 {
            return Err(StoreError::RowCount {
                table: "history_node",
                expected: 1,
                actual: inserted,
            });
        }
        Ok(())
    }
}
