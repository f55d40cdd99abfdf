use super::super::*;
use ht_core::history::FIRST_NODE_ID;

impl SqliteStore {
    /// Reads one page of node blobs for a single branch id, deduplicating
    /// replayed writes (largest `txn_id` wins per node id). Reconstructing a
    /// full logical history is the caller's ancestor walk, one read per
    /// ancestor segment.
    pub fn read_history_branch(
        &self,
        request: ReadBranchRequest,
    ) -> Result<ReadBranchResponse, StoreError> {
        if request.page_size == 0 {
            return Err(StoreError::InvalidRequest("page_size must be >= 1"));
        }
        if request.min_node_id < FIRST_NODE_ID {
            return Err(StoreError::InvalidRequest("min_node_id must be >= 1"));
        }
        if request.max_node_id <= request.min_node_id {
            return Err(StoreError::InvalidRequest(
                "max_node_id must be greater than min_node_id",
            ));
        }

        let mut min_node_id = request.min_node_id;
        if let Some(token) = request.next_page_token.as_deref()
            && !token.is_empty()
        {
            let last_node_id = decode_page_token(token)?;
            min_node_id = last_node_id + 1;
        }

        let rows = select_nodes(
            &self.conn,
            &request.tree_id,
            &request.branch_id,
            min_node_id,
            request.max_node_id,
            request.page_size,
        )?;
        if rows.is_empty() {
            return Ok(ReadBranchResponse::default());
        }
        let full_page = rows.len() >= request.page_size;

        let mut events = Vec::with_capacity(rows.len());
        let mut last_node_id = -1i64;
        let mut last_txn_id = -1i64;
        for row in rows {
            if row.node_id < last_node_id {
                return Err(StoreError::Corrupted {
                    detail: format!("node_id decreased within a page at {}", row.node_id),
                });
            }
            if row.node_id == last_node_id {
                if row.txn_id < last_txn_id {
                    // Stale write at this node id, superseded by a larger txn_id.
                    continue;
                }
                return Err(StoreError::Corrupted {
                    detail: format!(
                        "txn_id did not decrease within node_id {} group",
                        row.node_id
                    ),
                });
            }
            last_node_id = row.node_id;
            last_txn_id = row.txn_id;
            events.push(EventsBlob {
                data: row.data,
                encoding: row.data_encoding,
            });
        }

        let next_page_token = if full_page {
            Some(encode_page_token(last_node_id))
        } else {
            None
        };
        Ok(ReadBranchResponse {
            events,
            next_page_token,
        })
    }
}
