#![forbid(unsafe_code)]

use ht_core::ids::{BranchId, TreeId};
use rusqlite::{Connection, ErrorCode, params};

use super::super::{EventsBlob, StoreError};

pub(in crate::store) struct NodeRow {
    pub node_id: i64,
    pub txn_id: i64,
    pub data: Vec<u8>,
    pub data_encoding: String,
}

pub(in crate::store) struct BranchRowInsert<'a> {
    pub tree_id: &'a TreeId,
    pub branch_id: &'a BranchId,
    pub in_progress: bool,
    pub created_at_ms: i64,
    pub ancestors: &'a str,
    pub info: &'a str,
}

pub(in crate::store) struct BranchRow {
    pub branch_id: BranchId,
    pub in_progress: bool,
    pub created_at_ms: i64,
    pub ancestors: String,
    pub info: String,
}

pub(in crate::store) fn insert_node(
    conn: &Connection,
    tree_id: &TreeId,
    branch_id: &BranchId,
    node_id: i64,
    txn_id: i64,
    events: &EventsBlob,
) -> Result<usize, rusqlite::Error> {
    conn.execute(
        "INSERT INTO history_node(tree_id, branch_id, node_id, txn_id, data, data_encoding) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            tree_id.to_string(),
            branch_id.to_string(),
            node_id,
            txn_id,
            events.data,
            events.encoding
        ],
    )
}

pub(in crate::store) fn select_nodes(
    conn: &Connection,
    tree_id: &TreeId,
    branch_id: &BranchId,
    min_node_id: i64,
    max_node_id: i64,
    page_size: usize,
) -> Result<Vec<NodeRow>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT node_id, txn_id, data, data_encoding FROM history_node \
         WHERE tree_id=?1 AND branch_id=?2 AND node_id>=?3 AND node_id<?4 \
         ORDER BY node_id ASC, txn_id DESC LIMIT ?5",
    )?;
    let rows = stmt.query_map(
        params![
            tree_id.to_string(),
            branch_id.to_string(),
            min_node_id,
            max_node_id,
            to_sqlite_i64(page_size)?
        ],
        |row| {
            Ok(NodeRow {
                node_id: row.get(0)?,
                txn_id: row.get(1)?,
                data: row.get(2)?,
                data_encoding: row.get(3)?,
            })
        },
    )?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub(in crate::store) fn delete_nodes_from(
    conn: &Connection,
    tree_id: &TreeId,
    branch_id: &BranchId,
    min_node_id: i64,
) -> Result<usize, StoreError> {
    Ok(conn.execute(
        "DELETE FROM history_node WHERE tree_id=?1 AND branch_id=?2 AND node_id>=?3",
        params![tree_id.to_string(), branch_id.to_string(), min_node_id],
    )?)
}

pub(in crate::store) fn insert_branch_row(
    conn: &Connection,
    row: &BranchRowInsert<'_>,
) -> Result<usize, rusqlite::Error> {
    conn.execute(
        "INSERT INTO history_tree(tree_id, branch_id, in_progress, created_at_ms, ancestors, info) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            row.tree_id.to_string(),
            row.branch_id.to_string(),
            row.in_progress,
            row.created_at_ms,
            row.ancestors,
            row.info
        ],
    )
}

pub(in crate::store) fn update_branch_row(
    conn: &Connection,
    tree_id: &TreeId,
    branch_id: &BranchId,
) -> Result<usize, StoreError> {
    Ok(conn.execute(
        "UPDATE history_tree SET in_progress=0 WHERE tree_id=?1 AND branch_id=?2",
        params![tree_id.to_string(), branch_id.to_string()],
    )?)
}

pub(in crate::store) fn delete_branch_row(
    conn: &Connection,
    tree_id: &TreeId,
    branch_id: &BranchId,
) -> Result<usize, StoreError> {
    Ok(conn.execute(
        "DELETE FROM history_tree WHERE tree_id=?1 AND branch_id=?2",
        params![tree_id.to_string(), branch_id.to_string()],
    )?)
}

pub(in crate::store) fn select_branch_rows(
    conn: &Connection,
    tree_id: &TreeId,
) -> Result<Vec<BranchRow>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT branch_id, in_progress, created_at_ms, ancestors, info \
         FROM history_tree WHERE tree_id=?1 ORDER BY branch_id ASC",
    )?;
    let rows = stmt.query_map(params![tree_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (branch_id, in_progress, created_at_ms, ancestors, info) = row?;
        let branch_id = BranchId::parse(&branch_id).map_err(|_| StoreError::Corrupted {
            detail: format!("malformed branch_id in history_tree: {branch_id}"),
        })?;
        out.push(BranchRow {
            branch_id,
            in_progress: in_progress != 0,
            created_at_ms,
            ancestors,
            info,
        });
    }
    Ok(out)
}

pub(in crate::store) fn map_node_insert_conflict(err: rusqlite::Error) -> StoreError {
    if is_duplicate_key(&err) {
        return StoreError::ConditionFailed {
            op: "append_history_nodes",
            detail: format!("node row already exists: {err}"),
        };
    }
    StoreError::Sql(err)
}

pub(in crate::store) fn is_duplicate_key(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            code.code == ErrorCode::ConstraintViolation
                || message.as_deref().is_some_and(|value| {
                    value.contains("UNIQUE constraint failed")
                        || value.contains("PRIMARY KEY constraint failed")
                })
        }
        _ => false,
    }
}

pub(in crate::store) fn to_sqlite_i64(value: usize) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::InvalidRequest("value is too large"))
}
