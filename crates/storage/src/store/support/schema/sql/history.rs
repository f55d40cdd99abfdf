#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS history_node (
          tree_id TEXT NOT NULL,
          branch_id TEXT NOT NULL,
          node_id INTEGER NOT NULL,
          txn_id INTEGER NOT NULL,
          data BLOB NOT NULL,
          data_encoding TEXT NOT NULL,
          PRIMARY KEY (tree_id, branch_id, node_id, txn_id)
        );

        CREATE TABLE IF NOT EXISTS history_tree (
          tree_id TEXT NOT NULL,
          branch_id TEXT NOT NULL,
          in_progress INTEGER NOT NULL,
          created_at_ms INTEGER NOT NULL,
          ancestors TEXT NOT NULL,
          info TEXT NOT NULL,
          PRIMARY KEY (tree_id, branch_id)
        );
"#;
