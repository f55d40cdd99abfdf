#![forbid(unsafe_code)]

use ht_core::history::{BranchRange, HistoryBranch, LAST_NODE_ID};
use ht_core::ids::{BranchId, TreeId};
use ht_storage::{
    AppendNodesRequest, CompleteForkRequest, EventsBlob, ForkBranchRequest, ReadBranchRequest,
    SqliteStore, StoreError,
};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("ht_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn blob(data: &str) -> EventsBlob {
    EventsBlob {
        data: data.as_bytes().to_vec(),
        encoding: "json".to_string(),
    }
}

fn append(
    store: &mut SqliteStore,
    branch: &HistoryBranch,
    node_id: i64,
    txn_id: i64,
    data: &str,
    is_new_branch: bool,
) -> Result<(), StoreError> {
    store.append_history_nodes(AppendNodesRequest {
        branch: branch.clone(),
        node_id,
        txn_id,
        events: blob(data),
        is_new_branch,
        info: String::new(),
    })
}

fn read_range(
    store: &SqliteStore,
    tree_id: TreeId,
    branch_id: BranchId,
    min_node_id: i64,
    max_node_id: i64,
) -> Vec<String> {
    let mut out = Vec::new();
    let mut token = None;
    loop {
        let response = store
            .read_history_branch(ReadBranchRequest {
                tree_id,
                branch_id,
                min_node_id,
                max_node_id,
                page_size: 100,
                next_page_token: token.take(),
            })
            .expect("read history branch");
        out.extend(
            response
                .events
                .iter()
                .map(|event| String::from_utf8(event.data.clone()).expect("utf8 blob")),
        );
        match response.next_page_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }
    out
}

fn read_logical_history(store: &SqliteStore, branch: &HistoryBranch) -> Vec<String> {
    let mut out = Vec::new();
    for range in &branch.ancestors {
        out.extend(read_range(
            store,
            branch.tree_id,
            range.branch_id,
            range.begin_node_id,
            range.end_node_id,
        ));
    }
    out.extend(read_range(
        store,
        branch.tree_id,
        branch.branch_id,
        branch.begin_node_id(),
        LAST_NODE_ID,
    ));
    out
}

fn root_branch() -> HistoryBranch {
    HistoryBranch {
        tree_id: TreeId::new(),
        branch_id: BranchId::new(),
        ancestors: Vec::new(),
    }
}

fn fork(
    store: &mut SqliteStore,
    source: &HistoryBranch,
    fork_node_id: i64,
) -> Result<HistoryBranch, StoreError> {
    let response = store.fork_history_branch(ForkBranchRequest {
        fork_branch: source.clone(),
        fork_node_id,
        new_branch_id: BranchId::new(),
        info: "reset".to_string(),
    })?;
    Ok(response.new_branch)
}

fn complete(store: &mut SqliteStore, branch: &HistoryBranch, success: bool) {
    store
        .complete_fork_branch(CompleteForkRequest {
            branch: branch.clone(),
            success,
        })
        .expect("complete fork branch");
}

#[test]
fn fork_mid_timeline_diverges() {
    let storage_dir = temp_dir("fork_mid_timeline_diverges");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let b1 = root_branch();

    append(&mut store, &b1, 1, 100, "e1", true).expect("append node 1");
    append(&mut store, &b1, 2, 101, "e2", false).expect("append node 2");
    append(&mut store, &b1, 2, 200, "e2b", false).expect("override node 2");

    let b2 = fork(&mut store, &b1, 2).expect("fork at node 2");
    assert_eq!(
        b2.ancestors,
        vec![BranchRange {
            branch_id: b1.branch_id,
            begin_node_id: 1,
            end_node_id: 2
        }]
    );
    assert_eq!(b2.begin_node_id(), 2);

    complete(&mut store, &b2, true);
    append(&mut store, &b2, 2, 300, "e2-alt", false).expect("append divergent node");

    assert_eq!(read_logical_history(&store, &b2), vec!["e1", "e2-alt"]);
    assert_eq!(read_logical_history(&store, &b1), vec!["e1", "e2b"]);
}

#[test]
fn fork_prefix_matches_source() {
    let storage_dir = temp_dir("fork_prefix_matches_source");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let b1 = root_branch();

    append(&mut store, &b1, 1, 100, "e1", true).expect("append node 1");
    append(&mut store, &b1, 2, 101, "e2", false).expect("append node 2");
    append(&mut store, &b1, 3, 102, "e3", false).expect("append node 3");

    let b2 = fork(&mut store, &b1, 3).expect("fork at node 3");
    complete(&mut store, &b2, true);

    let source_prefix = read_range(&store, b1.tree_id, b1.branch_id, 1, 3);
    let mut fork_prefix = Vec::new();
    for range in &b2.ancestors {
        fork_prefix.extend(read_range(
            &store,
            b2.tree_id,
            range.branch_id,
            range.begin_node_id,
            range.end_node_id,
        ));
    }
    assert_eq!(fork_prefix, source_prefix);
}

#[test]
fn fork_below_begin_inherits_ancestor_prefix_only() {
    let storage_dir = temp_dir("fork_below_begin_inherits_ancestor_prefix_only");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let b1 = root_branch();

    append(&mut store, &b1, 1, 100, "e1", true).expect("append node 1");
    append(&mut store, &b1, 2, 101, "e2", false).expect("append node 2");
    append(&mut store, &b1, 3, 102, "e3", false).expect("append node 3");

    let b2 = fork(&mut store, &b1, 3).expect("fork b2 at node 3");
    complete(&mut store, &b2, true);
    append(&mut store, &b2, 3, 200, "e3-alt", false).expect("append divergent node");

    // Fork point 2 is below b2's begin node, so b3 only inherits part of
    // b1's range and never references b2 itself.
    let b3 = fork(&mut store, &b2, 2).expect("fork b3 at node 2");
    assert_eq!(
        b3.ancestors,
        vec![BranchRange {
            branch_id: b1.branch_id,
            begin_node_id: 1,
            end_node_id: 2
        }]
    );
    complete(&mut store, &b3, true);
    append(&mut store, &b3, 2, 300, "e2-alt", false).expect("append divergent node");

    assert_eq!(read_logical_history(&store, &b3), vec!["e1", "e2-alt"]);
    assert_eq!(read_logical_history(&store, &b2), vec!["e1", "e2", "e3-alt"]);
}

#[test]
fn appends_to_fork_are_invisible_on_source() {
    let storage_dir = temp_dir("appends_to_fork_are_invisible_on_source");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let b1 = root_branch();

    append(&mut store, &b1, 1, 100, "e1", true).expect("append node 1");
    append(&mut store, &b1, 2, 101, "e2", false).expect("append node 2");

    let b2 = fork(&mut store, &b1, 2).expect("fork at node 2");
    complete(&mut store, &b2, true);
    append(&mut store, &b2, 2, 300, "e2-alt", false).expect("append divergent node");
    append(&mut store, &b2, 3, 301, "e3-alt", false).expect("append divergent node");

    assert_eq!(read_logical_history(&store, &b1), vec!["e1", "e2"]);
}

#[test]
fn fork_from_first_node_is_rejected() {
    let storage_dir = temp_dir("fork_from_first_node_is_rejected");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let b1 = root_branch();
    append(&mut store, &b1, 1, 100, "e1", true).expect("append node 1");

    let err = fork(&mut store, &b1, 1).expect_err("fork at node 1 must fail");
    match err {
        StoreError::InvalidRequest(message) => {
            assert_eq!(message, "cannot fork from the first node");
        }
        other => panic!("expected InvalidRequest, got {other:?}"),
    }
}

#[test]
fn append_below_fork_begin_is_rejected() {
    let storage_dir = temp_dir("append_below_fork_begin_is_rejected");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let b1 = root_branch();

    append(&mut store, &b1, 1, 100, "e1", true).expect("append node 1");
    append(&mut store, &b1, 2, 101, "e2", false).expect("append node 2");

    let b2 = fork(&mut store, &b1, 2).expect("fork at node 2");
    complete(&mut store, &b2, true);

    let err =
        append(&mut store, &b2, 1, 300, "e1-alt", false).expect_err("append below begin must fail");
    match err {
        StoreError::InvalidRequest(message) => {
            assert_eq!(message, "cannot append to ancestor nodes");
        }
        other => panic!("expected InvalidRequest, got {other:?}"),
    }
}

#[test]
fn fork_lifecycle_tracks_in_progress_flag() {
    let storage_dir = temp_dir("fork_lifecycle_tracks_in_progress_flag");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let b1 = root_branch();

    append(&mut store, &b1, 1, 100, "e1", true).expect("append node 1");
    append(&mut store, &b1, 2, 101, "e2", false).expect("append node 2");

    let b2 = fork(&mut store, &b1, 2).expect("fork at node 2");
    let snapshot = store.get_history_tree(&b1.tree_id).expect("get tree");
    assert_eq!(snapshot.branches.len(), 2);
    assert_eq!(snapshot.forking_in_progress.len(), 1);
    assert_eq!(snapshot.forking_in_progress[0].branch_id, b2.branch_id);
    assert_eq!(snapshot.forking_in_progress[0].info, "reset");

    complete(&mut store, &b2, true);
    let snapshot = store.get_history_tree(&b1.tree_id).expect("get tree");
    assert_eq!(snapshot.branches.len(), 2);
    assert!(snapshot.forking_in_progress.is_empty());
}

#[test]
fn aborted_fork_removes_branch_and_nodes() {
    let storage_dir = temp_dir("aborted_fork_removes_branch_and_nodes");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let b1 = root_branch();

    append(&mut store, &b1, 1, 100, "e1", true).expect("append node 1");
    append(&mut store, &b1, 2, 101, "e2", false).expect("append node 2");

    let b2 = fork(&mut store, &b1, 2).expect("fork at node 2");
    append(&mut store, &b2, 2, 300, "e2-alt", false).expect("append to forked branch");
    complete(&mut store, &b2, false);

    let snapshot = store.get_history_tree(&b1.tree_id).expect("get tree");
    assert_eq!(snapshot.branches.len(), 1);
    assert_eq!(snapshot.branches[0].branch_id, b1.branch_id);
    assert!(read_range(&store, b2.tree_id, b2.branch_id, 1, 100).is_empty());
    assert_eq!(read_logical_history(&store, &b1), vec!["e1", "e2"]);
}

#[test]
fn completing_unknown_branch_is_row_count_error() {
    let storage_dir = temp_dir("completing_unknown_branch_is_row_count_error");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let ghost = root_branch();

    let err = store
        .complete_fork_branch(CompleteForkRequest {
            branch: ghost.clone(),
            success: true,
        })
        .expect_err("unknown branch must fail");
    match err {
        StoreError::RowCount {
            table,
            expected,
            actual,
        } => {
            assert_eq!(table, "history_tree");
            assert_eq!(expected, 1);
            assert_eq!(actual, 0);
        }
        other => panic!("expected RowCount, got {other:?}"),
    }
    assert_eq!(err.code(), "INTERNAL");
}
