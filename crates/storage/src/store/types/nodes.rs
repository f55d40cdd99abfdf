#![forbid(unsafe_code)]

use ht_core::history::HistoryBranch;
use ht_core::ids::{BranchId, TreeId};

/// Opaque batch of serialized events. The engine never decodes `data`;
/// `encoding` names the codec for the layer above.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventsBlob {
    pub data: Vec<u8>,
    pub encoding: String,
}

#[derive(Clone, Debug)]
pub struct AppendNodesRequest {
    pub branch: HistoryBranch,
    pub node_id: i64,
    pub txn_id: i64,
    pub events: EventsBlob,
    pub is_new_branch: bool,
    pub info: String,
}

#[derive(Clone, Debug)]
pub struct ReadBranchRequest {
    pub tree_id: TreeId,
    pub branch_id: BranchId,
    /// Inclusive lower bound; overridden by a non-empty `next_page_token`.
    pub min_node_id: i64,
    /// Exclusive upper bound.
    pub max_node_id: i64,
    pub page_size: usize,
    pub next_page_token: Option<Vec<u8>>,
}

#[derive(Clone, Debug, Default)]
pub struct ReadBranchResponse {
    pub events: Vec<EventsBlob>,
    pub next_page_token: Option<Vec<u8>>,
}
