#![forbid(unsafe_code)]

use ht_core::history::{BranchRange, validate_ancestors};
use ht_core::ids::BranchId;

use super::super::StoreError;

pub(in crate::store) fn serialize_ancestors(
    ancestors: &[BranchRange],
) -> Result<String, StoreError> {
    Ok(serde_json::to_string(ancestors)?)
}

pub(in crate::store) fn deserialize_ancestors(
    owner: BranchId,
    raw: &str,
) -> Result<Vec<BranchRange>, StoreError> {
    let ancestors: Vec<BranchRange> = serde_json::from_str(raw)?;
    validate_ancestors(owner, &ancestors)?;
    Ok(ancestors)
}
