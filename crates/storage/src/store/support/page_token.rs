#![forbid(unsafe_code)]

use super::super::StoreError;

pub(in crate::store) fn encode_page_token(last_node_id: i64) -> Vec<u8> {
    last_node_id.to_string().into_bytes()
}

pub(in crate::store) fn decode_page_token(token: &[u8]) -> Result<i64, StoreError> {
    std::str::from_utf8(token)
        .ok()
        .and_then(|value| value.parse::<i64>().ok())
        .ok_or(StoreError::InvalidRequest("malformed next_page_token"))
}
