//! Dynamic global properties and the reference block derived from them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::rpc::{RpcClient, RpcError};
use crate::config::TIMESTAMP_FORMAT;

pub const GLOBAL_PROPERTIES_METHOD: &str = "database_api.get_dynamic_global_properties";

/// The subset of `get_dynamic_global_properties` a transaction needs. All
/// other fields are kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalProperties {
    pub head_block_number: u32,
    /// Hex block id. Bytes 0..4 repeat the block number; 4..8 are the
    /// reference prefix.
    pub head_block_id: String,
    /// Head block time, `YYYY-MM-DDTHH:MM:SS`.
    pub time: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GlobalProperties {
    /// `(ref_block_num, ref_block_prefix)` for a transaction referencing the
    /// head block.
    pub fn reference_block(&self) -> Result<(u16, u32), RpcError> {
        let id = hex::decode(&self.head_block_id)
            .map_err(|e| RpcError::Malformed(format!("head_block_id: {e}")))?;
        let prefix: [u8; 4] = id
            .get(4..8)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| {
                RpcError::Malformed(format!("head_block_id is only {} bytes", id.len()))
            })?;
        Ok((
            (self.head_block_number & 0xFFFF) as u16,
            u32::from_le_bytes(prefix),
        ))
    }

    pub fn head_time(&self) -> Result<NaiveDateTime, RpcError> {
        let trimmed = self.time.strip_suffix('Z').unwrap_or(&self.time);
        NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT)
            .map_err(|e| RpcError::Malformed(format!("time {:?}: {e}", self.time)))
    }
}

/// Fetches the node's dynamic global properties.
pub async fn get_global_properties(client: &RpcClient) -> Result<GlobalProperties, RpcError> {
    let response = client
        .call(GLOBAL_PROPERTIES_METHOD, json!({}), None)
        .await?;
    let result = response
        .result
        .ok_or_else(|| RpcError::BadResponse("Bad response @ global props".into()))?;
    if result.is_null() {
        return Err(RpcError::BadResponse(
            "Couldn't resolve global properties".into(),
        ));
    }
    serde_json::from_value(result).map_err(|e| RpcError::Malformed(e.to_string()))
}
