//! Wire types for the node's pub/sub RPC.
//!
//! A `chain_subscribeNewHeads` subscription delivers notifications of
//! the form:
//!
//! ```json
//! {"jsonrpc":"2.0","method":"chain_newHead",
//!  "params":{"subscription":"...","result":{"number":"0x1a2b",...}}}
//! ```
//!
//! Block numbers arrive hex-encoded and are rendered as decimal
//! strings for use as sequence markers.

use serde::Deserialize;

use crate::chain::ChainError;

pub const SUBSCRIBE_METHOD: &str = "chain_subscribeNewHeads";
pub const NEW_HEAD_METHOD: &str = "chain_newHead";

/// Inbound frame. Subscription acknowledgements carry no `method`;
/// unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct RpcMessage {
    pub method: Option<String>,
    pub params: Option<RpcParams>,
}

#[derive(Debug, Deserialize)]
pub struct RpcParams {
    pub result: Option<BlockHeader>,
}

#[derive(Debug, Deserialize)]
pub struct BlockHeader {
    /// Hex-encoded block number, e.g. `"0x64"`.
    pub number: String,
}

/// Extracts the decimal block number from one inbound frame.
///
/// Returns `Ok(None)` for frames that are not new-head notifications
/// (subscription acks, unrelated methods); those are normal traffic,
/// not errors.
pub fn parse_new_head(raw: &str) -> Result<Option<String>, ChainError> {
    let msg: RpcMessage = serde_json::from_str(raw)?;

    if msg.method.as_deref() != Some(NEW_HEAD_METHOD) {
        return Ok(None);
    }

    let header = msg
        .params
        .and_then(|p| p.result)
        .ok_or_else(|| ChainError::BadHeader("notification without header".into()))?;

    let hex = header.number.trim_start_matches("0x");
    let number = u64::from_str_radix(hex, 16)
        .map_err(|_| ChainError::BadHeader(format!("non-hex block number: {}", header.number)))?;

    Ok(Some(number.to_string()))
}
