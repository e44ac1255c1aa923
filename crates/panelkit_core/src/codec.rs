//! Reference JSON codec for update batches
//!
//! The byte transport between host and screen lives outside this crate; these
//! helpers only turn a batch into bytes and back.

use crate::error::Result;
use crate::sync::UpdateBatch;

pub fn encode_batch(batch: &UpdateBatch) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(batch)?)
}

pub fn decode_batch(bytes: &[u8]) -> Result<UpdateBatch> {
    Ok(serde_json::from_slice(bytes)?)
}
