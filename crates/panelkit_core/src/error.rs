//! Sync protocol error types

use thiserror::Error;

use crate::sync::ElementId;

/// Errors raised when applying or decoding state updates
#[derive(Error, Debug)]
pub enum SyncError {
    /// An incremental update arrived for an element the screen never saw in
    /// full; the screen must request a resync
    #[error("Incremental update for unknown element {0}")]
    UnknownElement(ElementId),

    /// A batch could not be encoded or decoded
    #[error("State update codec failed: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Result type for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;
