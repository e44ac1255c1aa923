//! Geometry and render worker error types

use thiserror::Error;

use crate::heavy::GeometryId;

/// Invalid geometry construction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Width or height below zero
    #[error("Negative geometry dimension {width}x{height}")]
    NegativeDimension { width: f32, height: f32 },

    /// Width or height is NaN or infinite
    #[error("Non-finite geometry dimension {width}x{height}")]
    NonFiniteDimension { width: f32, height: f32 },
}

/// Errors from the async render pipeline
#[derive(Error, Debug)]
pub enum RenderError {
    /// A producer failed to render a frame
    #[error("Producer failed: {0}")]
    Producer(String),

    /// A geometry reattached with a different producer type than its worker
    #[error("Geometry {0} is attached with a different producer type")]
    ProducerMismatch(GeometryId),

    /// The worker pool no longer accepts tasks
    #[error("Render worker pool is shut down")]
    ShutDown,

    /// A worker thread could not be started
    #[error("Failed to spawn render worker: {0}")]
    Spawn(#[from] std::io::Error),
}

impl RenderError {
    /// Wrap any displayable producer failure
    pub fn producer(err: impl std::fmt::Display) -> Self {
        RenderError::Producer(err.to_string())
    }
}

/// Errors loading render configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for render operations
pub type Result<T> = std::result::Result<T, RenderError>;
