//! Render worker configuration

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What to do when a worker lane's queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backpressure {
    /// Wait up to `enqueue_timeout_ms` for room, then give up
    #[default]
    Block,
    /// Give up immediately
    Drop,
}

/// Worker pool settings (`[render]` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Number of worker threads
    #[serde(default = "default_lanes")]
    pub lanes: usize,
    /// Pending tasks per lane
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default)]
    pub backpressure: Backpressure,
    /// Bounded wait for `Backpressure::Block`
    #[serde(default = "default_enqueue_timeout_ms")]
    pub enqueue_timeout_ms: u64,
}

fn default_lanes() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(4)
}

fn default_queue_capacity() -> usize {
    64
}

fn default_enqueue_timeout_ms() -> u64 {
    20
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            lanes: default_lanes(),
            queue_capacity: default_queue_capacity(),
            backpressure: Backpressure::default(),
            enqueue_timeout_ms: default_enqueue_timeout_ms(),
        }
    }
}

impl RenderConfig {
    /// Parse a `[render]`-style TOML document
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn with_lanes(mut self, lanes: usize) -> Self {
        self.lanes = lanes;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_backpressure(mut self, backpressure: Backpressure) -> Self {
        self.backpressure = backpressure;
        self
    }

    pub fn enqueue_timeout(&self) -> Duration {
        Duration::from_millis(self.enqueue_timeout_ms)
    }

    /// Lane count, at least one
    pub(crate) fn effective_lanes(&self) -> usize {
        self.lanes.max(1)
    }

    /// Queue capacity, at least one
    pub(crate) fn effective_capacity(&self) -> usize {
        self.queue_capacity.max(1)
    }
}
