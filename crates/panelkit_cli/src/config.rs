//! Panelkit configuration file handling

use anyhow::{Context, Result};
use panelkit_geometry::RenderConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "panelkit.toml";

/// Top-level configuration (panelkit.toml)
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct PanelkitConfig {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Resource image cache settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Frames between cache runs; 0 disables eviction
    #[serde(default = "default_refresh_frames")]
    pub refresh_frames: u64,
}

fn default_refresh_frames() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refresh_frames: default_refresh_frames(),
        }
    }
}

/// Host to screen sync settings
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Force a full resync every N cycles; 0 means never
    #[serde(default)]
    pub full_every: u64,
}

impl PanelkitConfig {
    /// Load configuration from a file or a directory holding panelkit.toml
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let config_path = if path.is_dir() {
            path.join(CONFIG_FILE)
        } else {
            path.to_path_buf()
        };

        if !config_path.exists() {
            anyhow::bail!(
                "No {} found at {}. Run `panelkit init` to create one.",
                CONFIG_FILE,
                config_path.display()
            );
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    /// Explicit path if given, else ./panelkit.toml when present, else defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }
        let local = Path::new(CONFIG_FILE);
        if local.exists() {
            Self::load_from_path(local)
        } else {
            tracing::debug!("no {CONFIG_FILE} in working directory, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelkit_geometry::Backpressure;

    #[test]
    fn test_missing_tables_use_defaults() {
        let config = PanelkitConfig::from_toml("[sync]\nfull_every = 10\n").unwrap();
        assert_eq!(config.sync.full_every, 10);
        assert_eq!(config.cache.refresh_frames, 60);
        assert_eq!(config.render, RenderConfig::default());
    }

    #[test]
    fn test_render_table_is_parsed() {
        let config = PanelkitConfig::from_toml(
            "[render]\nlanes = 2\nbackpressure = \"drop\"\n\n[cache]\nrefresh_frames = 0\n",
        )
        .unwrap();
        assert_eq!(config.render.lanes, 2);
        assert_eq!(config.render.backpressure, Backpressure::Drop);
        assert_eq!(config.cache.refresh_frames, 0);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = PanelkitConfig::default();
        config.sync.full_every = 3;
        let text = config.to_toml().unwrap();
        assert_eq!(PanelkitConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = PanelkitConfig::load_from_path(Path::new("/nonexistent/panelkit.toml"))
            .unwrap_err()
            .to_string();
        assert!(err.contains("panelkit init"));
    }
}
