/// Configuration for the history engine: defaults, load, save, sanitize.
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Maximum number of actions retained before the oldest are evicted.
pub const DEFAULT_MAX_HISTORY_SIZE: usize = 50;

/// Configuration for the history engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Upper bound on the number of recorded actions.
    pub max_history_size: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history_size: DEFAULT_MAX_HISTORY_SIZE,
        }
    }
}

impl HistoryConfig {
    /// Creates a config with the given bound, sanitized.
    pub fn new(max_history_size: usize) -> Self {
        let mut config = Self { max_history_size };
        config.sanitize();
        config
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any read or parse error.
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<HistoryConfig>(&contents) {
                    Ok(mut config) => {
                        config.sanitize();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse history config at {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read history config at {}: {e}", path.display());
                }
            }
            // Leave the broken file alone
            Self::default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!(
                    "Failed to create default history config at {}: {e:#}",
                    path.display()
                );
            }
            config
        }
    }

    /// Saves config to `path` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config: {}", path.display()))
    }

    /// Clamps values into their valid ranges.
    ///
    /// A zero bound would make every `record` evict the action it just
    /// appended, so the minimum is 1.
    pub fn sanitize(&mut self) {
        if self.max_history_size == 0 {
            tracing::warn!("max_history_size of 0 is not usable, raising to 1");
            self.max_history_size = 1;
        }
    }
}
