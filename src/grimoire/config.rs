use crate::error::{GrimoireError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_DATABASE: &str = "grimoire-db";

/// Configuration for grimoire, stored as `config.json` in the data directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GrimoireConfig {
    /// Name of the local database; the store lives in `<data_dir>/<database>/`.
    #[serde(default = "default_database")]
    pub database: String,

    /// Characters of plain text shown under each entry in listings.
    #[serde(default = "default_snippet_length")]
    pub snippet_length: usize,

    /// Entries shown by `list` when no limit is given.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_snippet_length() -> usize {
    crate::commands::DEFAULT_SNIPPET_LENGTH
}

fn default_recent_limit() -> usize {
    8
}

impl Default for GrimoireConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            snippet_length: default_snippet_length(),
            recent_limit: default_recent_limit(),
        }
    }
}

impl GrimoireConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(GrimoireError::Io)?;
        let config: GrimoireConfig =
            serde_json::from_str(&content).map_err(GrimoireError::Serialization)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        fs::create_dir_all(config_dir).map_err(GrimoireError::Io)?;

        let content = serde_json::to_string_pretty(self).map_err(GrimoireError::Serialization)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content).map_err(GrimoireError::Io)?;
        Ok(())
    }
}
