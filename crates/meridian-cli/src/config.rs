// crates/meridian-cli/src/config.rs
//
// Runtime configuration for the Meridian CLI.
// Loaded from a TOML file or populated with sensible defaults.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use meridian_store::{expand_tilde, DEFAULT_ROOT_DIR};

/// Runtime configuration for the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Network name; the snapshot file is `<root_dir>/<network>.json`.
    #[serde(default = "default_network")]
    pub network: String,

    /// Directory holding snapshot files.
    #[serde(default = "default_root_dir")]
    pub root_dir: String,

    /// Upper bound on the ledger queries of one sync pass, in seconds.
    #[serde(default = "default_sync_timeout_secs")]
    pub sync_timeout_secs: u64,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_network() -> String {
    "local".to_string()
}

fn default_root_dir() -> String {
    DEFAULT_ROOT_DIR.to_string()
}

fn default_sync_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            root_dir: default_root_dir(),
            sync_timeout_secs: default_sync_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(expand_tilde(path))?;
        let config: CliConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// `root_dir` with `~` expanded.
    pub fn root_dir_path(&self) -> PathBuf {
        expand_tilde(&self.root_dir)
    }

    pub fn sync_timeout(&self) -> Duration {
        Duration::from_secs(self.sync_timeout_secs)
    }
}
