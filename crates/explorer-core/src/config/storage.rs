//! Storage backend configuration.

use serde::{Deserialize, Serialize};

/// Which backend the explorer talks to and where it lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend type: `"local"` or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Root directory served by the local backend.
    #[serde(default = "default_root")]
    pub root_path: String,
    /// Name of the sidecar directory holding version history.
    #[serde(default = "default_history_dir")]
    pub history_dir: String,
    /// Server the explorer is attached to (UUID). Random when omitted.
    #[serde(default)]
    pub server_id: Option<String>,
    /// Directory receiving "save as" downloads.
    #[serde(default = "default_download_dir")]
    pub download_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            root_path: default_root(),
            history_dir: default_history_dir(),
            server_id: None,
            download_dir: default_download_dir(),
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_root() -> String {
    "./data/server".to_string()
}

fn default_history_dir() -> String {
    ".explorer-history".to_string()
}

fn default_download_dir() -> String {
    "./data/downloads".to_string()
}
