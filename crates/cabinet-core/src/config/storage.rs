//! Content store configuration.

use serde::{Deserialize, Serialize};

/// Local filesystem content store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding uploaded originals and their thumbnails.
    /// Created on first write if it does not exist.
    #[serde(default = "default_folder_path")]
    pub folder_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            folder_path: default_folder_path(),
        }
    }
}

fn default_folder_path() -> String {
    "/tmp/files_manager".to_string()
}
