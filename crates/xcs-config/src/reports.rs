//! Validation report output.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_directory() -> String {
    "logs/soakdb_checks".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportsConfig {
    /// Directory receiving diff reports and error artifacts.
    #[serde(default = "default_directory")]
    pub directory: String,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
        }
    }
}

impl ReportsConfig {
    #[must_use]
    pub fn directory_path(&self) -> PathBuf {
        PathBuf::from(&self.directory)
    }
}
