//! Canonical store configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_path() -> String {
    "xcdb.sqlite".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// libSQL database file holding the canonical store. `:memory:` is
    /// accepted for dry runs.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }

    /// Parent directory that must exist before the store is opened.
    #[must_use]
    pub fn parent_dir(&self) -> Option<PathBuf> {
        if self.is_in_memory() {
            return None;
        }
        PathBuf::from(&self.path)
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_a_local_file() {
        let config = StoreConfig::default();
        assert_eq!(config.path, "xcdb.sqlite");
        assert!(!config.is_in_memory());
        assert_eq!(config.parent_dir(), None);
    }

    #[test]
    fn nested_path_has_parent() {
        let config = StoreConfig {
            path: "data/store/xcdb.sqlite".into(),
        };
        assert_eq!(config.parent_dir(), Some(PathBuf::from("data/store")));
        let memory = StoreConfig {
            path: ":memory:".into(),
        };
        assert!(memory.is_in_memory());
        assert_eq!(memory.parent_dir(), None);
    }
}
