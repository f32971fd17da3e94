//! # xcs-config
//!
//! Layered configuration loading for xcsync using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`XCSYNC_*` prefix, `__` as separator)
//! 2. Project-level `.xcsync/config.toml`
//! 3. User-level `~/.config/xcsync/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `XCSYNC_STORE__PATH` -> `store.path`,
//! `XCSYNC_BATCH__CONCURRENCY` -> `batch.concurrency`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use xcs_config::XcsConfig;
//!
//! let config = XcsConfig::load_with_dotenv().expect("config");
//! config.validate().expect("valid config");
//! println!("canonical store: {}", config.store.path);
//! ```

mod batch;
mod error;
mod legacy;
mod reports;
mod store;

pub use batch::BatchConfig;
pub use error::ConfigError;
pub use legacy::LegacyConfig;
pub use reports::ReportsConfig;
pub use store::StoreConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct XcsConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub legacy: LegacyConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    /// Proposal number -> owner identifiers.
    #[serde(default)]
    pub owners: BTreeMap<String, Vec<String>>,
}

impl XcsConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source fails to parse or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".xcsync/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("XCSYNC_").split("__"))
    }

    /// Reject values the engines cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a zero `batch.concurrency` or
    /// an empty `legacy.main_table`, and `ConfigError::StoreUnset` for an
    /// empty `store.path`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch.concurrency == 0 {
            return Err(ConfigError::invalid(
                "batch.concurrency",
                "must be at least 1",
            ));
        }
        if self.legacy.main_table.trim().is_empty() {
            return Err(ConfigError::invalid(
                "legacy.main_table",
                "must not be empty",
            ));
        }
        if self.store.path.trim().is_empty() {
            return Err(ConfigError::StoreUnset);
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("xcsync").join("config.toml"))
    }

    /// Load `.env` from the workspace root, or the current directory.
    /// Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
