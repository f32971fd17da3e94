//! Errors raised while loading or checking xcsync settings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A TOML file or `XCSYNC_*` variable could not be parsed into settings.
    #[error("failed to read xcsync settings: {0}")]
    Figment(#[from] figment::Error),

    #[error("no canonical store path set (store.path / XCSYNC_STORE__PATH)")]
    StoreUnset,

    #[error("invalid {field} ({env_key}): {reason}")]
    InvalidValue {
        field: String,
        env_key: String,
        reason: String,
    },
}

impl ConfigError {
    /// Invalid value for a dotted setting such as `batch.concurrency`.
    #[must_use]
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            env_key: env_key(field),
            reason: reason.into(),
        }
    }
}

/// Environment variable that overrides a dotted setting.
fn env_key(field: &str) -> String {
    format!("XCSYNC_{}", field.replace('.', "__").to_ascii_uppercase())
}
