//! Modification-time source for legacy files.
//!
//! Times are carried as `%Y%m%d%H%M%S` text (e.g. `"20190515123000"`) so
//! they compare numerically in the order they happened.

use std::path::Path;

use chrono::{DateTime, Local};

use crate::error::DatabaseError;

/// Format used for modification times in the canonical store and report names.
pub const MODIFICATION_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Where modification times come from. Tests substitute a fake.
pub trait ModTimeSource: Send + Sync {
    /// Current modification time of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Io` if the file's metadata cannot be read.
    fn modification_time(&self, path: &Path) -> Result<String, DatabaseError>;
}

/// Reads modification times from filesystem metadata, in local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsModTime;

impl ModTimeSource for FsModTime {
    fn modification_time(&self, path: &Path) -> Result<String, DatabaseError> {
        let modified = std::fs::metadata(path)?.modified()?;
        let local: DateTime<Local> = modified.into();
        Ok(local.format(MODIFICATION_TIME_FORMAT).to_string())
    }
}
