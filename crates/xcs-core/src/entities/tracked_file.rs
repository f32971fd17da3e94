use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::FileStatus;

/// A legacy soak database file known to the canonical store.
///
/// Exactly one `TrackedFile` exists per `path`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackedFile {
    pub id: i64,
    pub path: String,
    pub status: FileStatus,
    /// Last known modification time, kept as the numeric text read from the
    /// filesystem (e.g. `"20190515123000"`).
    pub modification_time: Option<String>,
    pub proposal: Option<String>,
    pub visit: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
