//! Status and record-kind enums for xcsync.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// FileStatus
// ---------------------------------------------------------------------------

/// Sync status of a tracked legacy file.
///
/// ```text
/// new ──────┐
///           ├─ transfer ─→ unchanged ─ mtime increases ─→ changed
/// changed ──┘
/// (any) ─ canonical lab table empty ─→ new
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    New,
    Changed,
    Unchanged,
}

impl FileStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
        }
    }

    /// Whether the file still needs a transfer in this cycle.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::New | Self::Changed)
    }

    /// Status decided by a reconcile pass.
    ///
    /// * `stored`: last known modification time; `None` means the baseline
    ///   has not been captured yet, which is never a change signal.
    /// * `observed`: the file's current modification time.
    /// * `bootstrap`: the canonical lab table is empty, forcing a full resync.
    #[must_use]
    pub const fn reconcile(self, stored: Option<i64>, observed: i64, bootstrap: bool) -> Self {
        if bootstrap {
            return Self::New;
        }
        match stored {
            Some(stored) if observed > stored => Self::Changed,
            _ => self,
        }
    }

    /// Status after a transfer completed without error.
    #[must_use]
    pub const fn after_transfer(self) -> Self {
        Self::Unchanged
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read a current and an optional stored modification time as integers.
///
/// Both values are kept as text (e.g. `"20190515123000"`) and compared
/// numerically.
///
/// # Errors
///
/// Returns `CoreError::TypeConversion` naming both raw values if either side
/// is not an integer.
pub fn parse_modification_times(
    current: &str,
    stored: Option<&str>,
) -> Result<(i64, Option<i64>), CoreError> {
    let conversion_error = || CoreError::TypeConversion {
        current: current.to_string(),
        stored: stored.unwrap_or_default().to_string(),
    };

    let current_value = current
        .trim()
        .parse::<i64>()
        .map_err(|_| conversion_error())?;
    let stored_value = match stored.map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<i64>().map_err(|_| conversion_error())?),
    };
    Ok((current_value, stored_value))
}

// ---------------------------------------------------------------------------
// RecordKind
// ---------------------------------------------------------------------------

/// Canonical record types populated from a legacy file.
///
/// Declaration order is the mandatory import order: dependents reference
/// `Crystal` by foreign identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Crystal,
    Lab,
    Refinement,
    Dimple,
    DataProcessing,
}

impl RecordKind {
    /// All kinds in import order.
    pub const IMPORT_ORDER: [Self; 5] = [
        Self::Crystal,
        Self::Lab,
        Self::Refinement,
        Self::Dimple,
        Self::DataProcessing,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Crystal => "crystal",
            Self::Lab => "lab",
            Self::Refinement => "refinement",
            Self::Dimple => "dimple",
            Self::DataProcessing => "data_processing",
        }
    }

    /// Canonical table holding records of this kind.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Crystal => "crystals",
            Self::Lab => "lab",
            Self::Refinement => "refinement",
            Self::Dimple => "dimple",
            Self::DataProcessing => "data_processing",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
