use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Ownership unit derived from a legacy file's path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Proposal {
    pub id: i64,
    pub number: String,
    pub owners: BTreeSet<String>,
}
