//! Owner lookup for proposals.

use std::collections::{BTreeMap, BTreeSet};

/// Resolves the owner identifiers of a proposal.
pub trait OwnerDirectory: Send + Sync {
    fn owners(&self, proposal: &str) -> BTreeSet<String>;
}

/// Owner table taken from configuration (`[owners]` section).
#[derive(Debug, Clone, Default)]
pub struct ConfiguredOwners {
    table: BTreeMap<String, Vec<String>>,
}

impl ConfiguredOwners {
    #[must_use]
    pub const fn new(table: BTreeMap<String, Vec<String>>) -> Self {
        Self { table }
    }
}

impl OwnerDirectory for ConfiguredOwners {
    fn owners(&self, proposal: &str) -> BTreeSet<String> {
        self.table
            .get(proposal)
            .map(|owners| owners.iter().cloned().collect())
            .unwrap_or_default()
    }
}
