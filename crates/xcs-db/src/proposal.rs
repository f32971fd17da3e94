//! Proposal extraction from legacy file paths.

use std::collections::BTreeMap;

use tracing::{debug, warn};
use xcs_core::entities::{Proposal, TrackedFile};
use xcs_core::proposal_path::ProposalPath;

use crate::error::DatabaseError;
use crate::owners::OwnerDirectory;
use crate::service::SyncService;

/// Derives a file's proposal and visit from its path, resolves owners, and
/// upserts the proposal.
#[derive(Clone, Copy)]
pub struct ProposalExtractor<'a> {
    service: &'a SyncService,
    owners: &'a dyn OwnerDirectory,
    visit_segment: usize,
}

impl<'a> ProposalExtractor<'a> {
    #[must_use]
    pub fn new(
        service: &'a SyncService,
        owners: &'a dyn OwnerDirectory,
        visit_segment: usize,
    ) -> Self {
        Self {
            service,
            owners,
            visit_segment,
        }
    }

    /// Upsert the proposal a tracked file belongs to and associate the file
    /// with it.
    ///
    /// Returns `None` (and logs) when the path does not follow the visit
    /// directory layout; nothing is written in that case.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a store write fails.
    pub async fn extract(&self, file: &TrackedFile) -> Result<Option<Proposal>, DatabaseError> {
        let location = match ProposalPath::parse(&file.path, self.visit_segment) {
            Ok(location) => location,
            Err(error) => {
                warn!(path = %file.path, %error, "cannot derive proposal from path");
                return Ok(None);
            }
        };

        let owners = self.owners.owners(&location.proposal);
        let proposal = self
            .service
            .upsert_proposal(&location.proposal, &owners)
            .await?;
        self.service.set_file_proposal(file.id, Some(&location)).await?;
        debug!(
            path = %file.path,
            proposal = %proposal.number,
            owners = proposal.owners.len(),
            "proposal upserted"
        );
        Ok(Some(proposal))
    }

    /// Upsert proposals for every tracked file. Returns each distinct
    /// proposal once, ordered by number.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a store read or write fails.
    pub async fn extract_all(&self) -> Result<Vec<Proposal>, DatabaseError> {
        let mut proposals = BTreeMap::new();
        for file in self.service.list_tracked_files(None).await? {
            if let Some(proposal) = self.extract(&file).await? {
                proposals.insert(proposal.number.clone(), proposal);
            }
        }
        Ok(proposals.into_values().collect())
    }
}
