//! Service layer over the canonical store.
//!
//! `SyncService` wraps `XcsDb`. All repository methods are implemented as
//! `impl SyncService` blocks under `repos/`; the engines (`StatusTracker`,
//! `TransferEngine`, `ProposalExtractor`, `ReconciliationValidator`) borrow a
//! service and never touch SQL directly.

use crate::XcsDb;
use crate::error::DatabaseError;

pub struct SyncService {
    db: XcsDb,
}

impl SyncService {
    /// Open (and migrate) a local canonical store.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or migrated.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = XcsDb::open_local(db_path).await?;
        Ok(Self { db })
    }

    /// Create from an existing `XcsDb`.
    #[must_use]
    pub const fn from_db(db: XcsDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &XcsDb {
        &self.db
    }
}
