//! # xcs-db
//!
//! libSQL persistence and the sync engines for xcsync.
//!
//! The canonical store is a local libSQL database (`XcsDb`) wrapped by
//! `SyncService`, which carries all repository methods. On top of it sit:
//!
//! - [`tracker::StatusTracker`]: registers legacy files and decides their
//!   sync status from modification times
//! - [`transfer::TransferEngine`]: imports a legacy file's rows into the
//!   canonical record tables, idempotently
//! - [`proposal::ProposalExtractor`]: derives proposal/owner metadata from
//!   file paths
//! - [`validate::ReconciliationValidator`]: compares legacy rows against the
//!   imported records and writes diff reports or error artifacts
//!
//! Legacy soak databases are plain `SQLite` files, read through the same
//! `libsql` crate by [`legacy::LegacyReader`].

pub mod error;
pub mod helpers;
pub mod legacy;
mod migrations;
pub mod modtime;
pub mod owners;
pub mod proposal;
pub mod repos;
pub mod service;
pub mod tracker;
pub mod transfer;
pub mod validate;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Handle on the canonical store.
pub struct XcsDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl XcsDb {
    /// Open a local database at the given path (`":memory:"` for tests).
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let xcs_db = Self { db, conn };
        xcs_db.run_migrations().await?;
        Ok(xcs_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
