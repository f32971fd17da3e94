//! Tracked legacy file repository.

use chrono::Utc;

use xcs_core::entities::TrackedFile;
use xcs_core::enums::FileStatus;
use xcs_core::proposal_path::ProposalPath;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, opt_text, parse_datetime, parse_enum};
use crate::service::SyncService;

const SELECT_COLS: &str =
    "id, path, status, modification_time, proposal, visit, created_at, updated_at";

fn row_to_tracked_file(row: &libsql::Row) -> Result<TrackedFile, DatabaseError> {
    Ok(TrackedFile {
        id: row.get(0)?,
        path: row.get(1)?,
        status: parse_enum(&row.get::<String>(2)?)?,
        modification_time: get_opt_string(row, 3)?,
        proposal: get_opt_string(row, 4)?,
        visit: get_opt_string(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl SyncService {
    /// Insert a tracked file with status `new`.
    ///
    /// The caller is responsible for the duplicate check; the `UNIQUE`
    /// constraint on `path` rejects a second insert regardless.
    pub async fn insert_tracked_file(
        &self,
        path: &str,
        location: Option<&ProposalPath>,
    ) -> Result<TrackedFile, DatabaseError> {
        let now = Utc::now();
        let proposal = location.map(|l| l.proposal.as_str());
        let visit = location.map(|l| l.visit.as_str());

        self.db()
            .conn()
            .execute(
                "INSERT INTO tracked_files (path, status, proposal, visit, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    path,
                    FileStatus::New.as_str(),
                    opt_text(proposal),
                    opt_text(visit),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        self.get_tracked_file(path)
            .await?
            .ok_or(DatabaseError::NoResult)
    }

    pub async fn get_tracked_file(&self, path: &str) -> Result<Option<TrackedFile>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM tracked_files WHERE path = ?1"),
                [path],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_tracked_file(&row)?)),
            None => Ok(None),
        }
    }

    /// List tracked files, optionally filtered by status, ordered by path.
    pub async fn list_tracked_files(
        &self,
        status: Option<FileStatus>,
    ) -> Result<Vec<TrackedFile>, DatabaseError> {
        let mut rows = match status {
            Some(status) => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {SELECT_COLS} FROM tracked_files WHERE status = ?1 ORDER BY path"
                        ),
                        [status.as_str()],
                    )
                    .await?
            }
            None => {
                self.db()
                    .conn()
                    .query(
                        &format!("SELECT {SELECT_COLS} FROM tracked_files ORDER BY path"),
                        (),
                    )
                    .await?
            }
        };

        let mut files = Vec::new();
        while let Some(row) = rows.next().await? {
            files.push(row_to_tracked_file(&row)?);
        }
        Ok(files)
    }

    /// Tracked files still waiting for a transfer (`new` or `changed`).
    pub async fn list_pending_files(&self) -> Result<Vec<TrackedFile>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM tracked_files
                     WHERE status IN ('new', 'changed') ORDER BY path"
                ),
                (),
            )
            .await?;
        let mut files = Vec::new();
        while let Some(row) = rows.next().await? {
            files.push(row_to_tracked_file(&row)?);
        }
        Ok(files)
    }

    pub async fn set_file_status(&self, id: i64, status: FileStatus) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute(
                "UPDATE tracked_files SET status = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![status.as_str(), Utc::now().to_rfc3339(), id],
            )
            .await?;
        Ok(())
    }

    pub async fn set_file_modification_time(
        &self,
        id: i64,
        modification_time: &str,
    ) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute(
                "UPDATE tracked_files SET modification_time = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![modification_time, Utc::now().to_rfc3339(), id],
            )
            .await?;
        Ok(())
    }

    /// Close a file's sync cycle: terminal status plus the modification time
    /// the imported data corresponds to.
    pub async fn complete_file_cycle(
        &self,
        id: i64,
        status: FileStatus,
        modification_time: &str,
    ) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute(
                "UPDATE tracked_files
                 SET status = ?1, modification_time = ?2, updated_at = ?3
                 WHERE id = ?4",
                libsql::params![
                    status.as_str(),
                    modification_time,
                    Utc::now().to_rfc3339(),
                    id
                ],
            )
            .await?;
        Ok(())
    }

    /// Force every tracked file to `status`. Returns the number of rows touched.
    pub async fn reset_all_file_statuses(&self, status: FileStatus) -> Result<u64, DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE tracked_files SET status = ?1, updated_at = ?2",
                libsql::params![status.as_str(), Utc::now().to_rfc3339()],
            )
            .await?;
        Ok(changed)
    }

    /// Point a tracked file at a proposal (or clear the association).
    pub async fn set_file_proposal(
        &self,
        id: i64,
        location: Option<&ProposalPath>,
    ) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute(
                "UPDATE tracked_files SET proposal = ?1, visit = ?2, updated_at = ?3 WHERE id = ?4",
                libsql::params![
                    opt_text(location.map(|l| l.proposal.as_str())),
                    opt_text(location.map(|l| l.visit.as_str())),
                    Utc::now().to_rfc3339(),
                    id
                ],
            )
            .await?;
        Ok(())
    }

    /// Count tracked files per status.
    pub async fn count_files_by_status(&self) -> Result<Vec<(FileStatus, i64)>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT status, COUNT(*) FROM tracked_files GROUP BY status ORDER BY status",
                (),
            )
            .await?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next().await? {
            counts.push((parse_enum(&row.get::<String>(0)?)?, row.get::<i64>(1)?));
        }
        Ok(counts)
    }
}
