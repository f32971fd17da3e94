//! Sync status tracking for legacy files.
//!
//! `StatusTracker` registers legacy file paths and, on each reconcile pass,
//! decides their status from modification times using
//! [`FileStatus::reconcile`]. When the canonical lab table is empty every
//! tracked file is forced back to `new` (full resync).

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};
use xcs_core::entities::TrackedFile;
use xcs_core::enums::{FileStatus, parse_modification_times};
use xcs_core::errors::CoreError;
use xcs_core::proposal_path::ProposalPath;

use crate::error::DatabaseError;
use crate::modtime::ModTimeSource;
use crate::service::SyncService;

/// What a reconcile pass did with one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathOutcome {
    /// First sighting: registered as `new`.
    Registered,
    /// No stored modification time yet; the current one was recorded.
    Baselined,
    /// Modification time moved forward; now `changed`.
    Changed,
    /// Status left as it was.
    Kept,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathFailure {
    pub path: String,
    pub error: String,
}

/// Summary of one reconcile pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    /// The canonical lab table was empty, so every file was reset to `new`.
    pub bootstrapped: bool,
    pub registered: Vec<String>,
    pub baselined: Vec<String>,
    pub changed: Vec<String>,
    pub kept: usize,
    pub failures: Vec<PathFailure>,
}

impl ReconcileReport {
    fn record(&mut self, path: &str, outcome: PathOutcome) {
        match outcome {
            PathOutcome::Registered => self.registered.push(path.to_string()),
            PathOutcome::Baselined => self.baselined.push(path.to_string()),
            PathOutcome::Changed => self.changed.push(path.to_string()),
            PathOutcome::Kept => self.kept += 1,
        }
    }
}

pub struct StatusTracker<'a> {
    service: &'a SyncService,
    mtime: &'a dyn ModTimeSource,
    visit_segment: usize,
}

impl<'a> StatusTracker<'a> {
    #[must_use]
    pub fn new(
        service: &'a SyncService,
        mtime: &'a dyn ModTimeSource,
        visit_segment: usize,
    ) -> Self {
        Self {
            service,
            mtime,
            visit_segment,
        }
    }

    /// Start tracking `path` with status `new`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Consistency` if the path is already tracked.
    pub async fn register(&self, path: &str) -> Result<TrackedFile, DatabaseError> {
        if let Some(existing) = self.service.get_tracked_file(path).await? {
            return Err(CoreError::Consistency(format!(
                "legacy file '{path}' is already tracked (id {})",
                existing.id
            ))
            .into());
        }

        let location = ProposalPath::parse(path, self.visit_segment)
            .inspect_err(|error| debug!(path, %error, "no visit segment in path"))
            .ok();
        let file = self
            .service
            .insert_tracked_file(path, location.as_ref())
            .await
            .map_err(|error| {
                if error.is_unique_violation() {
                    CoreError::Consistency(format!(
                        "legacy file '{path}' is already tracked (registered concurrently)"
                    ))
                    .into()
                } else {
                    error
                }
            })?;
        info!(path, "registered legacy file");
        Ok(file)
    }

    /// Reconcile the status of every path in `paths`.
    ///
    /// Blank lines and repeated paths are ignored. A failure on one path
    /// (unreadable or non-numeric modification time) is recorded in the
    /// report and does not stop the others.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` only if the bootstrap check or reset fails.
    pub async fn reconcile<I, S>(&self, paths: I) -> Result<ReconcileReport, DatabaseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let bootstrap = self.service.lab_is_empty().await?;
        let mut report = ReconcileReport {
            bootstrapped: bootstrap,
            ..ReconcileReport::default()
        };

        let mut seen = HashSet::new();
        for raw in paths {
            let path = raw.as_ref().trim();
            if path.is_empty() || !seen.insert(path.to_string()) {
                continue;
            }
            match self.reconcile_path(path, bootstrap).await {
                Ok(outcome) => report.record(path, outcome),
                Err(error) => {
                    warn!(path, %error, "reconcile failed");
                    report.failures.push(PathFailure {
                        path: path.to_string(),
                        error: error.to_string(),
                    });
                }
            }
        }

        if bootstrap {
            let reset = self
                .service
                .reset_all_file_statuses(FileStatus::New)
                .await?;
            info!(files = reset, "canonical lab table is empty; all tracked files reset to new");
        }

        Ok(report)
    }

    async fn reconcile_path(&self, path: &str, bootstrap: bool) -> Result<PathOutcome, DatabaseError> {
        let Some(file) = self.service.get_tracked_file(path).await? else {
            self.register(path).await?;
            return Ok(PathOutcome::Registered);
        };

        let current = self.mtime.modification_time(Path::new(path))?;
        let (observed, stored) =
            parse_modification_times(&current, file.modification_time.as_deref())?;

        if stored.is_none() {
            self.service
                .set_file_modification_time(file.id, &current)
                .await?;
        }

        let next = file.status.reconcile(stored, observed, bootstrap);
        if next != file.status {
            self.service.set_file_status(file.id, next).await?;
            debug!(path, from = %file.status, to = %next, "status changed");
        }

        Ok(match (stored, next) {
            (None, _) => PathOutcome::Baselined,
            (Some(_), FileStatus::Changed) if file.status != FileStatus::Changed => {
                PathOutcome::Changed
            }
            _ => PathOutcome::Kept,
        })
    }

    /// Tracked files still waiting for a transfer.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the store query fails.
    pub async fn pending(&self) -> Result<Vec<TrackedFile>, DatabaseError> {
        self.service.list_pending_files().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{FakeModTime, test_service};
    use pretty_assertions::assert_eq;
    use xcs_core::entities::{Crystal, Lab};

    const A: &str = "/data/a.sqlite";
    const B: &str = "/data/b.sqlite";

    /// Give the canonical lab table a row so reconcile does not bootstrap.
    async fn seed_lab(svc: &SyncService) {
        let file = svc.insert_tracked_file("/data/seed.sqlite", None).await.unwrap();
        let mut crystal = Crystal {
            crystal_name: "seed".into(),
            file_id: file.id,
            ..Crystal::default()
        };
        svc.upsert_crystal(&mut crystal).await.unwrap();
        let mut lab = Lab {
            crystal_id: crystal.id,
            ..Lab::default()
        };
        svc.upsert_record(&mut lab).await.unwrap();
    }

    async fn status_of(svc: &SyncService, path: &str) -> FileStatus {
        svc.get_tracked_file(path).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn register_unseen_path_is_new() {
        let svc = test_service().await;
        let mtime = FakeModTime::default();
        let tracker = StatusTracker::new(&svc, &mtime, 5);
        let file = tracker.register(A).await.unwrap();
        assert_eq!(file.status, FileStatus::New);
    }

    #[tokio::test]
    async fn register_twice_is_consistency_error() {
        let svc = test_service().await;
        let mtime = FakeModTime::default();
        let tracker = StatusTracker::new(&svc, &mtime, 5);
        tracker.register(A).await.unwrap();
        let err = tracker.register(A).await.unwrap_err();
        assert!(matches!(err.as_core(), Some(CoreError::Consistency(_))));
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_unique_violation() {
        let svc = test_service().await;
        svc.insert_tracked_file(A, None).await.unwrap();
        let err = svc.insert_tracked_file(A, None).await.unwrap_err();
        assert!(err.is_unique_violation(), "{err}");
        assert!(!DatabaseError::NoResult.is_unique_violation());
    }

    #[tokio::test]
    async fn racing_registers_leave_one_file_and_one_consistency_error() {
        let svc = test_service().await;
        let mtime = FakeModTime::default();
        let tracker = StatusTracker::new(&svc, &mtime, 5);

        let (first, second) = tokio::join!(tracker.register(A), tracker.register(A));
        let errors: Vec<DatabaseError> = [first, second]
            .into_iter()
            .filter_map(Result::err)
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0].as_core(), Some(CoreError::Consistency(_))));
        assert_eq!(svc.list_tracked_files(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reconcile_registers_then_baselines() {
        let svc = test_service().await;
        seed_lab(&svc).await;
        let mtime = FakeModTime::default();
        mtime.set(A, "20240101000000");
        let tracker = StatusTracker::new(&svc, &mtime, 5);

        let report = tracker.reconcile([A, "", A]).await.unwrap();
        assert_eq!(report.registered, vec![A]);
        assert!(!report.bootstrapped);

        let report = tracker.reconcile([A]).await.unwrap();
        assert_eq!(report.baselined, vec![A]);
        let file = svc.get_tracked_file(A).await.unwrap().unwrap();
        assert_eq!(file.status, FileStatus::New);
        assert_eq!(file.modification_time.as_deref(), Some("20240101000000"));
    }

    #[tokio::test]
    async fn newer_modification_time_marks_changed() {
        let svc = test_service().await;
        seed_lab(&svc).await;
        let mtime = FakeModTime::default();
        let tracker = StatusTracker::new(&svc, &mtime, 5);
        for path in [A, B] {
            let file = tracker.register(path).await.unwrap();
            svc.complete_file_cycle(file.id, FileStatus::Unchanged, "20240101000000")
                .await
                .unwrap();
        }
        mtime.set(A, "20240102000000");
        mtime.set(B, "20240101000000");

        let report = tracker.reconcile([A, B]).await.unwrap();
        assert_eq!(report.changed, vec![A]);
        assert_eq!(report.kept, 1);
        assert_eq!(status_of(&svc, A).await, FileStatus::Changed);
        assert_eq!(status_of(&svc, B).await, FileStatus::Unchanged);

        let pending: Vec<_> = tracker.pending().await.unwrap().into_iter().map(|f| f.path).collect();
        assert_eq!(pending, vec![A]);
    }

    #[tokio::test]
    async fn older_modification_time_stays_unchanged() {
        let svc = test_service().await;
        seed_lab(&svc).await;
        let mtime = FakeModTime::default();
        let tracker = StatusTracker::new(&svc, &mtime, 5);
        let file = tracker.register(A).await.unwrap();
        svc.complete_file_cycle(file.id, FileStatus::Unchanged, "20240105000000")
            .await
            .unwrap();
        mtime.set(A, "20240101000000");

        tracker.reconcile([A]).await.unwrap();
        assert_eq!(status_of(&svc, A).await, FileStatus::Unchanged);
    }

    #[tokio::test]
    async fn empty_lab_table_resets_everything_to_new() {
        let svc = test_service().await;
        let mtime = FakeModTime::default();
        let tracker = StatusTracker::new(&svc, &mtime, 5);
        for path in [A, B] {
            let file = tracker.register(path).await.unwrap();
            svc.complete_file_cycle(file.id, FileStatus::Unchanged, "20240105000000")
                .await
                .unwrap();
        }
        mtime.set(A, "20240101000000");

        let report = tracker.reconcile([A]).await.unwrap();
        assert!(report.bootstrapped);
        assert_eq!(status_of(&svc, A).await, FileStatus::New);
        assert_eq!(status_of(&svc, B).await, FileStatus::New);
    }

    #[tokio::test]
    async fn non_numeric_time_fails_only_that_path() {
        let svc = test_service().await;
        seed_lab(&svc).await;
        let mtime = FakeModTime::default();
        let tracker = StatusTracker::new(&svc, &mtime, 5);
        let file = tracker.register(A).await.unwrap();
        svc.set_file_modification_time(file.id, "yesterday").await.unwrap();
        mtime.set(A, "20240101000000");

        let report = tracker.reconcile([A, B]).await.unwrap();
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].error.contains("yesterday"));
        assert_eq!(report.registered, vec![B]);
    }
}
