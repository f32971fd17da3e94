//! Import of legacy rows into the canonical record tables.
//!
//! A transfer walks the record kinds in import order (crystal first, then
//! lab, refinement, dimple, data processing) and upserts every translated
//! row, so re-running it on unchanged data rewrites the same rows. The file's
//! status only becomes `unchanged` after every step succeeded; a failure
//! leaves it pending for the next cycle.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use futures::StreamExt;
use futures::stream;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use xcs_config::LegacyConfig;
use xcs_core::accessor::{CanonicalRecord, Storage};
use xcs_core::entities::{Crystal, DataProcessing, Dimple, Lab, Refinement, TrackedFile};
use xcs_core::enums::{FileStatus, RecordKind};
use xcs_core::errors::CoreError;
use xcs_core::translation::{LegacyRow, TranslationMap, TranslationSet};

use crate::error::DatabaseError;
use crate::legacy::LegacyReader;
use crate::modtime::ModTimeSource;
use crate::proposal::ProposalExtractor;
use crate::service::SyncService;

/// How a transfer treated the file's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferOutcome {
    Imported,
    /// The file has no main table; nothing was imported.
    Tableless,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferReport {
    pub path: String,
    pub outcome: TransferOutcome,
    /// Status the file was left in.
    pub status: FileStatus,
    /// Records upserted per kind.
    pub records: BTreeMap<RecordKind, usize>,
    /// Crystals removed before re-import of a changed file.
    pub retired: u64,
    pub proposal: Option<String>,
}

/// Per-file result of a batch transfer.
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TransferResult {
    Transferred(TransferReport),
    Failed { path: String, error: String },
}

impl TransferResult {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Transferred(report) => &report.path,
            Self::Failed { path, .. } => path,
        }
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

pub struct TransferEngine<'a> {
    service: &'a SyncService,
    translations: TranslationSet,
    proposals: ProposalExtractor<'a>,
    mtime: &'a dyn ModTimeSource,
    main_table: String,
    mark_tableless_processed: bool,
    /// One lock per path: at most one transfer in flight for a file.
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<'a> TransferEngine<'a> {
    /// # Errors
    ///
    /// Returns `CoreError::Lookup` if a translation map names a field the
    /// canonical record does not have.
    pub fn new(
        service: &'a SyncService,
        translations: TranslationSet,
        proposals: ProposalExtractor<'a>,
        mtime: &'a dyn ModTimeSource,
        legacy: &LegacyConfig,
    ) -> Result<Self, DatabaseError> {
        translations.check()?;
        Ok(Self {
            service,
            translations,
            proposals,
            mtime,
            main_table: legacy.main_table.clone(),
            mark_tableless_processed: legacy.mark_tableless_processed,
            locks: DashMap::new(),
        })
    }

    fn lock_for(&self, path: &str) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.entry(path.to_string()).or_default().value())
    }

    /// Forget the lock for `path` once no other transfer holds or awaits it.
    fn release_lock(&self, path: &str, lock: Arc<Mutex<()>>) {
        drop(lock);
        self.locks
            .remove_if(path, |_, entry| Arc::strong_count(entry) == 1);
    }

    /// Transfer one tracked legacy file.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingRecord` for an untracked path, and any
    /// read, translation, or store error hit along the way. The file's
    /// status is not touched on error.
    pub async fn transfer(&self, path: &str) -> Result<TransferReport, DatabaseError> {
        let lock = self.lock_for(path);
        let result = {
            let _guard = lock.lock().await;
            self.transfer_locked(path).await
        };
        self.release_lock(path, lock);
        result
    }

    async fn transfer_locked(&self, path: &str) -> Result<TransferReport, DatabaseError> {
        let file = self
            .service
            .get_tracked_file(path)
            .await?
            .ok_or_else(|| CoreError::MissingRecord {
                kind: "tracked file".into(),
                key: path.to_string(),
            })?;

        // Read before importing so edits made during the transfer are seen
        // as a change on the next reconcile.
        let modification_time = self.mtime.modification_time(Path::new(path))?;
        let reader = LegacyReader::open(path).await?;
        let has_table = reader.has_table(&self.main_table).await?;

        let retired = if file.status == FileStatus::Changed {
            self.retire(&file).await?
        } else {
            0
        };

        let (outcome, records) = if has_table {
            let rows = reader.rows(&self.main_table).await?;
            (TransferOutcome::Imported, self.import_rows(file.id, &rows).await?)
        } else {
            warn!(path, table = %self.main_table, "legacy file has no main table; nothing imported");
            (TransferOutcome::Tableless, BTreeMap::new())
        };

        let proposal = self.proposals.extract(&file).await?.map(|p| p.number);

        let status = if has_table || self.mark_tableless_processed {
            let status = file.status.after_transfer();
            self.service
                .complete_file_cycle(file.id, status, &modification_time)
                .await?;
            status
        } else {
            file.status
        };

        info!(
            path,
            outcome = ?outcome,
            status = %status,
            crystals = records.get(&RecordKind::Crystal).copied().unwrap_or_default(),
            "transfer complete"
        );

        Ok(TransferReport {
            path: path.to_string(),
            outcome,
            status,
            records,
            retired,
            proposal,
        })
    }

    /// Drop everything previously imported from a changed file, including
    /// its proposal association.
    async fn retire(&self, file: &TrackedFile) -> Result<u64, DatabaseError> {
        let retired = self.service.delete_crystals_for_file(file.id).await?;
        self.service.set_file_proposal(file.id, None).await?;
        debug!(path = %file.path, crystals = retired, "retired stale records");
        Ok(retired)
    }

    async fn import_rows(
        &self,
        file_id: i64,
        rows: &[LegacyRow],
    ) -> Result<BTreeMap<RecordKind, usize>, DatabaseError> {
        let mut crystal_ids = Vec::with_capacity(rows.len());
        let mut crystals = 0;
        for row in rows {
            let mut crystal: Crystal = self.translations.crystal.apply(row)?;
            if crystal.crystal_name.trim().is_empty() {
                debug!("skipping legacy row without a crystal name");
                crystal_ids.push(None);
                continue;
            }
            crystal.file_id = file_id;
            crystal_ids.push(Some(self.service.upsert_crystal(&mut crystal).await?));
            crystals += 1;
        }

        let mut records = BTreeMap::from([(RecordKind::Crystal, crystals)]);
        for kind in &RecordKind::IMPORT_ORDER[1..] {
            let map = self.translations.get(*kind);
            let count = match kind {
                RecordKind::Lab => self.import_kind::<Lab>(map, rows, &crystal_ids).await?,
                RecordKind::Refinement => {
                    self.import_kind::<Refinement>(map, rows, &crystal_ids).await?
                }
                RecordKind::Dimple => self.import_kind::<Dimple>(map, rows, &crystal_ids).await?,
                RecordKind::DataProcessing => {
                    self.import_kind::<DataProcessing>(map, rows, &crystal_ids)
                        .await?
                }
                RecordKind::Crystal => continue,
            };
            records.insert(*kind, count);
        }
        Ok(records)
    }

    async fn import_kind<T: CanonicalRecord>(
        &self,
        map: &TranslationMap,
        rows: &[LegacyRow],
        crystal_ids: &[Option<i64>],
    ) -> Result<usize, DatabaseError> {
        let mut imported = 0;
        for (row, crystal_id) in rows.iter().zip(crystal_ids) {
            let Some(crystal_id) = crystal_id else {
                continue;
            };
            if !map.is_present(row) {
                continue;
            }
            let mut record: T = map.apply(row)?;
            record.set_crystal_id(*crystal_id);
            if T::keyed_by_reference() {
                let reference_id = self.resolve_reference(&record).await?;
                record.set_reference_id(reference_id);
            }
            self.service.upsert_record(&mut record).await?;
            imported += 1;
        }
        Ok(imported)
    }

    /// Reference-model id for a record's reference field, creating the model
    /// on first sight. Empty references resolve to `None`.
    async fn resolve_reference<T: CanonicalRecord>(
        &self,
        record: &T,
    ) -> Result<Option<i64>, DatabaseError> {
        let reference = T::fields()
            .iter()
            .find(|field| field.storage == Storage::Reference)
            .and_then(|field| field.comparison_value(record).into_text())
            .filter(|pdb| !pdb.trim().is_empty());
        match reference {
            Some(pdb) => Ok(Some(self.service.upsert_reference(&pdb).await?)),
            None => Ok(None),
        }
    }

    /// Transfer every pending (`new` or `changed`) file.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` only if the pending list cannot be read;
    /// per-file failures are reported in the results.
    pub async fn transfer_pending(
        &self,
        concurrency: usize,
    ) -> Result<Vec<TransferResult>, DatabaseError> {
        self.transfer_pending_with(concurrency, |_| {}).await
    }

    /// [`Self::transfer_pending`], calling `on_result` as each file finishes.
    ///
    /// # Errors
    ///
    /// See [`Self::transfer_pending`].
    pub async fn transfer_pending_with(
        &self,
        concurrency: usize,
        on_result: impl FnMut(&TransferResult),
    ) -> Result<Vec<TransferResult>, DatabaseError> {
        let paths = self
            .service
            .list_pending_files()
            .await?
            .into_iter()
            .map(|file| file.path)
            .collect();
        Ok(self.transfer_many(paths, concurrency, on_result).await)
    }

    /// Transfer `paths` with at most `concurrency` files in flight. Failures
    /// are isolated per file.
    pub async fn transfer_many(
        &self,
        paths: Vec<String>,
        concurrency: usize,
        mut on_result: impl FnMut(&TransferResult),
    ) -> Vec<TransferResult> {
        let mut results = Vec::with_capacity(paths.len());
        let mut in_flight = stream::iter(paths)
            .map(|path| async move {
                match self.transfer(&path).await {
                    Ok(report) => TransferResult::Transferred(report),
                    Err(error) => {
                        warn!(path = %path, %error, "transfer failed; file left pending");
                        TransferResult::Failed {
                            path,
                            error: error.to_string(),
                        }
                    }
                }
            })
            .buffer_unordered(concurrency.max(1));

        while let Some(result) = in_flight.next().await {
            on_result(&result);
            results.push(result);
        }
        results
    }
}
