//! Reconciliation of legacy files against the canonical store.
//!
//! Validation never fails a batch. Every (file, kind) pair yields exactly one
//! [`ValidationOutcome`]: clean (nothing written), a diff report, or an error
//! artifact. Errors are collected per field and per row; anything that stops
//! a whole file is recorded as a single file-scoped error entry.

pub mod report;

use std::path::{Path, PathBuf};

use futures::StreamExt;
use futures::stream;
use serde::Serialize;
use tracing::{debug, info, warn};
use xcs_config::LegacyConfig;
use xcs_core::accessor::{CanonicalRecord, Storage};
use xcs_core::compare::{DiffEntry, compare_row};
use xcs_core::entities::{Crystal, DataProcessing, Dimple, Lab, Refinement};
use xcs_core::enums::RecordKind;
use xcs_core::errors::CoreError;
use xcs_core::translation::{LegacyRow, TranslationMap, TranslationSet};

use crate::error::DatabaseError;
use crate::legacy::LegacyReader;
use crate::modtime::ModTimeSource;
use crate::repos::crystal::CrystalKey;
use crate::service::SyncService;

pub use report::{ErrorArtifact, ErrorEntry, FileReportSink, ReportName, ReportSink};

/// Used in report names when the file's modification time cannot be read.
const UNKNOWN_MODIFICATION_TIME: &str = "unknown";

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ValidationResult {
    /// No diffs and no errors; nothing written.
    Clean,
    Diffs { count: usize, report: PathBuf },
    Failed { errors: usize, artifact: PathBuf },
    /// The outcome could not be written; `message` says why.
    Unreported { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    pub path: String,
    pub kind: RecordKind,
    pub modification_time: String,
    /// Legacy rows read.
    pub rows: usize,
    /// Rows compared against exactly one canonical record.
    pub matched: usize,
    /// Rows not compared: no crystal name, or no dimple run.
    pub skipped: usize,
    /// Fields of matched rows whose values agree.
    pub fields_equal: usize,
    /// Fields of matched rows left uncompared (empty, no outcome token,
    /// null-equivalent, or no legacy column).
    pub fields_skipped: usize,
    #[serde(flatten)]
    pub result: ValidationResult,
}

impl ValidationOutcome {
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        matches!(self.result, ValidationResult::Clean)
    }
}

/// Accumulated findings for one (file, kind) pair.
#[derive(Debug, Default)]
struct FileScan {
    rows: usize,
    matched: usize,
    skipped: usize,
    fields_equal: usize,
    fields_skipped: usize,
    diffs: Vec<DiffEntry>,
    errors: Vec<ErrorEntry>,
}

pub struct ReconciliationValidator<'a> {
    service: &'a SyncService,
    translations: TranslationSet,
    mtime: &'a dyn ModTimeSource,
    sink: &'a dyn ReportSink,
    main_table: String,
    report_segments: Vec<usize>,
}

impl<'a> ReconciliationValidator<'a> {
    /// # Errors
    ///
    /// Returns `CoreError::Lookup` if a translation map names a field the
    /// canonical record does not have.
    pub fn new(
        service: &'a SyncService,
        translations: TranslationSet,
        mtime: &'a dyn ModTimeSource,
        sink: &'a dyn ReportSink,
        legacy: &LegacyConfig,
    ) -> Result<Self, DatabaseError> {
        translations.check()?;
        Ok(Self {
            service,
            translations,
            mtime,
            sink,
            main_table: legacy.main_table.clone(),
            report_segments: legacy.report_segments.clone(),
        })
    }

    /// Compare every legacy row of `path` against its canonical `kind` record
    /// and write the outcome.
    pub async fn validate(&self, path: &str, kind: RecordKind) -> ValidationOutcome {
        let modification_time = self
            .mtime
            .modification_time(Path::new(path))
            .unwrap_or_else(|error| {
                debug!(path, %error, "no modification time for report name");
                UNKNOWN_MODIFICATION_TIME.to_string()
            });

        let scanned = match kind {
            RecordKind::Crystal => self.scan::<Crystal>(path).await,
            RecordKind::Lab => self.scan::<Lab>(path).await,
            RecordKind::Refinement => self.scan::<Refinement>(path).await,
            RecordKind::Dimple => self.scan::<Dimple>(path).await,
            RecordKind::DataProcessing => self.scan::<DataProcessing>(path).await,
        };
        let scan = scanned.unwrap_or_else(|error| FileScan {
            errors: vec![ErrorEntry {
                crystal: None,
                field: None,
                message: error.to_string(),
            }],
            ..FileScan::default()
        });

        let name = ReportName::new(path, &self.report_segments, &modification_time, kind);
        let result = self.write_outcome(path, kind, &modification_time, &name, &scan);
        match &result {
            ValidationResult::Clean => debug!(path, kind = %kind, "validation clean"),
            ValidationResult::Diffs { count, report } => {
                info!(path, kind = %kind, count, report = %report.display(), "diffs found");
            }
            ValidationResult::Failed { errors, artifact } => {
                warn!(path, kind = %kind, errors, artifact = %artifact.display(), "validation failed");
            }
            ValidationResult::Unreported { message } => {
                warn!(path, kind = %kind, %message, "validation outcome not written");
            }
        }

        ValidationOutcome {
            path: path.to_string(),
            kind,
            modification_time,
            rows: scan.rows,
            matched: scan.matched,
            skipped: scan.skipped,
            fields_equal: scan.fields_equal,
            fields_skipped: scan.fields_skipped,
            result,
        }
    }

    fn write_outcome(
        &self,
        path: &str,
        kind: RecordKind,
        modification_time: &str,
        name: &ReportName,
        scan: &FileScan,
    ) -> ValidationResult {
        let written = if !scan.errors.is_empty() {
            let artifact = ErrorArtifact {
                path: path.to_string(),
                kind,
                modification_time: modification_time.to_string(),
                errors: scan.errors.clone(),
                diff_count: scan.diffs.len(),
            };
            self.sink
                .write_errors(name, &artifact)
                .map(|artifact| ValidationResult::Failed {
                    errors: scan.errors.len(),
                    artifact,
                })
        } else if !scan.diffs.is_empty() {
            self.sink
                .write_diffs(name, &scan.diffs)
                .map(|report| ValidationResult::Diffs {
                    count: scan.diffs.len(),
                    report,
                })
        } else {
            Ok(ValidationResult::Clean)
        };
        written.unwrap_or_else(|error| ValidationResult::Unreported {
            message: error.to_string(),
        })
    }

    async fn scan<T: CanonicalRecord>(&self, path: &str) -> Result<FileScan, DatabaseError> {
        let file = self
            .service
            .get_tracked_file(path)
            .await?
            .ok_or_else(|| CoreError::MissingRecord {
                kind: "tracked file".into(),
                key: path.to_string(),
            })?;
        let reader = LegacyReader::open(path).await?;
        if !reader.has_table(&self.main_table).await? {
            warn!(path, table = %self.main_table, "legacy file has no main table; nothing to compare");
            return Ok(FileScan::default());
        }

        let map = self.translations.get(T::KIND);
        let mut scan = FileScan::default();
        for row in reader.rows(&self.main_table).await? {
            scan.rows += 1;
            let identity: Crystal = match self.translations.crystal.apply(&row) {
                Ok(identity) => identity,
                Err(error) => {
                    scan.errors.push(ErrorEntry {
                        crystal: None,
                        field: None,
                        message: error.to_string(),
                    });
                    continue;
                }
            };
            if identity.crystal_name.trim().is_empty() {
                scan.skipped += 1;
                continue;
            }
            if let Err(error) = self
                .compare_legacy_row::<T>(map, file.id, &identity, &row, &mut scan)
                .await
            {
                scan.errors.push(ErrorEntry {
                    crystal: Some(identity.crystal_name.clone()),
                    field: None,
                    message: error.to_string(),
                });
            }
        }
        Ok(scan)
    }

    async fn compare_legacy_row<T: CanonicalRecord>(
        &self,
        map: &TranslationMap,
        file_id: i64,
        identity: &Crystal,
        row: &LegacyRow,
        scan: &mut FileScan,
    ) -> Result<(), DatabaseError> {
        let key = CrystalKey::new(&identity.crystal_name, file_id, identity.compound.as_deref());
        let mut candidates = self.service.find_records::<T>(&key).await?;
        if T::keyed_by_reference() && candidates.len() > 1 {
            let legacy: T = map.apply(row)?;
            candidates.retain(|candidate| same_reference(candidate, &legacy));
        }

        let record = match candidates.as_slice() {
            [] if !map.is_present(row) => {
                debug!(crystal = %key.name, kind = %T::KIND, "no legacy data for kind; skipped");
                scan.skipped += 1;
                return Ok(());
            }
            [] => {
                return Err(CoreError::MissingRecord {
                    kind: T::KIND.to_string(),
                    key: key.to_string(),
                }
                .into());
            }
            [record] => record,
            _ => {
                return Err(CoreError::AmbiguousRecord {
                    kind: T::KIND.to_string(),
                    key: key.to_string(),
                    count: candidates.len(),
                }
                .into());
            }
        };

        let comparison = compare_row(record, map, row);
        for (field, error) in comparison.errors() {
            scan.errors.push(ErrorEntry {
                crystal: Some(identity.crystal_name.clone()),
                field: Some(field.canonical_field.clone()),
                message: error.to_string(),
            });
        }
        scan.diffs.extend(comparison.diffs().cloned());
        scan.fields_equal += comparison.matched();
        scan.fields_skipped += comparison.skipped();
        scan.matched += 1;
        Ok(())
    }

    /// Validate every `(path, kind)` pair with at most `concurrency` in
    /// flight. One outcome per pair.
    pub async fn validate_all(
        &self,
        paths: Vec<String>,
        kinds: &[RecordKind],
        concurrency: usize,
    ) -> Vec<ValidationOutcome> {
        self.validate_all_with(paths, kinds, concurrency, |_| {}).await
    }

    /// [`Self::validate_all`], calling `on_result` as each pair finishes.
    pub async fn validate_all_with(
        &self,
        paths: Vec<String>,
        kinds: &[RecordKind],
        concurrency: usize,
        mut on_result: impl FnMut(&ValidationOutcome),
    ) -> Vec<ValidationOutcome> {
        let jobs: Vec<(String, RecordKind)> = paths
            .into_iter()
            .flat_map(|path| kinds.iter().map(move |kind| (path.clone(), *kind)))
            .collect();
        let mut outcomes = Vec::with_capacity(jobs.len());
        let mut in_flight = stream::iter(jobs)
            .map(|(path, kind)| async move { self.validate(&path, kind).await })
            .buffer_unordered(concurrency.max(1));
        while let Some(outcome) = in_flight.next().await {
            on_result(&outcome);
            outcomes.push(outcome);
        }
        outcomes
    }
}

/// Whether two records point at the same reference model, compared by the
/// reference's effective value.
fn same_reference<T: CanonicalRecord>(candidate: &T, legacy: &T) -> bool {
    T::fields()
        .iter()
        .filter(|field| field.storage == Storage::Reference)
        .all(|field| field.comparison_value(candidate) == field.comparison_value(legacy))
}
