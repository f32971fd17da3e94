//! End-to-end sync cycle tests
//!
//! Drives one legacy soak database through the full cycle:
//! - register / reconcile (bootstrap, baseline, change detection)
//! - transfer (idempotent upserts, changed-file retirement, proposals)
//! - validate (clean after import, diffs after canonical edits)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use xcs_config::LegacyConfig;
use xcs_core::entities::{Crystal, DataProcessing, Dimple, Lab, Refinement};
use xcs_core::enums::{FileStatus, RecordKind};
use xcs_core::errors::CoreError;
use xcs_core::translation::TranslationSet;
use xcs_db::error::DatabaseError;
use xcs_db::modtime::ModTimeSource;
use xcs_db::owners::ConfiguredOwners;
use xcs_db::proposal::ProposalExtractor;
use xcs_db::service::SyncService;
use xcs_db::tracker::StatusTracker;
use xcs_db::transfer::TransferEngine;
use xcs_db::validate::{FileReportSink, ReconciliationValidator, ValidationResult};

/// Every path reports the same, settable modification time.
struct Clock(Mutex<String>);

impl Clock {
    fn at(time: &str) -> Self {
        Self(Mutex::new(time.to_string()))
    }

    fn set(&self, time: &str) {
        *self.0.lock().unwrap() = time.to_string();
    }
}

impl ModTimeSource for Clock {
    fn modification_time(&self, _path: &Path) -> Result<String, DatabaseError> {
        Ok(self.0.lock().unwrap().clone())
    }
}

/// One legacy row as `(column, value)` pairs; all values are text.
type Row<'a> = &'a [(&'a str, &'a str)];

async fn write_legacy(path: &Path, rows: &[Row<'_>]) {
    if path.exists() {
        std::fs::remove_file(path).unwrap();
    }
    let db = libsql::Builder::new_local(path).build().await.unwrap();
    let conn = db.connect().unwrap();
    let mut columns: Vec<&str> = rows.iter().flat_map(|r| r.iter().map(|(c, _)| *c)).collect();
    columns.sort_unstable();
    columns.dedup();
    let defs: Vec<String> = columns.iter().map(|c| format!("\"{c}\"")).collect();
    conn.execute(&format!("CREATE TABLE mainTable ({})", defs.join(", ")), ())
        .await
        .unwrap();
    for row in rows {
        let names: Vec<String> = row.iter().map(|(c, _)| format!("\"{c}\"")).collect();
        let slots: Vec<String> = (1..=row.len()).map(|i| format!("?{i}")).collect();
        let values: Vec<String> = row.iter().map(|(_, v)| (*v).to_string()).collect();
        conn.execute(
            &format!(
                "INSERT INTO mainTable ({}) VALUES ({})",
                names.join(", "),
                slots.join(", ")
            ),
            libsql::params_from_iter(values),
        )
        .await
        .unwrap();
    }
}

const X1: Row<'static> = &[
    ("CrystalName", "x0001"),
    ("CompoundSMILES", "CCO"),
    ("ProteinName", "Mpro"),
    ("SoakStatus", "done"),
    ("RefinementOutcome", "3 - In Refinement"),
    ("RefinementResolution", "1.8"),
    ("DimplePathToPDB", "/dimple/x0001/final.pdb"),
    ("DimpleReferencePDB", "/refs/apo.pdb"),
    ("DataProcessingProgram", "xia2"),
];

const X2: Row<'static> = &[
    ("CrystalName", "x0002"),
    ("CompoundSMILES", "CCN"),
    ("ProteinName", "Mpro"),
    ("SoakStatus", "pending"),
    ("RefinementOutcome", "None"),
    ("DimplePathToPDB", ""),
    ("DataProcessingProgram", "autoPROC"),
];

struct Site {
    _dir: TempDir,
    path: String,
    segment: usize,
}

impl Site {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let visit = dir.path().join("lb18145-7");
        std::fs::create_dir_all(&visit).unwrap();
        let path: PathBuf = visit.join("soakDBDataFile.sqlite");
        let path = path.to_str().unwrap().to_string();
        let segment = path.split('/').count() - 2;
        Self {
            _dir: dir,
            path,
            segment,
        }
    }
}

async fn service() -> SyncService {
    SyncService::new_local(":memory:").await.unwrap()
}

fn owners() -> ConfiguredOwners {
    ConfiguredOwners::new(BTreeMap::from([(
        "lb18145".to_string(),
        vec!["abc12345".to_string()],
    )]))
}

fn engine<'a>(
    svc: &'a SyncService,
    owners: &'a ConfiguredOwners,
    clock: &'a Clock,
    segment: usize,
) -> TransferEngine<'a> {
    TransferEngine::new(
        svc,
        TranslationSet::standard(),
        ProposalExtractor::new(svc, owners, segment),
        clock,
        &LegacyConfig::default(),
    )
    .unwrap()
}

async fn snapshot(svc: &SyncService, file_id: i64) -> String {
    let crystals: Vec<Crystal> = svc.records_for_file(file_id).await.unwrap();
    let labs: Vec<Lab> = svc.records_for_file(file_id).await.unwrap();
    let refinements: Vec<Refinement> = svc.records_for_file(file_id).await.unwrap();
    let dimples: Vec<Dimple> = svc.records_for_file(file_id).await.unwrap();
    let processing: Vec<DataProcessing> = svc.records_for_file(file_id).await.unwrap();
    serde_json::to_string(&(crystals, labs, refinements, dimples, processing)).unwrap()
}

// ---------------------------------------------------------------------------
// Registration and status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_twice_is_a_consistency_error() {
    let site = Site::new();
    let svc = service().await;
    let clock = Clock::at("20240101000000");
    let tracker = StatusTracker::new(&svc, &clock, site.segment);

    let file = tracker.register(&site.path).await.unwrap();
    assert_eq!(file.status, FileStatus::New);
    assert_eq!(file.visit.as_deref(), Some("lb18145-7"));
    assert_eq!(file.proposal.as_deref(), Some("lb18145"));

    let err = tracker.register(&site.path).await.unwrap_err();
    assert!(matches!(err.as_core(), Some(CoreError::Consistency(_))));
}

#[tokio::test]
async fn full_cycle() {
    let site = Site::new();
    write_legacy(Path::new(&site.path), &[X1, X2]).await;
    let svc = service().await;
    let owners = owners();
    let clock = Clock::at("20240101000000");
    let tracker = StatusTracker::new(&svc, &clock, site.segment);
    let engine = engine(&svc, &owners, &clock, site.segment);

    // First sighting registers; the second pass records the baseline.
    let report = tracker.reconcile([site.path.as_str()]).await.unwrap();
    assert_eq!(report.registered, vec![site.path.clone()]);
    let report = tracker.reconcile([site.path.as_str()]).await.unwrap();
    assert!(report.bootstrapped);
    assert_eq!(report.baselined, vec![site.path.clone()]);
    assert_eq!(tracker.pending().await.unwrap().len(), 1);

    let results = engine.transfer_pending(2).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(!results[0].is_failed());
    let file = svc.get_tracked_file(&site.path).await.unwrap().unwrap();
    assert_eq!(file.status, FileStatus::Unchanged);
    assert_eq!(svc.count_records(RecordKind::Crystal).await.unwrap(), 2);
    assert_eq!(svc.count_records(RecordKind::Dimple).await.unwrap(), 1);

    let proposal = svc.get_proposal("lb18145").await.unwrap().unwrap();
    assert!(proposal.owners.contains("abc12345"));

    // Same or older time: still unchanged.
    let report = tracker.reconcile([site.path.as_str()]).await.unwrap();
    assert!(!report.bootstrapped);
    assert_eq!(report.kept, 1);
    clock.set("20231231000000");
    tracker.reconcile([site.path.as_str()]).await.unwrap();
    let file = svc.get_tracked_file(&site.path).await.unwrap().unwrap();
    assert_eq!(file.status, FileStatus::Unchanged);

    // Newer time: changed. x0002 is gone from the new legacy contents.
    write_legacy(Path::new(&site.path), &[X1]).await;
    clock.set("20240102000000");
    let report = tracker.reconcile([site.path.as_str()]).await.unwrap();
    assert_eq!(report.changed, vec![site.path.clone()]);

    let report = engine.transfer(&site.path).await.unwrap();
    assert_eq!(report.retired, 2);
    assert_eq!(report.status, FileStatus::Unchanged);
    let crystals: Vec<Crystal> = svc.records_for_file(file.id).await.unwrap();
    let names: Vec<&str> = crystals.iter().map(|c| c.crystal_name.as_str()).collect();
    assert_eq!(names, vec!["x0001"]);
    let file = svc.get_tracked_file(&site.path).await.unwrap().unwrap();
    assert_eq!(file.modification_time.as_deref(), Some("20240102000000"));
    assert_eq!(file.proposal.as_deref(), Some("lb18145"));
}

#[tokio::test]
async fn empty_lab_table_resets_every_file_to_new() {
    let site = Site::new();
    write_legacy(Path::new(&site.path), &[X1]).await;
    let svc = service().await;
    let owners = owners();
    let clock = Clock::at("20240101000000");
    let tracker = StatusTracker::new(&svc, &clock, site.segment);
    tracker.register(&site.path).await.unwrap();
    engine(&svc, &owners, &clock, site.segment)
        .transfer(&site.path)
        .await
        .unwrap();

    svc.db().conn().execute("DELETE FROM lab", ()).await.unwrap();
    let report = tracker.reconcile([site.path.as_str()]).await.unwrap();
    assert!(report.bootstrapped);
    let file = svc.get_tracked_file(&site.path).await.unwrap().unwrap();
    assert_eq!(file.status, FileStatus::New);
}

// ---------------------------------------------------------------------------
// Transfer
// ---------------------------------------------------------------------------

#[tokio::test]
async fn transfer_twice_yields_identical_records() {
    let site = Site::new();
    write_legacy(Path::new(&site.path), &[X1, X2]).await;
    let svc = service().await;
    let owners = owners();
    let clock = Clock::at("20240101000000");
    let file = svc.insert_tracked_file(&site.path, None).await.unwrap();
    let engine = engine(&svc, &owners, &clock, site.segment);

    engine.transfer(&site.path).await.unwrap();
    let first = snapshot(&svc, file.id).await;
    svc.set_file_status(file.id, FileStatus::New).await.unwrap();
    engine.transfer(&site.path).await.unwrap();
    let second = snapshot(&svc, file.id).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn concurrent_transfers_of_one_path_do_not_duplicate() {
    let site = Site::new();
    write_legacy(Path::new(&site.path), &[X1, X2]).await;
    let svc = service().await;
    let owners = owners();
    let clock = Clock::at("20240101000000");
    svc.insert_tracked_file(&site.path, None).await.unwrap();
    let engine = engine(&svc, &owners, &clock, site.segment);

    let results = engine
        .transfer_many(vec![site.path.clone(), site.path.clone()], 2, |_| {})
        .await;
    assert!(results.iter().all(|r| !r.is_failed()));
    assert_eq!(svc.count_records(RecordKind::Crystal).await.unwrap(), 2);
    assert_eq!(svc.count_records(RecordKind::Lab).await.unwrap(), 2);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validate_after_transfer() {
    let site = Site::new();
    write_legacy(Path::new(&site.path), &[X1, X2]).await;
    let svc = service().await;
    let owners = owners();
    let clock = Clock::at("20240101000000");
    svc.insert_tracked_file(&site.path, None).await.unwrap();
    engine(&svc, &owners, &clock, site.segment)
        .transfer(&site.path)
        .await
        .unwrap();

    let reports = TempDir::new().unwrap();
    let sink = FileReportSink::new(reports.path());
    let validator = ReconciliationValidator::new(
        &svc,
        TranslationSet::standard(),
        &clock,
        &sink,
        &LegacyConfig::default(),
    )
    .unwrap();

    let outcomes = validator
        .validate_all(vec![site.path.clone()], &RecordKind::IMPORT_ORDER, 4)
        .await;
    assert_eq!(outcomes.len(), RecordKind::IMPORT_ORDER.len());
    assert!(outcomes.iter().all(|o| o.is_clean()), "{outcomes:?}");

    // x0001 now differs on outcome and resolution; x0002 carries neither
    // value in the legacy file.
    svc.db()
        .conn()
        .execute("UPDATE refinement SET res = 2.0, outcome = 4", ())
        .await
        .unwrap();
    let outcome = validator.validate(&site.path, RecordKind::Refinement).await;
    let ValidationResult::Diffs { count, report } = &outcome.result else {
        panic!("expected diffs, got {outcome:?}");
    };
    assert_eq!(*count, 2);
    let written = std::fs::read_to_string(report).unwrap();
    assert_eq!(written.lines().count(), 2);
}
