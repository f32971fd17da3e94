//! Shared test utilities for xcs-db unit tests.

pub(crate) mod helpers {
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};

    use std::sync::Mutex;

    use xcs_core::value::FieldValue;

    use crate::XcsDb;
    use crate::error::DatabaseError;
    use crate::modtime::ModTimeSource;
    use crate::service::SyncService;

    /// Modification times set by hand; unknown paths fail like a missing file.
    #[derive(Default)]
    pub struct FakeModTime {
        times: Mutex<BTreeMap<PathBuf, String>>,
    }

    impl FakeModTime {
        pub fn set(&self, path: impl Into<PathBuf>, time: &str) {
            self.times
                .lock()
                .unwrap()
                .insert(path.into(), time.to_string());
        }
    }

    impl ModTimeSource for FakeModTime {
        fn modification_time(&self, path: &Path) -> Result<String, DatabaseError> {
            self.times.lock().unwrap().get(path).cloned().ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, path.display().to_string())
                    .into()
            })
        }
    }

    /// In-memory service with a migrated schema.
    pub async fn test_service() -> SyncService {
        let db = XcsDb::open_local(":memory:").await.unwrap();
        SyncService::from_db(db)
    }

    /// Create a legacy soak database at `path` with a `mainTable` holding `rows`.
    ///
    /// Columns are the union of every row's keys, all untyped.
    pub async fn write_legacy_file(path: &Path, rows: &[BTreeMap<String, FieldValue>]) {
        let db = libsql::Builder::new_local(path).build().await.unwrap();
        let conn = db.connect().unwrap();
        let mut columns: Vec<&str> = rows
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect();
        columns.sort_unstable();
        columns.dedup();
        let defs: Vec<String> = columns.iter().map(|c| format!("\"{c}\"")).collect();
        conn.execute(&format!("CREATE TABLE mainTable ({})", defs.join(", ")), ())
            .await
            .unwrap();
        for row in rows {
            let names: Vec<String> = row.keys().map(|c| format!("\"{c}\"")).collect();
            let placeholders: Vec<String> = (1..=row.len()).map(|i| format!("?{i}")).collect();
            let params: Vec<libsql::Value> = row
                .values()
                .cloned()
                .map(crate::helpers::to_sql_value)
                .collect();
            conn.execute(
                &format!(
                    "INSERT INTO mainTable ({}) VALUES ({})",
                    names.join(", "),
                    placeholders.join(", ")
                ),
                libsql::params_from_iter(params),
            )
            .await
            .unwrap();
        }
    }

    /// Build a legacy row from `(column, value)` pairs.
    pub fn legacy_row(pairs: &[(&str, FieldValue)]) -> BTreeMap<String, FieldValue> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    /// Path under `root` shaped like `{root}/lb18145-1/soakDBDataFile.sqlite`,
    /// with the visit segment index for that layout.
    pub fn visit_path(root: &Path, visit: &str) -> (PathBuf, usize) {
        let dir = root.join(visit);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("soakDBDataFile.sqlite");
        let segment = path.to_str().unwrap().split('/').count() - 2;
        (path, segment)
    }
}
