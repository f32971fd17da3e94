//! Read-only access to legacy soak database files.
//!
//! Legacy files are plain `SQLite` databases with one main table holding a
//! row per crystal. Columns are loosely typed; every cell is read as a
//! `FieldValue` and left to the translation maps to coerce.

use std::path::{Path, PathBuf};

use libsql::{Builder, OpenFlags};
use tracing::debug;
use xcs_core::translation::LegacyRow;

use crate::error::DatabaseError;
use crate::helpers::{from_sql_value, quote_ident};

/// An open legacy soak database.
pub struct LegacyReader {
    path: PathBuf,
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl LegacyReader {
    /// Open an existing legacy file read-only.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Io` (`NotFound`) if the file does not exist;
    /// opening must never create an empty database in its place.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("legacy file '{}' does not exist", path.display()),
            )
            .into());
        }
        let db = Builder::new_local(path)
            .flags(OpenFlags::SQLITE_OPEN_READ_ONLY)
            .build()
            .await?;
        let conn = db.connect()?;
        Ok(Self {
            path: path.to_path_buf(),
            db,
            conn,
        })
    }

    /// Whether the file has a table named `table`.
    pub async fn has_table(&self, table: &str) -> Result<bool, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
            )
            .await?;
        Ok(rows.next().await?.is_some())
    }

    /// Every row of `table`, keyed by column name, in storage order.
    pub async fn rows(&self, table: &str) -> Result<Vec<LegacyRow>, DatabaseError> {
        let mut rows = self
            .conn
            .query(&format!("SELECT * FROM {}", quote_ident(table)), ())
            .await?;

        let columns: Vec<String> = (0..rows.column_count())
            .map(|idx| rows.column_name(idx).unwrap_or_default().to_string())
            .collect();

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let mut legacy = LegacyRow::new();
            for (idx, column) in (0_i32..).zip(&columns) {
                legacy.insert(column.clone(), from_sql_value(row.get_value(idx)?));
            }
            out.push(legacy);
        }
        debug!(path = %self.path.display(), table, rows = out.len(), "read legacy rows");
        Ok(out)
    }
}
