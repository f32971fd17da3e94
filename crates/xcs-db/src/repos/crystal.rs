//! Crystal repository: composite-identity upsert plus the shared
//! compound and reference-model lookups.

use std::fmt;

use xcs_core::accessor::CanonicalRecord;
use xcs_core::entities::Crystal;
use xcs_core::enums::RecordKind;
use xcs_core::errors::CoreError;

use crate::error::DatabaseError;
use crate::helpers::{opt_text, to_sql_value};
use crate::service::SyncService;

/// Crystal identity: name, owning file, and compound (matched null-safely).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrystalKey<'a> {
    pub name: &'a str,
    pub file_id: i64,
    pub compound: Option<&'a str>,
}

impl<'a> CrystalKey<'a> {
    #[must_use]
    pub fn new(name: &'a str, file_id: i64, compound: Option<&'a str>) -> Self {
        Self {
            name,
            file_id,
            compound: compound.filter(|c| !c.is_empty()),
        }
    }
}

impl fmt::Display for CrystalKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "crystal '{}' (file {}, compound {})",
            self.name,
            self.file_id,
            self.compound.unwrap_or("none")
        )
    }
}

impl SyncService {
    /// Id of the compound with this SMILES string, inserting it if needed.
    pub async fn upsert_compound(&self, smiles: &str) -> Result<i64, DatabaseError> {
        self.db()
            .conn()
            .execute(
                "INSERT INTO compounds (smiles) VALUES (?1) ON CONFLICT(smiles) DO NOTHING",
                [smiles],
            )
            .await?;
        let mut rows = self
            .db()
            .conn()
            .query("SELECT id FROM compounds WHERE smiles = ?1", [smiles])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<i64>(0)?)
    }

    /// Id of the reference model with this PDB path, inserting it if needed.
    pub async fn upsert_reference(&self, reference_pdb: &str) -> Result<i64, DatabaseError> {
        self.db()
            .conn()
            .execute(
                "INSERT INTO reference_models (reference_pdb) VALUES (?1)
                 ON CONFLICT(reference_pdb) DO NOTHING",
                [reference_pdb],
            )
            .await?;
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id FROM reference_models WHERE reference_pdb = ?1",
                [reference_pdb],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<i64>(0)?)
    }

    /// Ids of crystals matching `key`. More than one means corrupted state.
    pub async fn find_crystal_ids(&self, key: &CrystalKey<'_>) -> Result<Vec<i64>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT c.id FROM crystals c
                 LEFT JOIN compounds p ON p.id = c.compound_id
                 WHERE c.crystal_name = ?1 AND c.file_id = ?2 AND p.smiles IS ?3
                 ORDER BY c.id",
                libsql::params![key.name, key.file_id, opt_text(key.compound)],
            )
            .await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<i64>(0)?);
        }
        Ok(ids)
    }

    /// Insert or update a crystal by its composite identity. Sets `crystal.id`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::AmbiguousRecord` if more than one crystal already
    /// carries the identity.
    pub async fn upsert_crystal(&self, crystal: &mut Crystal) -> Result<i64, DatabaseError> {
        let compound_id = match crystal.compound.as_deref().filter(|c| !c.is_empty()) {
            Some(smiles) => Some(self.upsert_compound(smiles).await?),
            None => None,
        };
        let key = CrystalKey::new(&crystal.crystal_name, crystal.file_id, crystal.compound.as_deref());
        let existing = self.find_crystal_ids(&key).await?;

        let columns: Vec<_> = Crystal::columns().collect();
        let id = match existing.as_slice() {
            [] => {
                let mut names = vec!["crystal_name", "file_id", "compound_id"];
                let mut params: Vec<libsql::Value> = vec![
                    crystal.crystal_name.clone().into(),
                    crystal.file_id.into(),
                    compound_id.map_or(libsql::Value::Null, Into::into),
                ];
                for column in &columns {
                    names.push(column.name);
                    params.push(to_sql_value((column.get)(crystal)));
                }
                let placeholders: Vec<String> =
                    (1..=names.len()).map(|i| format!("?{i}")).collect();
                let mut rows = self
                    .db()
                    .conn()
                    .query(
                        &format!(
                            "INSERT INTO crystals ({}) VALUES ({}) RETURNING id",
                            names.join(", "),
                            placeholders.join(", ")
                        ),
                        libsql::params_from_iter(params),
                    )
                    .await?;
                let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
                row.get::<i64>(0)?
            }
            [id] => {
                let sets: Vec<String> = columns
                    .iter()
                    .enumerate()
                    .map(|(i, column)| format!("{} = ?{}", column.name, i + 1))
                    .collect();
                let mut params: Vec<libsql::Value> = columns
                    .iter()
                    .map(|column| to_sql_value((column.get)(crystal)))
                    .collect();
                params.push((*id).into());
                self.db()
                    .conn()
                    .execute(
                        &format!(
                            "UPDATE crystals SET {} WHERE id = ?{}",
                            sets.join(", "),
                            columns.len() + 1
                        ),
                        libsql::params_from_iter(params),
                    )
                    .await?;
                *id
            }
            many => {
                return Err(CoreError::AmbiguousRecord {
                    kind: RecordKind::Crystal.to_string(),
                    key: key.to_string(),
                    count: many.len(),
                }
                .into());
            }
        };

        crystal.id = id;
        Ok(id)
    }

    /// Remove every crystal imported from a file. Dependent records go with
    /// them through `ON DELETE CASCADE`.
    pub async fn delete_crystals_for_file(&self, file_id: i64) -> Result<u64, DatabaseError> {
        let deleted = self
            .db()
            .conn()
            .execute("DELETE FROM crystals WHERE file_id = ?1", [file_id])
            .await?;
        Ok(deleted)
    }

    /// Row count of a canonical record table.
    pub async fn count_records(&self, kind: RecordKind) -> Result<i64, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT COUNT(*) FROM {}", kind.table()), ())
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<i64>(0)?)
    }

    /// Whether the canonical lab table holds no rows at all.
    pub async fn lab_is_empty(&self) -> Result<bool, DatabaseError> {
        Ok(self.count_records(RecordKind::Lab).await? == 0)
    }
}
