//! Generic repository for canonical records.
//!
//! SQL is assembled from each record type's static accessor table: own
//! columns come from `Storage::Column` accessors, the crystal name and
//! compound from the owning crystal, the reference from `reference_models`.

use xcs_core::accessor::{CanonicalRecord, FieldAccessor, Storage};
use xcs_core::enums::RecordKind;
use xcs_core::errors::CoreError;

use crate::error::DatabaseError;
use crate::helpers::{get_field_value, opt_integer, opt_text, to_sql_value};
use crate::repos::crystal::CrystalKey;
use crate::service::SyncService;

/// Alias of the table holding `T`'s own columns in the joined query.
fn own_alias<T: CanonicalRecord>() -> &'static str {
    if T::KIND == RecordKind::Crystal { "c" } else { "t" }
}

fn select_expr<T: CanonicalRecord>(accessor: &FieldAccessor<T>) -> String {
    match accessor.storage {
        Storage::Column => format!("{}.{}", own_alias::<T>(), accessor.name),
        Storage::CrystalName => "c.crystal_name".to_string(),
        Storage::Compound => "p.smiles".to_string(),
        Storage::Reference => "r.reference_pdb".to_string(),
    }
}

/// `SELECT ... FROM ...` for `T`, joined to its crystal and lookups.
///
/// Column layout: record id, crystal id, file id, reference id, then one
/// column per accessor in table order.
fn select_sql<T: CanonicalRecord>() -> String {
    let own = own_alias::<T>();
    let reference = if T::keyed_by_reference() {
        format!("{own}.reference_id")
    } else {
        "NULL".to_string()
    };
    let fields: Vec<String> = T::fields().iter().map(select_expr).collect();

    let mut from = if T::KIND == RecordKind::Crystal {
        "crystals c".to_string()
    } else {
        format!("{} t JOIN crystals c ON c.id = t.crystal_id", T::KIND.table())
    };
    from.push_str(" LEFT JOIN compounds p ON p.id = c.compound_id");
    if T::keyed_by_reference() {
        from.push_str(&format!(
            " LEFT JOIN reference_models r ON r.id = {own}.reference_id"
        ));
    }

    format!(
        "SELECT {own}.id, c.id, c.file_id, {reference}, {} FROM {from}",
        fields.join(", ")
    )
}

fn row_to_record<T: CanonicalRecord>(row: &libsql::Row) -> Result<T, DatabaseError> {
    let mut record = T::default();
    record.set_id(row.get::<i64>(0)?);
    record.set_crystal_id(row.get::<i64>(1)?);
    record.set_file_id(row.get::<i64>(2)?);
    record.set_reference_id(row.get::<Option<i64>>(3)?);
    for (offset, accessor) in T::fields().iter().enumerate() {
        let idx = i32::try_from(offset + 4)
            .map_err(|e| DatabaseError::Query(format!("column index out of range: {e}")))?;
        let value = get_field_value(row, idx)?.coerce(accessor.kind);
        (accessor.set)(&mut record, value);
    }
    Ok(record)
}

impl SyncService {
    /// Records of kind `T` whose crystal matches `key`.
    pub async fn find_records<T: CanonicalRecord>(
        &self,
        key: &CrystalKey<'_>,
    ) -> Result<Vec<T>, DatabaseError> {
        let sql = format!(
            "{} WHERE c.crystal_name = ?1 AND c.file_id = ?2 AND p.smiles IS ?3 ORDER BY {}.id",
            select_sql::<T>(),
            own_alias::<T>()
        );
        let mut rows = self
            .db()
            .conn()
            .query(
                &sql,
                libsql::params![key.name, key.file_id, opt_text(key.compound)],
            )
            .await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(row_to_record(&row)?);
        }
        Ok(records)
    }

    /// All records of kind `T` imported from one file, ordered by crystal name.
    pub async fn records_for_file<T: CanonicalRecord>(
        &self,
        file_id: i64,
    ) -> Result<Vec<T>, DatabaseError> {
        let sql = format!(
            "{} WHERE c.file_id = ?1 ORDER BY c.crystal_name, {}.id",
            select_sql::<T>(),
            own_alias::<T>()
        );
        let mut rows = self.db().conn().query(&sql, [file_id]).await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(row_to_record(&row)?);
        }
        Ok(records)
    }

    /// Insert or update a dependent record keyed by its crystal (and
    /// reference, for kinds keyed by one). Sets the record's id.
    ///
    /// `record.crystal_id()` must already point at an imported crystal.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for `Crystal` (use
    /// `upsert_crystal`), and `CoreError::AmbiguousRecord` if the key already
    /// matches more than one row.
    pub async fn upsert_record<T: CanonicalRecord>(
        &self,
        record: &mut T,
    ) -> Result<i64, DatabaseError> {
        if T::KIND == RecordKind::Crystal {
            return Err(DatabaseError::InvalidState(
                "crystals are upserted by identity, not by crystal id".into(),
            ));
        }
        let table = T::KIND.table();
        let by_reference = T::keyed_by_reference();

        let mut lookup = format!("SELECT id FROM {table} WHERE crystal_id = ?1");
        let mut lookup_params = vec![libsql::Value::Integer(record.crystal_id())];
        if by_reference {
            lookup.push_str(" AND reference_id IS ?2");
            lookup_params.push(opt_integer(record.reference_id()));
        }
        let mut rows = self
            .db()
            .conn()
            .query(&lookup, libsql::params_from_iter(lookup_params))
            .await?;
        let mut existing = Vec::new();
        while let Some(row) = rows.next().await? {
            existing.push(row.get::<i64>(0)?);
        }

        let mut names = vec!["crystal_id"];
        let mut params = vec![libsql::Value::Integer(record.crystal_id())];
        if by_reference {
            names.push("reference_id");
            params.push(opt_integer(record.reference_id()));
        }
        for column in T::columns() {
            names.push(column.name);
            params.push(to_sql_value((column.get)(record)));
        }

        let id = match existing.as_slice() {
            [] => {
                let placeholders: Vec<String> =
                    (1..=names.len()).map(|i| format!("?{i}")).collect();
                let mut rows = self
                    .db()
                    .conn()
                    .query(
                        &format!(
                            "INSERT INTO {table} ({}) VALUES ({}) RETURNING id",
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
                let sets: Vec<String> = names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| format!("{name} = ?{}", i + 1))
                    .collect();
                params.push(libsql::Value::Integer(*id));
                self.db()
                    .conn()
                    .execute(
                        &format!(
                            "UPDATE {table} SET {} WHERE id = ?{}",
                            sets.join(", "),
                            names.len() + 1
                        ),
                        libsql::params_from_iter(params),
                    )
                    .await?;
                *id
            }
            many => {
                return Err(CoreError::AmbiguousRecord {
                    kind: T::KIND.to_string(),
                    key: format!(
                        "crystal id {} (reference {:?})",
                        record.crystal_id(),
                        record.reference_id()
                    ),
                    count: many.len(),
                }
                .into());
            }
        };

        record.set_id(id);
        Ok(id)
    }
}
