use serde::{Deserialize, Serialize};

use crate::accessor::{CanonicalRecord, FieldAccessor, Storage, column_field, crystal_name_field};
use crate::enums::RecordKind;
use crate::value::{FieldKind, FieldValue};

/// Result of a dimple run against a reference model.
///
/// Keyed by `(crystal_id, reference_id)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dimple {
    pub id: i64,
    pub crystal_id: i64,
    pub crystal_name: String,
    pub reference_id: Option<i64>,
    pub reference_pdb: Option<String>,
    pub pdb_path: Option<String>,
    pub mtz_path: Option<String>,
    pub r_free: Option<f64>,
    pub res_high: Option<f64>,
    pub status: Option<String>,
}

static FIELDS: &[FieldAccessor<Dimple>] = &[
    crystal_name_field!(Dimple),
    FieldAccessor {
        name: "reference",
        kind: FieldKind::Text,
        storage: Storage::Reference,
        get: |record| FieldValue::integer(record.reference_id),
        set: |record, value| record.reference_pdb = value.into_text(),
        deref: Some(|record| FieldValue::text(&record.reference_pdb)),
    },
    column_field!(Dimple, pdb_path, Text),
    column_field!(Dimple, mtz_path, Text),
    column_field!(Dimple, r_free, Real),
    column_field!(Dimple, res_high, Real),
    column_field!(Dimple, status, Text),
];

impl CanonicalRecord for Dimple {
    const KIND: RecordKind = RecordKind::Dimple;

    fn fields() -> &'static [FieldAccessor<Self>] {
        FIELDS
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn crystal_id(&self) -> i64 {
        self.crystal_id
    }

    fn set_crystal_id(&mut self, id: i64) {
        self.crystal_id = id;
    }

    fn crystal_name(&self) -> &str {
        &self.crystal_name
    }

    fn reference_id(&self) -> Option<i64> {
        self.reference_id
    }

    fn set_reference_id(&mut self, id: Option<i64>) {
        self.reference_id = id;
    }
}
