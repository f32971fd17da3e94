use serde::{Deserialize, Serialize};

use crate::accessor::{
    CanonicalRecord, FieldAccessor, column_field, compound_field, crystal_name_field,
};
use crate::enums::RecordKind;

/// Root experimental entity.
///
/// Identity is `(crystal_name, file_id, compound)`; the compound is matched
/// null-safely so crystals without a SMILES string are still unique.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Crystal {
    pub id: i64,
    pub file_id: i64,
    pub crystal_name: String,
    pub compound: Option<String>,
    pub compound_code: Option<String>,
    pub target: Option<String>,
}

static FIELDS: &[FieldAccessor<Crystal>] = &[
    crystal_name_field!(Crystal),
    compound_field!(Crystal, compound),
    column_field!(Crystal, compound_code, Text),
    column_field!(Crystal, target, Text),
];

impl CanonicalRecord for Crystal {
    const KIND: RecordKind = RecordKind::Crystal;

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
        self.id
    }

    fn set_crystal_id(&mut self, id: i64) {
        self.id = id;
    }

    fn crystal_name(&self) -> &str {
        &self.crystal_name
    }

    fn set_file_id(&mut self, file_id: i64) {
        self.file_id = file_id;
    }
}
