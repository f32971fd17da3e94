use serde::{Deserialize, Serialize};

use crate::accessor::{
    CanonicalRecord, FieldAccessor, column_field, compound_field, crystal_name_field,
};
use crate::enums::RecordKind;

/// Soaking, cryo and harvesting details for one crystal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Lab {
    pub id: i64,
    pub crystal_id: i64,
    pub crystal_name: String,
    pub smiles: Option<String>,
    pub protein: Option<String>,
    pub library_name: Option<String>,
    pub library_plate: Option<String>,
    pub stock_conc: Option<f64>,
    pub compound_conc: Option<f64>,
    pub solv_frac: Option<f64>,
    pub soak_vol: Option<f64>,
    pub soak_status: Option<String>,
    pub soak_time: Option<String>,
    pub cryo_stock_frac: Option<f64>,
    pub cryo_frac: Option<f64>,
    pub cryo_transfer_vol: Option<f64>,
    pub cryo_status: Option<String>,
    pub harvest_status: Option<String>,
    pub mounting_result: Option<String>,
    pub mounting_time: Option<String>,
    pub data_collection_visit: Option<String>,
}

static FIELDS: &[FieldAccessor<Lab>] = &[
    crystal_name_field!(Lab),
    compound_field!(Lab, smiles),
    column_field!(Lab, protein, Text),
    column_field!(Lab, library_name, Text),
    column_field!(Lab, library_plate, Text),
    column_field!(Lab, stock_conc, Real),
    column_field!(Lab, compound_conc, Real),
    column_field!(Lab, solv_frac, Real),
    column_field!(Lab, soak_vol, Real),
    column_field!(Lab, soak_status, Text),
    column_field!(Lab, soak_time, Text),
    column_field!(Lab, cryo_stock_frac, Real),
    column_field!(Lab, cryo_frac, Real),
    column_field!(Lab, cryo_transfer_vol, Real),
    column_field!(Lab, cryo_status, Text),
    column_field!(Lab, harvest_status, Text),
    column_field!(Lab, mounting_result, Text),
    column_field!(Lab, mounting_time, Text),
    column_field!(Lab, data_collection_visit, Text),
];

impl CanonicalRecord for Lab {
    const KIND: RecordKind = RecordKind::Lab;

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
}
