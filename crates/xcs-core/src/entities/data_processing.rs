use serde::{Deserialize, Serialize};

use crate::accessor::{CanonicalRecord, FieldAccessor, column_field, crystal_name_field};
use crate::enums::RecordKind;

/// Data-reduction statistics for one crystal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DataProcessing {
    pub id: i64,
    pub crystal_id: i64,
    pub crystal_name: String,
    pub program: Option<String>,
    pub auto_assigned: Option<String>,
    pub spacegroup: Option<String>,
    pub unit_cell: Option<String>,
    pub res_low: Option<f64>,
    pub res_high: Option<f64>,
    pub r_merge_overall: Option<f64>,
    pub isig_high: Option<f64>,
    pub cchalf_high: Option<f64>,
    pub completeness_overall: Option<f64>,
    pub multiplicity_overall: Option<f64>,
    pub unique_ref_overall: Option<i64>,
    pub log_name: Option<String>,
    pub mtz_name: Option<String>,
}

static FIELDS: &[FieldAccessor<DataProcessing>] = &[
    crystal_name_field!(DataProcessing),
    column_field!(DataProcessing, program, Text),
    column_field!(DataProcessing, auto_assigned, Text),
    column_field!(DataProcessing, spacegroup, Text),
    column_field!(DataProcessing, unit_cell, Text),
    column_field!(DataProcessing, res_low, Real),
    column_field!(DataProcessing, res_high, Real),
    column_field!(DataProcessing, r_merge_overall, Real),
    column_field!(DataProcessing, isig_high, Real),
    column_field!(DataProcessing, cchalf_high, Real),
    column_field!(DataProcessing, completeness_overall, Real),
    column_field!(DataProcessing, multiplicity_overall, Real),
    column_field!(DataProcessing, unique_ref_overall, Integer),
    column_field!(DataProcessing, log_name, Text),
    column_field!(DataProcessing, mtz_name, Text),
];

impl CanonicalRecord for DataProcessing {
    const KIND: RecordKind = RecordKind::DataProcessing;

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
