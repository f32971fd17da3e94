use serde::{Deserialize, Serialize};

use crate::accessor::{CanonicalRecord, FieldAccessor, column_field, crystal_name_field};
use crate::enums::RecordKind;

/// Latest refinement state for one crystal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Refinement {
    pub id: i64,
    pub crystal_id: i64,
    pub crystal_name: String,
    pub outcome: Option<i64>,
    pub status: Option<String>,
    pub refinement_path: Option<String>,
    pub pdb_latest: Option<String>,
    pub mtz_latest: Option<String>,
    pub mtz_free: Option<String>,
    pub cif: Option<String>,
    pub cif_status: Option<String>,
    pub cif_prog: Option<String>,
    pub bound_conf: Option<String>,
    pub lig_cc: Option<String>,
    pub lig_confidence: Option<String>,
    pub matrix_weight: Option<String>,
    pub spacegroup: Option<String>,
    pub res: Option<f64>,
    pub r_free: Option<f64>,
    pub rcryst: Option<f64>,
    pub rmsd_bonds: Option<f64>,
    pub rmsd_angles: Option<f64>,
    pub molprobity_score: Option<f64>,
    pub ramachandran_favoured: Option<f64>,
    pub ramachandran_outliers: Option<f64>,
}

static FIELDS: &[FieldAccessor<Refinement>] = &[
    crystal_name_field!(Refinement),
    column_field!(Refinement, outcome, Outcome),
    column_field!(Refinement, status, Text),
    column_field!(Refinement, refinement_path, Text),
    column_field!(Refinement, pdb_latest, Text),
    column_field!(Refinement, mtz_latest, Text),
    column_field!(Refinement, mtz_free, Text),
    column_field!(Refinement, cif, Text),
    column_field!(Refinement, cif_status, Text),
    column_field!(Refinement, cif_prog, Text),
    column_field!(Refinement, bound_conf, Text),
    column_field!(Refinement, lig_cc, Text),
    column_field!(Refinement, lig_confidence, Text),
    column_field!(Refinement, matrix_weight, Text),
    column_field!(Refinement, spacegroup, Text),
    column_field!(Refinement, res, Real),
    column_field!(Refinement, r_free, Real),
    column_field!(Refinement, rcryst, Real),
    column_field!(Refinement, rmsd_bonds, Real),
    column_field!(Refinement, rmsd_angles, Real),
    column_field!(Refinement, molprobity_score, Real),
    column_field!(Refinement, ramachandran_favoured, Real),
    column_field!(Refinement, ramachandran_outliers, Real),
];

impl CanonicalRecord for Refinement {
    const KIND: RecordKind = RecordKind::Refinement;

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
