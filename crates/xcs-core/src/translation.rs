//! Declarative legacy → canonical field translation.
//!
//! A `TranslationMap` pairs each canonical field with the legacy column it is
//! read from. The five built-in maps are bundled in `TranslationSet::standard()`
//! and handed to the transfer and reconciliation engines at construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::accessor::{CanonicalRecord, Storage};
use crate::entities::{Crystal, DataProcessing, Dimple, Lab, Refinement};
use crate::enums::RecordKind;
use crate::errors::CoreError;
use crate::value::FieldValue;

/// One row of a legacy main table, keyed by column name.
pub type LegacyRow = BTreeMap<String, FieldValue>;

/// Legacy column holding the crystal name in every soak database.
pub const LEGACY_CRYSTAL_NAME: &str = "CrystalName";

/// Legacy column holding the compound SMILES in every soak database.
pub const LEGACY_COMPOUND: &str = "CompoundSMILES";

/// `canonical field → legacy column` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub canonical: String,
    pub legacy: String,
}

/// Translation table for one canonical record kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationMap {
    pub kind: RecordKind,
    pub entries: Vec<Translation>,
    /// Legacy columns of which at least one must be non-empty for a row to
    /// yield a record of this kind. Empty means every row qualifies.
    #[serde(default)]
    pub presence: Vec<String>,
}

impl TranslationMap {
    fn new(kind: RecordKind, pairs: &[(&str, &str)]) -> Self {
        Self {
            kind,
            entries: pairs
                .iter()
                .map(|(canonical, legacy)| Translation {
                    canonical: (*canonical).to_string(),
                    legacy: (*legacy).to_string(),
                })
                .collect(),
            presence: Vec::new(),
        }
    }

    fn with_presence(mut self, columns: &[&str]) -> Self {
        self.presence = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Whether `row` carries data for this kind at all.
    #[must_use]
    pub fn is_present(&self, row: &LegacyRow) -> bool {
        self.presence.is_empty()
            || self
                .presence
                .iter()
                .any(|column| row.get(column).is_some_and(|value| !value.is_falsy()))
    }

    /// Build a canonical record from a legacy row.
    ///
    /// Missing legacy columns translate to `Null`. Values are coerced to the
    /// accessor's `FieldKind`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Lookup` if a canonical field has no accessor on `T`.
    pub fn apply<T: CanonicalRecord>(&self, row: &LegacyRow) -> Result<T, CoreError> {
        let mut record = T::default();
        for entry in &self.entries {
            let accessor = T::accessor(&entry.canonical).ok_or_else(|| {
                CoreError::Lookup(format!(
                    "{} has no field '{}'",
                    T::KIND,
                    entry.canonical
                ))
            })?;
            let raw = row.get(&entry.legacy).unwrap_or(&FieldValue::Null);
            (accessor.set)(&mut record, raw.coerce(accessor.kind));
        }
        Ok(record)
    }

    /// Verify every entry resolves to an accessor of `T`.
    fn check_for<T: CanonicalRecord>(&self) -> Result<(), CoreError> {
        if self.kind != T::KIND {
            return Err(CoreError::Lookup(format!(
                "translation map for {} registered as {}",
                self.kind,
                T::KIND
            )));
        }
        for entry in &self.entries {
            if T::accessor(&entry.canonical).is_none() {
                return Err(CoreError::Lookup(format!(
                    "{} has no field '{}'",
                    T::KIND,
                    entry.canonical
                )));
            }
        }
        let has_crystal_name = self.entries.iter().any(|entry| {
            T::accessor(&entry.canonical)
                .is_some_and(|accessor| accessor.storage == Storage::CrystalName)
        });
        if !has_crystal_name {
            return Err(CoreError::Lookup(format!(
                "{} translation does not map the crystal name",
                T::KIND
            )));
        }
        Ok(())
    }
}

/// The five translation maps, one per canonical record kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationSet {
    pub crystal: TranslationMap,
    pub lab: TranslationMap,
    pub refinement: TranslationMap,
    pub dimple: TranslationMap,
    pub data_processing: TranslationMap,
}

impl TranslationSet {
    /// Translation maps for the standard soak database layout.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            crystal: TranslationMap::new(
                RecordKind::Crystal,
                &[
                    ("crystal_name", LEGACY_CRYSTAL_NAME),
                    ("compound", LEGACY_COMPOUND),
                    ("compound_code", "CompoundCode"),
                    ("target", "ProteinName"),
                ],
            ),
            lab: TranslationMap::new(
                RecordKind::Lab,
                &[
                    ("crystal_name", LEGACY_CRYSTAL_NAME),
                    ("smiles", LEGACY_COMPOUND),
                    ("protein", "ProteinName"),
                    ("library_name", "LibraryName"),
                    ("library_plate", "LibraryPlate"),
                    ("stock_conc", "CompoundStockConcentration"),
                    ("compound_conc", "CompoundConcentration"),
                    ("solv_frac", "SolventFraction"),
                    ("soak_vol", "SoakTransferVol"),
                    ("soak_status", "SoakStatus"),
                    ("soak_time", "SoakingTime"),
                    ("cryo_stock_frac", "CryoStockFraction"),
                    ("cryo_frac", "CryoFraction"),
                    ("cryo_transfer_vol", "CryoTransferVolume"),
                    ("cryo_status", "CryoStatus"),
                    ("harvest_status", "HarvestStatus"),
                    ("mounting_result", "MountingResult"),
                    ("mounting_time", "MountingTime"),
                    ("data_collection_visit", "DataCollectionVisit"),
                ],
            ),
            refinement: TranslationMap::new(
                RecordKind::Refinement,
                &[
                    ("crystal_name", LEGACY_CRYSTAL_NAME),
                    ("outcome", "RefinementOutcome"),
                    ("status", "RefinementStatus"),
                    ("refinement_path", "RefinementPathToRefinementFolder"),
                    ("pdb_latest", "RefinementPDB_latest"),
                    ("mtz_latest", "RefinementMTZ_latest"),
                    ("mtz_free", "RefinementMTZfree"),
                    ("cif", "RefinementCIF"),
                    ("cif_status", "RefinementCIFStatus"),
                    ("cif_prog", "RefinementCIFprogram"),
                    ("bound_conf", "RefinementBoundConformation"),
                    ("lig_cc", "RefinementLigandCC"),
                    ("lig_confidence", "RefinementLigandConfidence"),
                    ("matrix_weight", "RefinementMatrixWeight"),
                    ("spacegroup", "RefinementSpaceGroup"),
                    ("res", "RefinementResolution"),
                    ("r_free", "RefinementRfree"),
                    ("rcryst", "RefinementRcryst"),
                    ("rmsd_bonds", "RefinementRmsdBonds"),
                    ("rmsd_angles", "RefinementRmsdAngles"),
                    ("molprobity_score", "RefinementMolProbityScore"),
                    ("ramachandran_favoured", "RefinementRamachandranFavored"),
                    ("ramachandran_outliers", "RefinementRamachandranOutliers"),
                ],
            ),
            dimple: TranslationMap::new(
                RecordKind::Dimple,
                &[
                    ("crystal_name", LEGACY_CRYSTAL_NAME),
                    ("reference", "DimpleReferencePDB"),
                    ("pdb_path", "DimplePathToPDB"),
                    ("mtz_path", "DimplePathToMTZ"),
                    ("r_free", "DimpleRfree"),
                    ("res_high", "DimpleResolutionHigh"),
                    ("status", "DimpleStatus"),
                ],
            )
            .with_presence(&["DimplePathToPDB", "DimplePathToMTZ"]),
            data_processing: TranslationMap::new(
                RecordKind::DataProcessing,
                &[
                    ("crystal_name", LEGACY_CRYSTAL_NAME),
                    ("program", "DataProcessingProgram"),
                    ("auto_assigned", "DataProcessingAutoAssigned"),
                    ("spacegroup", "DataProcessingSpaceGroup"),
                    ("unit_cell", "DataProcessingUnitCell"),
                    ("res_low", "DataProcessingResolutionLow"),
                    ("res_high", "DataProcessingResolutionHigh"),
                    ("r_merge_overall", "DataProcessingRmergeOverall"),
                    ("isig_high", "DataProcessingIsigHigh"),
                    ("cchalf_high", "DataProcessingCChalfHigh"),
                    ("completeness_overall", "DataProcessingCompletenessOverall"),
                    ("multiplicity_overall", "DataProcessingMultiplicityOverall"),
                    ("unique_ref_overall", "DataProcessingUniqueReflectionsOverall"),
                    ("log_name", "DataProcessingPathToLogfile"),
                    ("mtz_name", "DataProcessingPathToMTZfile"),
                ],
            ),
        }
    }

    #[must_use]
    pub const fn get(&self, kind: RecordKind) -> &TranslationMap {
        match kind {
            RecordKind::Crystal => &self.crystal,
            RecordKind::Lab => &self.lab,
            RecordKind::Refinement => &self.refinement,
            RecordKind::Dimple => &self.dimple,
            RecordKind::DataProcessing => &self.data_processing,
        }
    }

    /// Verify every canonical field resolves to a typed accessor and every
    /// map names the crystal column.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Lookup` naming the first unresolved field.
    pub fn check(&self) -> Result<(), CoreError> {
        self.crystal.check_for::<Crystal>()?;
        self.lab.check_for::<Lab>()?;
        self.refinement.check_for::<Refinement>()?;
        self.dimple.check_for::<Dimple>()?;
        self.data_processing.check_for::<DataProcessing>()?;
        Ok(())
    }
}

impl Default for TranslationSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(pairs: &[(&str, FieldValue)]) -> LegacyRow {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn standard_set_resolves() {
        TranslationSet::standard().check().unwrap();
    }

    #[test]
    fn unknown_canonical_field_is_rejected() {
        let mut set = TranslationSet::standard();
        set.lab.entries.push(Translation {
            canonical: "not_a_field".into(),
            legacy: "Whatever".into(),
        });
        let err = set.check().unwrap_err();
        assert!(err.to_string().contains("not_a_field"));
    }

    #[test]
    fn map_without_crystal_name_is_rejected() {
        let mut set = TranslationSet::standard();
        set.refinement
            .entries
            .retain(|entry| entry.canonical != "crystal_name");
        assert!(matches!(set.check(), Err(CoreError::Lookup(_))));
    }

    #[test]
    fn apply_coerces_by_kind() {
        let set = TranslationSet::standard();
        let legacy = row(&[
            ("CrystalName", FieldValue::from("x0001")),
            ("RefinementOutcome", FieldValue::from("3 - In Refinement")),
            ("RefinementRfree", FieldValue::from("0.245")),
            ("RefinementResolution", FieldValue::from("n/a")),
            ("RefinementSpaceGroup", FieldValue::from("P 1 21 1")),
        ]);
        let record: Refinement = set.refinement.apply(&legacy).unwrap();
        assert_eq!(record.crystal_name, "x0001");
        assert_eq!(record.outcome, Some(3));
        assert_eq!(record.r_free, Some(0.245));
        assert_eq!(record.res, None);
        assert_eq!(record.spacegroup.as_deref(), Some("P 1 21 1"));
        assert_eq!(record.cif, None);
    }

    #[test]
    fn dimple_presence_requires_a_path() {
        let set = TranslationSet::standard();
        let empty = row(&[
            ("CrystalName", FieldValue::from("x0001")),
            ("DimplePathToPDB", FieldValue::from("")),
            ("DimplePathToMTZ", FieldValue::Null),
        ]);
        assert!(!set.dimple.is_present(&empty));

        let with_mtz = row(&[
            ("CrystalName", FieldValue::from("x0001")),
            ("DimplePathToMTZ", FieldValue::from("/dimple/final.mtz")),
        ]);
        assert!(set.dimple.is_present(&with_mtz));
        assert!(set.lab.is_present(&empty));
    }

    #[test]
    fn reference_translation_sets_reference_pdb() {
        let set = TranslationSet::standard();
        let legacy = row(&[
            ("CrystalName", FieldValue::from("x0001")),
            ("DimpleReferencePDB", FieldValue::from("/refs/apo.pdb")),
            ("DimplePathToPDB", FieldValue::from("/dimple/final.pdb")),
        ]);
        let record: Dimple = set.dimple.apply(&legacy).unwrap();
        assert_eq!(record.reference_pdb.as_deref(), Some("/refs/apo.pdb"));
        assert_eq!(record.reference_id, None);
    }
}
