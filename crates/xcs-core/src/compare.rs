//! Field-level reconciliation between a legacy row and its canonical record.
//!
//! Each mapped field yields a `FieldOutcome` (match / diff / skipped / error).
//! Outcomes are aggregated per row into a `RowComparison`; the validator in
//! `xcs-db` aggregates rows into one result per file.

use serde::{Deserialize, Serialize};

use crate::accessor::{CanonicalRecord, FieldAccessor};
use crate::errors::CoreError;
use crate::translation::{LegacyRow, TranslationMap};
use crate::value::{FieldKind, FieldValue};

/// One detected mismatch between a legacy value and its canonical value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub crystal: String,
    pub legacy_field: String,
    pub canonical_field: String,
    pub legacy_value: FieldValue,
    pub canonical_value: FieldValue,
}

/// Why a field was not compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Legacy value is null, empty, `"None"` or zero.
    EmptyLegacy,
    /// Outcome field without an integer token.
    NoOutcomeToken,
    /// Values differ but the legacy value means "no information".
    NullEquivalent,
    /// The legacy table has no such column.
    MissingLegacyColumn,
}

/// Result of comparing a single field.
#[derive(Debug)]
pub enum FieldOutcome {
    Match,
    Diff(DiffEntry),
    Skipped(SkipReason),
    Error(CoreError),
}

/// Per-field outcome with the names it was resolved through.
#[derive(Debug)]
pub struct FieldResult {
    pub canonical_field: String,
    pub legacy_field: String,
    pub outcome: FieldOutcome,
}

/// All field outcomes for one legacy row.
#[derive(Debug, Default)]
pub struct RowComparison {
    pub fields: Vec<FieldResult>,
}

impl RowComparison {
    pub fn diffs(&self) -> impl Iterator<Item = &DiffEntry> {
        self.fields.iter().filter_map(|field| match &field.outcome {
            FieldOutcome::Diff(diff) => Some(diff),
            _ => None,
        })
    }

    pub fn errors(&self) -> impl Iterator<Item = (&FieldResult, &CoreError)> {
        self.fields.iter().filter_map(|field| match &field.outcome {
            FieldOutcome::Error(error) => Some((field, error)),
            _ => None,
        })
    }

    #[must_use]
    pub fn matched(&self) -> usize {
        self.fields
            .iter()
            .filter(|field| matches!(field.outcome, FieldOutcome::Match))
            .count()
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.fields
            .iter()
            .filter(|field| matches!(field.outcome, FieldOutcome::Skipped(_)))
            .count()
    }
}

/// Compare every field in `map` between `record` and `row`.
#[must_use]
pub fn compare_row<T: CanonicalRecord>(
    record: &T,
    map: &TranslationMap,
    row: &LegacyRow,
) -> RowComparison {
    let fields = map
        .entries
        .iter()
        .map(|entry| {
            let outcome = match (T::accessor(&entry.canonical), row.get(&entry.legacy)) {
                (None, _) => FieldOutcome::Error(CoreError::AttributeMismatch {
                    field: entry.canonical.clone(),
                    reason: format!("{} has no such field", T::KIND),
                }),
                (Some(_), None) => FieldOutcome::Skipped(SkipReason::MissingLegacyColumn),
                (Some(accessor), Some(raw)) => compare_field(record, accessor, &entry.legacy, raw),
            };
            FieldResult {
                canonical_field: entry.canonical.clone(),
                legacy_field: entry.legacy.clone(),
                outcome,
            }
        })
        .collect();
    RowComparison { fields }
}

/// Compare one canonical field against its raw legacy value.
pub fn compare_field<T: CanonicalRecord>(
    record: &T,
    accessor: &FieldAccessor<T>,
    legacy_field: &str,
    raw: &FieldValue,
) -> FieldOutcome {
    let legacy = if accessor.kind == FieldKind::Outcome {
        match raw.extract_outcome() {
            Some(outcome) => FieldValue::Integer(outcome),
            None => return FieldOutcome::Skipped(SkipReason::NoOutcomeToken),
        }
    } else {
        raw.clone()
    };

    if legacy.is_falsy() {
        return FieldOutcome::Skipped(SkipReason::EmptyLegacy);
    }

    let canonical = accessor.comparison_value(record);
    if values_equal(accessor.kind, &canonical, &legacy) {
        return FieldOutcome::Match;
    }
    if raw.is_null_equivalent() {
        return FieldOutcome::Skipped(SkipReason::NullEquivalent);
    }

    FieldOutcome::Diff(DiffEntry {
        crystal: record.crystal_name().to_string(),
        legacy_field: legacy_field.to_string(),
        canonical_field: accessor.name.to_string(),
        legacy_value: legacy,
        canonical_value: canonical,
    })
}

/// Numeric kinds are compared after casting both sides to the same type;
/// anything that does not cast falls back to textual equality.
#[allow(clippy::float_cmp)]
fn values_equal(kind: FieldKind, canonical: &FieldValue, legacy: &FieldValue) -> bool {
    let numeric = match kind {
        FieldKind::Real => canonical
            .as_f64()
            .zip(legacy.as_f64())
            .map(|(a, b)| a == b),
        FieldKind::Integer | FieldKind::Outcome => canonical
            .as_i64()
            .zip(legacy.as_i64())
            .map(|(a, b)| a == b),
        FieldKind::Text => None,
    };
    numeric.unwrap_or_else(|| canonical.as_text() == legacy.as_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{DataProcessing, Dimple, Lab, Refinement};
    use crate::translation::TranslationSet;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn refinement() -> Refinement {
        Refinement {
            id: 1,
            crystal_id: 1,
            crystal_name: "x0001".into(),
            outcome: Some(3),
            r_free: Some(0.25),
            spacegroup: Some("P 1".into()),
            ..Refinement::default()
        }
    }

    fn outcome_of(record: &Refinement, field: &str, raw: FieldValue) -> FieldOutcome {
        let accessor = Refinement::accessor(field).unwrap();
        compare_field(record, accessor, "Legacy", &raw)
    }

    #[test]
    fn outcome_token_matches_integer() {
        let outcome = outcome_of(&refinement(), "outcome", FieldValue::from("3 - good"));
        assert!(matches!(outcome, FieldOutcome::Match));
    }

    #[test]
    fn outcome_without_token_is_skipped() {
        let outcome = outcome_of(&refinement(), "outcome", FieldValue::from("bad"));
        assert!(matches!(
            outcome,
            FieldOutcome::Skipped(SkipReason::NoOutcomeToken)
        ));

        let mut other = refinement();
        other.outcome = Some(99);
        let outcome = outcome_of(&other, "outcome", FieldValue::from("bad"));
        assert!(matches!(outcome, FieldOutcome::Skipped(_)));
    }

    #[test]
    fn outcome_mismatch_is_reported_as_integer() {
        let outcome = outcome_of(&refinement(), "outcome", FieldValue::from("5 - deposited"));
        let FieldOutcome::Diff(diff) = outcome else {
            panic!("expected diff");
        };
        assert_eq!(diff.legacy_value, FieldValue::Integer(5));
        assert_eq!(diff.canonical_value, FieldValue::Integer(3));
        assert_eq!(diff.canonical_field, "outcome");
        assert_eq!(diff.crystal, "x0001");
    }

    #[rstest]
    #[case("n/a")]
    #[case("-")]
    #[case("pending")]
    #[case("NULL")]
    #[case("#NAME?")]
    #[case("#NOM?")]
    #[case("None\t")]
    #[case("Analysis Pending")]
    #[case("in-situ")]
    #[case("null")]
    fn null_equivalents_suppress_diffs(#[case] raw: &str) {
        let outcome = outcome_of(&refinement(), "spacegroup", FieldValue::from(raw));
        assert!(
            matches!(outcome, FieldOutcome::Skipped(SkipReason::NullEquivalent)),
            "{raw:?} -> {outcome:?}"
        );
        let outcome = outcome_of(&refinement(), "r_free", FieldValue::from(raw));
        assert!(matches!(outcome, FieldOutcome::Skipped(_)), "{raw:?}");
    }

    #[rstest]
    #[case(FieldValue::Null)]
    #[case(FieldValue::from(""))]
    #[case(FieldValue::from("None"))]
    #[case(FieldValue::Integer(0))]
    fn empty_legacy_is_skipped(#[case] raw: FieldValue) {
        let outcome = outcome_of(&refinement(), "spacegroup", raw);
        assert!(matches!(
            outcome,
            FieldOutcome::Skipped(SkipReason::EmptyLegacy)
        ));
    }

    #[test]
    fn numeric_cast_equality() {
        let record = DataProcessing {
            crystal_name: "x0001".into(),
            unique_ref_overall: Some(1),
            ..DataProcessing::default()
        };
        let accessor = DataProcessing::accessor("unique_ref_overall").unwrap();
        let outcome = compare_field(&record, accessor, "Legacy", &FieldValue::from("1"));
        assert!(matches!(outcome, FieldOutcome::Match));

        let outcome = outcome_of(&refinement(), "r_free", FieldValue::from("0.250"));
        assert!(matches!(outcome, FieldOutcome::Match));
        let outcome = outcome_of(&refinement(), "r_free", FieldValue::Real(0.25));
        assert!(matches!(outcome, FieldOutcome::Match));
        let outcome = outcome_of(&refinement(), "r_free", FieldValue::from("0.3"));
        assert!(matches!(outcome, FieldOutcome::Diff(_)));
    }

    #[test]
    fn text_mismatch_is_reported() {
        let outcome = outcome_of(&refinement(), "spacegroup", FieldValue::from("C 2"));
        let FieldOutcome::Diff(diff) = outcome else {
            panic!("expected diff");
        };
        assert_eq!(diff.legacy_value, FieldValue::from("C 2"));
        assert_eq!(diff.canonical_value, FieldValue::from("P 1"));
    }

    #[test]
    fn canonical_null_against_legacy_value_is_a_diff() {
        let outcome = outcome_of(&refinement(), "cif", FieldValue::from("ligand.cif"));
        let FieldOutcome::Diff(diff) = outcome else {
            panic!("expected diff");
        };
        assert_eq!(diff.canonical_value, FieldValue::Null);
    }

    #[test]
    fn reference_compares_through_reference_pdb() {
        let record = Dimple {
            crystal_name: "x0001".into(),
            reference_id: Some(7),
            reference_pdb: Some("/refs/apo.pdb".into()),
            ..Dimple::default()
        };
        let accessor = Dimple::accessor("reference").unwrap();
        let outcome = compare_field(
            &record,
            accessor,
            "DimpleReferencePDB",
            &FieldValue::from("/refs/apo.pdb"),
        );
        assert!(matches!(outcome, FieldOutcome::Match));

        let outcome = compare_field(
            &record,
            accessor,
            "DimpleReferencePDB",
            &FieldValue::from("/refs/other.pdb"),
        );
        assert!(matches!(outcome, FieldOutcome::Diff(_)));
    }

    #[test]
    fn compare_row_aggregates_outcomes() {
        let set = TranslationSet::standard();
        let record = Lab {
            crystal_name: "x0001".into(),
            smiles: Some("CCO".into()),
            soak_status: Some("done".into()),
            stock_conc: Some(100.0),
            ..Lab::default()
        };
        let row: LegacyRow = [
            ("CrystalName", FieldValue::from("x0001")),
            ("CompoundSMILES", FieldValue::from("CCO")),
            ("SoakStatus", FieldValue::from("failed")),
            ("CompoundStockConcentration", FieldValue::from("100")),
            ("CryoStatus", FieldValue::from("n/a")),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let comparison = compare_row(&record, &set.lab, &row);
        let diffs: Vec<_> = comparison.diffs().collect();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].canonical_field, "soak_status");
        assert_eq!(comparison.matched(), 3);
        assert_eq!(comparison.errors().count(), 0);
        assert_eq!(
            comparison.skipped(),
            set.lab.entries.len() - comparison.matched() - 1
        );
    }
}
