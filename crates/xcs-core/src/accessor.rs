//! Static field-accessor tables for canonical records.
//!
//! Every canonical record type exposes a `&'static [FieldAccessor<Self>]`
//! built at compile time. Translation maps and the reconciliation engine
//! resolve canonical field names through these tables; nothing is looked up
//! by constructing code at runtime.

use crate::enums::RecordKind;
use crate::value::{FieldKind, FieldValue};

/// Where a canonical field lives in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// A column on the record's own table, named after the field.
    Column,
    /// The owning crystal's name (part of the crystal identity).
    CrystalName,
    /// The owning crystal's compound SMILES (part of the crystal identity).
    Compound,
    /// Foreign key into `reference_models`; compared through `reference_pdb`.
    Reference,
}

/// Typed read/write access to one canonical field.
pub struct FieldAccessor<T> {
    pub name: &'static str,
    pub kind: FieldKind,
    pub storage: Storage,
    pub get: fn(&T) -> FieldValue,
    pub set: fn(&mut T, FieldValue),
    /// Comparison value behind a reference-typed field, read only when the
    /// legacy side is non-empty.
    pub deref: Option<fn(&T) -> FieldValue>,
}

impl<T> FieldAccessor<T> {
    /// Value used when comparing against a non-empty legacy value.
    #[must_use]
    pub fn comparison_value(&self, record: &T) -> FieldValue {
        self.deref.map_or_else(|| (self.get)(record), |deref| deref(record))
    }
}

impl<T> std::fmt::Debug for FieldAccessor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldAccessor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}

/// A canonical record populated from legacy rows.
///
/// `Crystal` implements this too, with `crystal_id() == id()`.
pub trait CanonicalRecord: Default + Clone + Send + Sync + 'static {
    const KIND: RecordKind;

    /// Static accessor table, in schema column order.
    fn fields() -> &'static [FieldAccessor<Self>];

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
    fn crystal_id(&self) -> i64;
    fn set_crystal_id(&mut self, id: i64);
    fn crystal_name(&self) -> &str;

    /// Foreign key into `reference_models`, for kinds keyed by reference.
    fn reference_id(&self) -> Option<i64> {
        None
    }

    fn set_reference_id(&mut self, _id: Option<i64>) {}

    /// Owning tracked file, for kinds that store it directly.
    fn set_file_id(&mut self, _file_id: i64) {}

    /// Resolve a canonical field name.
    #[must_use]
    fn accessor(name: &str) -> Option<&'static FieldAccessor<Self>> {
        Self::fields().iter().find(|field| field.name == name)
    }

    /// Accessors stored as columns on the record's own table.
    fn columns() -> impl Iterator<Item = &'static FieldAccessor<Self>> {
        Self::fields()
            .iter()
            .filter(|field| field.storage == Storage::Column)
    }

    /// Whether records of this kind are keyed by a reference model as well as
    /// by their crystal.
    #[must_use]
    fn keyed_by_reference() -> bool {
        Self::fields()
            .iter()
            .any(|field| field.storage == Storage::Reference)
    }
}

/// Accessor for an `Option<_>` field stored in a column of the same name.
macro_rules! column_field {
    ($ty:ty, $field:ident, Text) => {
        $crate::accessor::FieldAccessor::<$ty> {
            name: stringify!($field),
            kind: $crate::value::FieldKind::Text,
            storage: $crate::accessor::Storage::Column,
            get: |record| $crate::value::FieldValue::text(&record.$field),
            set: |record, value| record.$field = value.into_text(),
            deref: None,
        }
    };
    ($ty:ty, $field:ident, Integer) => {
        $crate::accessor::FieldAccessor::<$ty> {
            name: stringify!($field),
            kind: $crate::value::FieldKind::Integer,
            storage: $crate::accessor::Storage::Column,
            get: |record| $crate::value::FieldValue::integer(record.$field),
            set: |record, value| record.$field = value.into_integer(),
            deref: None,
        }
    };
    ($ty:ty, $field:ident, Real) => {
        $crate::accessor::FieldAccessor::<$ty> {
            name: stringify!($field),
            kind: $crate::value::FieldKind::Real,
            storage: $crate::accessor::Storage::Column,
            get: |record| $crate::value::FieldValue::real(record.$field),
            set: |record, value| record.$field = value.into_real(),
            deref: None,
        }
    };
    ($ty:ty, $field:ident, Outcome) => {
        $crate::accessor::FieldAccessor::<$ty> {
            name: stringify!($field),
            kind: $crate::value::FieldKind::Outcome,
            storage: $crate::accessor::Storage::Column,
            get: |record| $crate::value::FieldValue::integer(record.$field),
            set: |record, value| record.$field = value.into_integer(),
            deref: None,
        }
    };
}

/// Accessor for the owning crystal's name.
macro_rules! crystal_name_field {
    ($ty:ty) => {
        $crate::accessor::FieldAccessor::<$ty> {
            name: "crystal_name",
            kind: $crate::value::FieldKind::Text,
            storage: $crate::accessor::Storage::CrystalName,
            get: |record| $crate::value::FieldValue::Text(record.crystal_name.clone()),
            set: |record, value| record.crystal_name = value.into_text().unwrap_or_default(),
            deref: None,
        }
    };
}

/// Accessor for the owning crystal's compound SMILES, held in `$field`.
macro_rules! compound_field {
    ($ty:ty, $field:ident) => {
        $crate::accessor::FieldAccessor::<$ty> {
            name: stringify!($field),
            kind: $crate::value::FieldKind::Text,
            storage: $crate::accessor::Storage::Compound,
            get: |record| $crate::value::FieldValue::text(&record.$field),
            set: |record, value| record.$field = value.into_text(),
            deref: None,
        }
    };
}

pub(crate) use column_field;
pub(crate) use compound_field;
pub(crate) use crystal_name_field;
