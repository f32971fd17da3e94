//! Field values moved between legacy rows and canonical records.
//!
//! Legacy soak databases are loosely typed: numeric columns routinely hold
//! free text such as `"n/a"` or `"3 - good"`. `FieldValue` carries a raw value
//! and knows how to coerce it into the canonical `FieldKind`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Legacy values treated as "no information" when they disagree with the
/// canonical value.
pub const NULL_EQUIVALENTS: [&str; 12] = [
    "None",
    "",
    "-",
    "n/a",
    "null",
    "pending",
    "NULL",
    "#NAME?",
    "#NOM?",
    "None\t",
    "Analysis Pending",
    "in-situ",
];

const OUTCOME_PATTERN: &str = r"-?\d+";

static OUTCOME_TOKEN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(OUTCOME_PATTERN));

/// Declared type of a canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Integer,
    Real,
    /// Classification outcome: an integer pulled out of free text
    /// (`"3 - good"` → `3`).
    Outcome,
}

/// A single field value, either read from a legacy row or from a canonical record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl FieldValue {
    /// Legacy emptiness: null, empty text, the literal `"None"`, or a zero number.
    #[must_use]
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.is_empty() || text == "None",
            Self::Integer(value) => *value == 0,
            Self::Real(value) => *value == 0.0,
        }
    }

    /// Whether this raw legacy value belongs to the null-equivalence set.
    #[must_use]
    pub fn is_null_equivalent(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => NULL_EQUIVALENTS.contains(&text.as_str()),
            Self::Integer(_) | Self::Real(_) => false,
        }
    }

    /// Render as text. Numbers use their shortest decimal form.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Integer(value) => Some(value.to_string()),
            Self::Real(value) => Some(value.to_string()),
            Self::Text(text) => Some(text.clone()),
        }
    }

    /// Read as an integer. Text must parse in full; reals must be whole.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Null => None,
            Self::Integer(value) => Some(*value),
            Self::Real(value) => whole_real(*value),
            Self::Text(text) => {
                let text = text.trim();
                text.parse::<i64>()
                    .ok()
                    .or_else(|| text.parse::<f64>().ok().and_then(whole_real))
            }
        }
    }

    /// Read as a real number. Text must parse in full.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Null => None,
            Self::Integer(value) => Some(*value as f64),
            Self::Real(value) => Some(*value),
            Self::Text(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    /// First signed integer token in the textual form, if any.
    #[must_use]
    pub fn extract_outcome(&self) -> Option<i64> {
        match self {
            Self::Null => None,
            Self::Integer(value) => Some(*value),
            other => {
                let text = other.as_text()?;
                OUTCOME_TOKEN
                    .as_ref()
                    .ok()?
                    .find(&text)
                    .and_then(|token| token.as_str().parse::<i64>().ok())
            }
        }
    }

    /// Coerce a raw legacy value into the canonical representation for `kind`.
    ///
    /// Unparseable numerics become `Null`; empty text becomes `Null`.
    #[must_use]
    pub fn coerce(&self, kind: FieldKind) -> Self {
        let coerced = match kind {
            FieldKind::Text => self.as_text().filter(|t| !t.is_empty()).map(Self::Text),
            FieldKind::Integer => self.as_i64().map(Self::Integer),
            FieldKind::Real => self.as_f64().map(Self::Real),
            FieldKind::Outcome => self.extract_outcome().map(Self::Integer),
        };
        coerced.unwrap_or(Self::Null)
    }

    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            other => other.as_text(),
        }
    }

    #[must_use]
    pub fn into_integer(self) -> Option<i64> {
        self.as_i64()
    }

    #[must_use]
    pub fn into_real(self) -> Option<f64> {
        self.as_f64()
    }

    /// Build from an optional text field.
    #[must_use]
    pub fn text(value: &Option<String>) -> Self {
        value.clone().map_or(Self::Null, Self::Text)
    }

    #[must_use]
    pub fn integer(value: Option<i64>) -> Self {
        value.map_or(Self::Null, Self::Integer)
    }

    #[must_use]
    pub fn real(value: Option<f64>) -> Self {
        value.map_or(Self::Null, Self::Real)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn whole_real(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        Some(value as i64)
    } else {
        None
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("None"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}
