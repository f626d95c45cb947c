//! Field values of metadata result sets.

use std::fmt;

/// A single field of a metadata result-set row.
///
/// Only the value kinds the catalog result sets use are represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// NULL value.
    Null,
    /// SMALLINT value (type codes, flags, digits).
    Int16(i16),
    /// INTEGER value (sizes, lengths, positions).
    Int32(i32),
    /// VARCHAR value (names, remarks).
    String(String),
}

impl FieldValue {
    /// Check if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Name of the value kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "Null",
            FieldValue::Int16(_) => "Int16",
            FieldValue::Int32(_) => "Int32",
            FieldValue::String(_) => "String",
        }
    }

    /// Try to get the value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the value as i16.
    pub fn as_i16(&self) -> Option<i16> {
        match self {
            FieldValue::Int16(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the value as i32. SMALLINT values widen.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            FieldValue::Int16(v) => Some(*v as i32),
            FieldValue::Int32(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<i16> for FieldValue {
    fn from(v: i16) -> Self {
        FieldValue::Int16(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int32(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "NULL"),
            FieldValue::Int16(v) => write!(f, "{}", v),
            FieldValue::Int32(v) => write!(f, "{}", v),
            FieldValue::String(s) => write!(f, "{}", s),
        }
    }
}
