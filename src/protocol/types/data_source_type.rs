//! Backend (data source) type identifiers.
//!
//! A `DataSourceTypeId` is the coarse classification of a backend type name
//! with its parameters stripped: `Decimal(18,4)` and `Decimal64(4)` are both
//! `Decimal`, `FixedString(16)` is `FixedString`.

use std::fmt;

/// Backend type kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSourceTypeId {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Decimal,
    Bool,
    String,
    FixedString,
    Array,
    Date,
    Date32,
    DateTime,
    DateTime64,
    Uuid,
    Nothing,
    /// Not a known backend kind. Never leaves the resolver.
    Unknown,
}

impl DataSourceTypeId {
    /// Classify an unparametrized backend type name.
    ///
    /// The sized decimal aliases (`Decimal32` .. `Decimal256`) classify as
    /// `Decimal`. Unrecognised names yield `Unknown`.
    pub fn from_unparametrized(name: &str) -> Self {
        match name {
            "Int8" => Self::Int8,
            "Int16" => Self::Int16,
            "Int32" => Self::Int32,
            "Int64" => Self::Int64,
            "UInt8" => Self::UInt8,
            "UInt16" => Self::UInt16,
            "UInt32" => Self::UInt32,
            "UInt64" => Self::UInt64,
            "Float32" => Self::Float32,
            "Float64" => Self::Float64,
            "Decimal" | "Decimal32" | "Decimal64" | "Decimal128" | "Decimal256" => Self::Decimal,
            "Bool" => Self::Bool,
            "String" => Self::String,
            "FixedString" => Self::FixedString,
            "Array" => Self::Array,
            "Date" => Self::Date,
            "Date32" => Self::Date32,
            "DateTime" => Self::DateTime,
            "DateTime64" => Self::DateTime64,
            "UUID" => Self::Uuid,
            "Nothing" => Self::Nothing,
            _ => Self::Unknown,
        }
    }

    /// Canonical backend name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int8 => "Int8",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::UInt8 => "UInt8",
            Self::UInt16 => "UInt16",
            Self::UInt32 => "UInt32",
            Self::UInt64 => "UInt64",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
            Self::Decimal => "Decimal",
            Self::Bool => "Bool",
            Self::String => "String",
            Self::FixedString => "FixedString",
            Self::Array => "Array",
            Self::Date => "Date",
            Self::Date32 => "Date32",
            Self::DateTime => "DateTime",
            Self::DateTime64 => "DateTime64",
            Self::Uuid => "UUID",
            Self::Nothing => "Nothing",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether values of this kind are shipped to clients as text.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::String | Self::FixedString | Self::Array)
    }
}

impl fmt::Display for DataSourceTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
