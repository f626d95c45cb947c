//! Backend-type to ODBC-type catalog.
//!
//! Every backend kind has one `BackendTypeInfo` entry carrying the
//! client-agnostic ODBC description of that kind. The column metadata
//! mutator starts from these values and adjusts them per column.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::protocol::constants::*;

use super::data_source_type::DataSourceTypeId;

/// ODBC description of a backend type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTypeInfo {
    /// Backend kind this entry describes.
    pub type_id: DataSourceTypeId,
    /// ODBC type name (`TYPE_NAME` of `SQLGetTypeInfo`).
    pub type_name: String,
    /// Concise SQL data type code.
    pub data_type: i16,
    /// Default column size.
    pub column_size: i32,
    /// Default octet length.
    pub octet_length: i32,
    /// Radix of the column size, for numeric types only.
    pub num_prec_radix: Option<i16>,
    /// Verbose SQL data type code (`SQL_DATETIME` for date/time kinds).
    pub sql_data_type: i16,
    /// Datetime subcode, for date/time kinds only.
    pub sql_datetime_sub: Option<i16>,
    /// Whether the type is an unsigned numeric.
    pub is_unsigned: bool,
}

impl BackendTypeInfo {
    fn new(
        type_id: DataSourceTypeId,
        type_name: &str,
        data_type: i16,
        column_size: i32,
        octet_length: i32,
    ) -> Self {
        Self {
            type_id,
            type_name: type_name.to_string(),
            data_type,
            column_size,
            octet_length,
            num_prec_radix: None,
            sql_data_type: data_type,
            sql_datetime_sub: None,
            is_unsigned: false,
        }
    }

    fn radix(mut self, radix: i16) -> Self {
        self.num_prec_radix = Some(radix);
        self
    }

    fn unsigned(mut self) -> Self {
        self.is_unsigned = true;
        self
    }

    fn datetime(mut self, sub: i16) -> Self {
        self.sql_data_type = SQL_DATETIME;
        self.sql_datetime_sub = Some(sub);
        self
    }
}

/// Lookup of `BackendTypeInfo` by backend type name.
pub trait TypeInfoSource {
    /// Find the entry for a column type.
    ///
    /// `type_name` is the full (possibly parametrized) type string and
    /// `base_name` the name with parameters stripped. Implementations must be
    /// total: an unknown type resolves to the `String` entry.
    fn type_info(&self, type_name: &str, base_name: &str) -> &BackendTypeInfo;
}

/// Hash-map backed `TypeInfoSource`.
#[derive(Debug, Clone)]
pub struct TypeInfoCatalog {
    entries: HashMap<String, BackendTypeInfo>,
    fallback: BackendTypeInfo,
}

static BUILTIN: Lazy<TypeInfoCatalog> = Lazy::new(TypeInfoCatalog::build_builtin);

impl TypeInfoCatalog {
    /// The catalog of all builtin backend kinds.
    pub fn builtin() -> &'static TypeInfoCatalog {
        &BUILTIN
    }

    /// Create a catalog with only the `String` fallback entry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            fallback: string_type_info(DataSourceTypeId::String),
        }
    }

    /// Add or replace the entry for `name`.
    pub fn with_entry(mut self, name: impl Into<String>, info: BackendTypeInfo) -> Self {
        self.entries.insert(name.into(), info);
        self
    }

    /// Number of named entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the catalog has no named entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn build_builtin() -> Self {
        use DataSourceTypeId as Id;

        let entries = [
            BackendTypeInfo::new(Id::Int8, "TINYINT", SQL_TINYINT, 4, 1).radix(10),
            BackendTypeInfo::new(Id::Int16, "SMALLINT", SQL_SMALLINT, 6, 2).radix(10),
            BackendTypeInfo::new(Id::Int32, "INT", SQL_INTEGER, 11, 4).radix(10),
            BackendTypeInfo::new(Id::Int64, "BIGINT", SQL_BIGINT, 20, 8).radix(10),
            BackendTypeInfo::new(Id::UInt8, "TINYINT", SQL_TINYINT, 3, 1)
                .radix(10)
                .unsigned(),
            BackendTypeInfo::new(Id::UInt16, "SMALLINT", SQL_SMALLINT, 5, 2)
                .radix(10)
                .unsigned(),
            BackendTypeInfo::new(Id::UInt32, "BIGINT", SQL_BIGINT, 10, 4)
                .radix(10)
                .unsigned(),
            BackendTypeInfo::new(Id::UInt64, "BIGINT", SQL_BIGINT, 20, 8)
                .radix(10)
                .unsigned(),
            BackendTypeInfo::new(Id::Float32, "REAL", SQL_REAL, 7, 4).radix(2),
            BackendTypeInfo::new(Id::Float64, "DOUBLE", SQL_DOUBLE, 15, 8).radix(2),
            BackendTypeInfo::new(Id::Decimal, "DECIMAL", SQL_DECIMAL, 41, 16).radix(10),
            BackendTypeInfo::new(Id::Bool, "BIT", SQL_BIT, 1, 1),
            string_type_info(Id::String),
            string_type_info(Id::FixedString),
            string_type_info(Id::Array),
            BackendTypeInfo::new(Id::Date, "DATE", SQL_TYPE_DATE, 10, 6).datetime(SQL_CODE_DATE),
            BackendTypeInfo::new(Id::Date32, "DATE", SQL_TYPE_DATE, 10, 6).datetime(SQL_CODE_DATE),
            BackendTypeInfo::new(Id::DateTime, "TIMESTAMP", SQL_TYPE_TIMESTAMP, 19, 16)
                .datetime(SQL_CODE_TIMESTAMP),
            BackendTypeInfo::new(Id::DateTime64, "TIMESTAMP", SQL_TYPE_TIMESTAMP, 29, 16)
                .datetime(SQL_CODE_TIMESTAMP),
            BackendTypeInfo::new(Id::Uuid, "GUID", SQL_GUID, 36, 16),
            BackendTypeInfo::new(Id::Nothing, "NULL", SQL_TYPE_NULL, 1, 1),
        ];

        let mut catalog = Self::new();
        for info in entries {
            catalog.entries.insert(info.type_id.name().to_string(), info);
        }
        catalog
    }
}

impl Default for TypeInfoCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInfoSource for TypeInfoCatalog {
    fn type_info(&self, type_name: &str, base_name: &str) -> &BackendTypeInfo {
        self.entries
            .get(type_name)
            .or_else(|| self.entries.get(base_name))
            .unwrap_or(&self.fallback)
    }
}

fn string_type_info(type_id: DataSourceTypeId) -> BackendTypeInfo {
    BackendTypeInfo::new(type_id, "TEXT", SQL_VARCHAR, STRING_MAX_SIZE, STRING_MAX_SIZE)
}
