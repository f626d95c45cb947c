//! `SQLColumns` result-set mutator.
//!
//! The catalog query returns one row per backend column with the backend
//! type string in `TYPE_NAME`. The mutator rewrites the type-dependent fields
//! of that row into values a size-constrained ODBC client accepts:
//!
//! | Field | Source |
//! |-------|--------|
//! | DATA_TYPE | text width x length matrix for textual kinds, catalog otherwise |
//! | COLUMN_SIZE | Decimal precision, FixedString size, text length class, catalog |
//! | DECIMAL_DIGITS | Decimal scale, 0 for DateTime, DateTime64 precision |
//! | NUM_PREC_RADIX | catalog, when present |
//! | NULLABLE / IS_NULLABLE | `Nullable(...)` wrapper |
//! | SQL_DATA_TYPE / SQL_DATETIME_SUB | catalog |
//! | CHAR_OCTET_LENGTH | FixedString size, else 4 bytes per character capped per length class |

use crate::config::{MetadataPolicy, TextWidth, TypeNameMode};
use crate::error::{Error, Result};
use crate::protocol::constants::*;
use crate::protocol::types::{
    BackendTypeInfo, DataSourceTypeId, Row, TypeInfoCatalog, TypeInfoSource,
};

use super::resolver::{resolve, TypeDescriptor};

/// Type-name fragments that mark a column as needing Unicode.
const UNICODE_MARKERS: [&str; 4] = ["UTF", "Unicode", "NCHAR", "NVARCHAR"];

/// Length class of a textual column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextLength {
    /// Up to 255 characters (`VARCHAR` / `WVARCHAR`).
    Short,
    /// Longer text (`LONGVARCHAR` / `WLONGVARCHAR`).
    Long,
}

impl TextLength {
    fn octet_cap(&self) -> i32 {
        match self {
            TextLength::Short => SHORT_TEXT_OCTET_CAP,
            TextLength::Long => LONG_TEXT_OCTET_CAP,
        }
    }
}

/// Protocol description of one column, as written into a `SQLColumns` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescription {
    pub data_type: i16,
    /// ODBC type name matching `data_type`.
    pub type_name: String,
    pub column_size: i32,
    /// Left untouched in the row when `None`.
    pub decimal_digits: Option<i16>,
    /// Left untouched in the row when `None`.
    pub num_prec_radix: Option<i16>,
    pub nullable: i16,
    pub sql_data_type: i16,
    /// Left untouched in the row when `None`.
    pub sql_datetime_sub: Option<i16>,
    pub char_octet_length: i32,
    pub is_nullable: &'static str,
    /// Width and length class, for textual kinds.
    pub text_class: Option<(TextWidth, TextLength)>,
}

/// Rewrites `SQLColumns` rows in place.
pub struct ColumnMetadataMutator<'a, S: TypeInfoSource = TypeInfoCatalog> {
    types: &'a S,
    policy: MetadataPolicy,
}

impl ColumnMetadataMutator<'static, TypeInfoCatalog> {
    /// Mutator over the builtin type catalog.
    pub fn builtin(policy: MetadataPolicy) -> Self {
        Self::new(TypeInfoCatalog::builtin(), policy)
    }
}

impl<'a, S: TypeInfoSource> ColumnMetadataMutator<'a, S> {
    /// Create a mutator over a type catalog.
    pub fn new(types: &'a S, policy: MetadataPolicy) -> Self {
        Self { types, policy }
    }

    /// The active policy.
    pub fn policy(&self) -> &MetadataPolicy {
        &self.policy
    }

    /// Describe a backend type string.
    pub fn describe(&self, raw_type: &str) -> (TypeDescriptor, ColumnDescription) {
        let descriptor = resolve(raw_type);
        // A bare `Decimal` or `DateTime64` falls back to String but still
        // names a catalog entry exactly.
        let info = match self.types.type_info(raw_type, &descriptor.base_name) {
            info if info.type_id == descriptor.kind => info,
            _ => self.types.type_info(&descriptor.base_name, &descriptor.base_name),
        };
        let description = self.describe_resolved(&descriptor, info);
        (descriptor, description)
    }

    /// Rewrite the type-dependent fields of one `SQLColumns` row.
    ///
    /// Fails, without touching the row, when the row is narrower than a
    /// `SQLColumns` row or `TYPE_NAME` is not a string.
    pub fn transform_row(&self, row: &mut Row) -> Result<()> {
        if row.len() < SQL_COLUMNS_FIELD_COUNT {
            tracing::warn!(width = row.len(), "SQLColumns row too narrow");
            return Err(Error::MissingField {
                position: row.len(),
                width: row.len(),
            });
        }
        let raw_type = row.get_str(COL_TYPE_NAME).inspect_err(|e| {
            tracing::warn!(error = %e, "SQLColumns row has no usable TYPE_NAME");
        })?;

        let (descriptor, description) = self.describe(raw_type);
        tracing::trace!(
            type_name = %descriptor.type_name,
            kind = %descriptor.kind,
            data_type = description.data_type,
            column_size = description.column_size,
            "described column"
        );

        row.set(COL_DATA_TYPE, description.data_type)?;
        if self.policy.type_name_mode == TypeNameMode::Canonical {
            row.set(COL_TYPE_NAME, descriptor.canonical_name)?;
        }
        row.set(COL_COLUMN_SIZE, description.column_size)?;
        if let Some(radix) = description.num_prec_radix {
            row.set(COL_NUM_PREC_RADIX, radix)?;
        }
        row.set(COL_NULLABLE, description.nullable)?;
        if let Some(digits) = description.decimal_digits {
            row.set(COL_DECIMAL_DIGITS, digits)?;
        }
        row.set(COL_SQL_DATA_TYPE, description.sql_data_type)?;
        if let Some(sub) = description.sql_datetime_sub {
            row.set(COL_SQL_DATETIME_SUB, sub)?;
        }
        row.set(COL_CHAR_OCTET_LENGTH, description.char_octet_length)?;
        row.set(COL_IS_NULLABLE, description.is_nullable)?;
        Ok(())
    }

    /// Rewrite every row of a `SQLColumns` result set.
    pub fn transform_rows(&self, rows: &mut [Row]) -> Result<()> {
        rows.iter_mut().try_for_each(|row| self.transform_row(row))
    }

    fn describe_resolved(&self, descriptor: &TypeDescriptor, info: &BackendTypeInfo) -> ColumnDescription {
        let text_class = descriptor
            .kind
            .is_textual()
            .then(|| self.text_class(descriptor, info));

        let (data_type, type_name) = match text_class {
            Some(class) => {
                let (code, name) = text_type(class);
                (code, name.to_string())
            }
            None => (info.data_type, info.type_name.clone()),
        };

        let column_size = match (descriptor.kind, text_class) {
            (DataSourceTypeId::Decimal, _) => descriptor.precision.map_or(info.column_size, i32::from),
            (DataSourceTypeId::FixedString, _) => fixed_size(descriptor),
            (_, Some((_, TextLength::Short))) => SHORT_TEXT_MAX_SIZE,
            (_, Some((_, TextLength::Long))) => STRING_MAX_SIZE,
            _ => info.column_size,
        };

        let decimal_digits = match descriptor.kind {
            DataSourceTypeId::Decimal => descriptor.scale.map(to_i16),
            DataSourceTypeId::DateTime => Some(0),
            DataSourceTypeId::DateTime64 => descriptor.precision.map(to_i16),
            _ => None,
        };

        let char_octet_length = match (descriptor.kind, text_class) {
            (DataSourceTypeId::FixedString, Some(_)) => column_size,
            (_, Some((_, length))) => column_size
                .saturating_mul(MAX_BYTES_PER_CHAR)
                .min(length.octet_cap()),
            _ => info.octet_length,
        };

        let (nullable, is_nullable) = if descriptor.is_nullable {
            (SQL_NULLABLE, "YES")
        } else {
            (SQL_NO_NULLS, "NO")
        };

        ColumnDescription {
            data_type,
            type_name,
            column_size,
            decimal_digits,
            num_prec_radix: info.num_prec_radix,
            nullable,
            sql_data_type: info.sql_data_type,
            sql_datetime_sub: info.sql_datetime_sub,
            char_octet_length,
            is_nullable,
            text_class,
        }
    }

    fn text_class(&self, descriptor: &TypeDescriptor, info: &BackendTypeInfo) -> (TextWidth, TextLength) {
        let width = if needs_unicode(&descriptor.type_name) {
            TextWidth::Wide
        } else {
            self.policy.default_text_width
        };

        let estimated_size = match descriptor.kind {
            DataSourceTypeId::FixedString => fixed_size(descriptor),
            _ => info.column_size,
        };
        let length = if estimated_size > SHORT_TEXT_MAX_SIZE {
            TextLength::Long
        } else {
            TextLength::Short
        };

        (width, length)
    }
}

/// Whether a type name carries a Unicode marker.
pub fn needs_unicode(type_name: &str) -> bool {
    UNICODE_MARKERS.iter().any(|marker| type_name.contains(marker))
}

/// SQL type code and name for a text class.
pub fn text_type(class: (TextWidth, TextLength)) -> (i16, &'static str) {
    match class {
        (TextWidth::Narrow, TextLength::Short) => (SQL_VARCHAR, "VARCHAR"),
        (TextWidth::Narrow, TextLength::Long) => (SQL_LONGVARCHAR, "LONGVARCHAR"),
        (TextWidth::Wide, TextLength::Short) => (SQL_WVARCHAR, "WVARCHAR"),
        (TextWidth::Wide, TextLength::Long) => (SQL_WLONGVARCHAR, "WLONGVARCHAR"),
    }
}

fn fixed_size(descriptor: &TypeDescriptor) -> i32 {
    descriptor
        .fixed_size
        .map_or(0, |n| i32::try_from(n).unwrap_or(i32::MAX))
}

fn to_i16(v: u16) -> i16 {
    i16::try_from(v).unwrap_or(i16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::FieldValue;

    fn mutator() -> ColumnMetadataMutator<'static> {
        ColumnMetadataMutator::builtin(MetadataPolicy::default())
    }

    fn narrow_mutator() -> ColumnMetadataMutator<'static> {
        ColumnMetadataMutator::builtin(MetadataPolicy {
            default_text_width: TextWidth::Narrow,
            type_name_mode: TypeNameMode::Passthrough,
        })
    }

    #[test]
    fn test_text_type_matrix() {
        assert_eq!(text_type((TextWidth::Narrow, TextLength::Short)), (SQL_VARCHAR, "VARCHAR"));
        assert_eq!(text_type((TextWidth::Narrow, TextLength::Long)), (SQL_LONGVARCHAR, "LONGVARCHAR"));
        assert_eq!(text_type((TextWidth::Wide, TextLength::Short)), (SQL_WVARCHAR, "WVARCHAR"));
        assert_eq!(text_type((TextWidth::Wide, TextLength::Long)), (SQL_WLONGVARCHAR, "WLONGVARCHAR"));
    }

    #[test]
    fn test_needs_unicode() {
        assert!(needs_unicode("NVARCHAR(20)"));
        assert!(needs_unicode("String('UTF-8')"));
        assert!(!needs_unicode("FixedString(10)"));
        assert!(!needs_unicode("utf8"));
    }

    #[test]
    fn test_describe_string_long() {
        let (_, d) = mutator().describe("String");
        assert_eq!(d.data_type, SQL_WLONGVARCHAR);
        assert_eq!(d.type_name, "WLONGVARCHAR");
        assert_eq!(d.column_size, STRING_MAX_SIZE);
        assert_eq!(d.char_octet_length, LONG_TEXT_OCTET_CAP);
        assert_eq!(d.text_class, Some((TextWidth::Wide, TextLength::Long)));
    }

    #[test]
    fn test_describe_short_catalog_string() {
        let short = BackendTypeInfo {
            column_size: 100,
            ..TypeInfoCatalog::builtin().type_info("String", "String").clone()
        };
        let catalog = TypeInfoCatalog::new().with_entry("String", short);
        let (_, d) = ColumnMetadataMutator::new(&catalog, MetadataPolicy::default()).describe("String");

        assert_eq!(d.data_type, SQL_WVARCHAR);
        assert_eq!(d.column_size, SHORT_TEXT_MAX_SIZE);
        assert_eq!(d.char_octet_length, SHORT_TEXT_OCTET_CAP);
    }

    #[test]
    fn test_describe_fixed_string_narrow() {
        let (_, d) = narrow_mutator().describe("FixedString(16)");
        assert_eq!(d.data_type, SQL_VARCHAR);
        assert_eq!(d.column_size, 16);
        assert_eq!(d.char_octet_length, 16);

        let (_, d) = narrow_mutator().describe("FixedString(256)");
        assert_eq!(d.data_type, SQL_LONGVARCHAR);
        assert_eq!(d.column_size, 256);
        assert_eq!(d.char_octet_length, 256);
    }

    #[test]
    fn test_describe_fixed_string_octet_length_is_size() {
        let (_, d) = mutator().describe("FixedString(1000000)");
        assert_eq!(d.data_type, SQL_WLONGVARCHAR);
        assert_eq!(d.column_size, 1_000_000);
        assert_eq!(d.char_octet_length, 1_000_000);
    }

    #[test]
    fn test_describe_long_catalog_string() {
        let long = BackendTypeInfo {
            column_size: 1000,
            octet_length: 1000,
            ..TypeInfoCatalog::builtin().type_info("String", "String").clone()
        };
        let catalog = TypeInfoCatalog::new().with_entry("String", long);
        let (_, d) = ColumnMetadataMutator::new(&catalog, MetadataPolicy::default()).describe("String");

        assert_eq!(d.data_type, SQL_WLONGVARCHAR);
        assert_eq!(d.column_size, STRING_MAX_SIZE);
        assert_eq!(d.char_octet_length, LONG_TEXT_OCTET_CAP);
    }

    #[test]
    fn test_describe_bare_parametric_names() {
        for raw in ["Decimal", "DateTime64", "Decimal64"] {
            let (descriptor, d) = mutator().describe(raw);
            assert_eq!(descriptor.kind, DataSourceTypeId::String, "{raw}");
            assert_eq!(d.data_type, SQL_WLONGVARCHAR, "{raw}");
            assert_eq!(d.sql_data_type, SQL_VARCHAR, "{raw}");
            assert_eq!(d.sql_datetime_sub, None, "{raw}");
            assert_eq!(d.num_prec_radix, None, "{raw}");
        }
    }

    #[test]
    fn test_describe_non_textual() {
        let (_, d) = mutator().describe("Int64");
        assert_eq!(d.data_type, SQL_BIGINT);
        assert_eq!(d.type_name, "BIGINT");
        assert_eq!(d.column_size, 20);
        assert_eq!(d.char_octet_length, 8);
        assert_eq!(d.num_prec_radix, Some(10));
        assert_eq!(d.decimal_digits, None);
        assert_eq!(d.text_class, None);
    }

    #[test]
    fn test_transform_row_decimal() {
        let mut row = Row::sql_columns("default", "t", "price", "Nullable(Decimal(18,4))", 3);
        mutator().transform_row(&mut row).unwrap();

        assert_eq!(row.get(COL_DATA_TYPE), Some(&FieldValue::Int16(SQL_DECIMAL)));
        assert_eq!(row.get(COL_COLUMN_SIZE), Some(&FieldValue::Int32(18)));
        assert_eq!(row.get(COL_DECIMAL_DIGITS), Some(&FieldValue::Int16(4)));
        assert_eq!(row.get(COL_NUM_PREC_RADIX), Some(&FieldValue::Int16(10)));
        assert_eq!(row.get(COL_NULLABLE), Some(&FieldValue::Int16(SQL_NULLABLE)));
        assert_eq!(row.get(COL_IS_NULLABLE), Some(&FieldValue::from("YES")));
        assert_eq!(row.get(COL_SQL_DATETIME_SUB), Some(&FieldValue::Null));
        assert_eq!(row.get_str(COL_TYPE_NAME).unwrap(), "Nullable(Decimal(18,4))");
    }

    #[test]
    fn test_transform_row_untouched_fields() {
        let mut row = Row::sql_columns("db", "t", "name", "String", 2);
        row.set(COL_DECIMAL_DIGITS, 7i16).unwrap();
        row.set(COL_COLUMN_DEF, "'x'").unwrap();
        let before = row.clone();

        mutator().transform_row(&mut row).unwrap();

        for pos in [
            COL_TABLE_CAT,
            COL_TABLE_SCHEM,
            COL_TABLE_NAME,
            COL_COLUMN_NAME,
            COL_BUFFER_LENGTH,
            COL_DECIMAL_DIGITS,
            COL_NUM_PREC_RADIX,
            COL_REMARKS,
            COL_COLUMN_DEF,
            COL_SQL_DATETIME_SUB,
            COL_ORDINAL_POSITION,
        ] {
            assert_eq!(row.get(pos), before.get(pos), "field {pos} changed");
        }
    }

    #[test]
    fn test_transform_row_canonical_mode() {
        let m = ColumnMetadataMutator::builtin(MetadataPolicy {
            type_name_mode: TypeNameMode::Canonical,
            ..MetadataPolicy::default()
        });
        let mut row = Row::sql_columns("db", "t", "c", "LowCardinality(Nullable(Decimal64(2)))", 1);
        m.transform_row(&mut row).unwrap();
        assert_eq!(row.get_str(COL_TYPE_NAME).unwrap(), "Nullable(Decimal(18, 2))");
        assert_eq!(row.get(COL_COLUMN_SIZE), Some(&FieldValue::Int32(18)));
        assert_eq!(row.get(COL_NULLABLE), Some(&FieldValue::Int16(SQL_NULLABLE)));
    }

    #[test]
    fn test_transform_row_contract_violations() {
        let m = mutator();

        let mut narrow = Row::new(vec![FieldValue::Null; 6]);
        assert!(matches!(m.transform_row(&mut narrow), Err(Error::MissingField { .. })));

        let mut wrong_kind = Row::sql_columns("db", "t", "c", "String", 1);
        wrong_kind.set(COL_TYPE_NAME, 5i16).unwrap();
        let before = wrong_kind.clone();
        assert_eq!(
            m.transform_row(&mut wrong_kind),
            Err(Error::FieldKindMismatch {
                position: COL_TYPE_NAME,
                expected: "String",
                actual: "Int16",
            })
        );
        assert_eq!(wrong_kind, before);
    }

    #[test]
    fn test_transform_rows() {
        let mut rows = vec![
            Row::sql_columns("db", "t", "a", "UInt8", 1),
            Row::sql_columns("db", "t", "b", "DateTime", 2),
        ];
        mutator().transform_rows(&mut rows).unwrap();

        assert_eq!(rows[0].get(COL_DATA_TYPE), Some(&FieldValue::Int16(SQL_TINYINT)));
        assert_eq!(rows[1].get(COL_DECIMAL_DIGITS), Some(&FieldValue::Int16(0)));
        assert_eq!(rows[1].get(COL_SQL_DATA_TYPE), Some(&FieldValue::Int16(SQL_DATETIME)));
        assert_eq!(
            rows[1].get(COL_SQL_DATETIME_SUB),
            Some(&FieldValue::Int16(SQL_CODE_TIMESTAMP))
        );
    }
}
