//! ODBC protocol constants.
//!
//! SQL type codes and `SQLColumns` field positions follow the published ODBC
//! reference (sqlext.h / SQLColumns Function).

// Concise SQL data type codes
pub const SQL_TYPE_NULL: i16 = 0;
pub const SQL_DECIMAL: i16 = 3;
pub const SQL_INTEGER: i16 = 4;
pub const SQL_SMALLINT: i16 = 5;
pub const SQL_REAL: i16 = 7;
pub const SQL_DOUBLE: i16 = 8;
pub const SQL_DATETIME: i16 = 9;
pub const SQL_VARCHAR: i16 = 12;
pub const SQL_TYPE_DATE: i16 = 91;
pub const SQL_TYPE_TIMESTAMP: i16 = 93;
pub const SQL_LONGVARCHAR: i16 = -1;
pub const SQL_BIGINT: i16 = -5;
pub const SQL_TINYINT: i16 = -6;
pub const SQL_BIT: i16 = -7;
pub const SQL_WVARCHAR: i16 = -9;
pub const SQL_WLONGVARCHAR: i16 = -10;
pub const SQL_GUID: i16 = -11;

// Datetime subcodes (SQL_DATETIME_SUB)
pub const SQL_CODE_DATE: i16 = 1;
pub const SQL_CODE_TIMESTAMP: i16 = 3;

// Nullability
pub const SQL_NO_NULLS: i16 = 0;
pub const SQL_NULLABLE: i16 = 1;

// Length sentinels
pub const SQL_NTS: i64 = -3;

// SQLColumns result set positions (0-based)
pub const COL_TABLE_CAT: usize = 0;
pub const COL_TABLE_SCHEM: usize = 1;
pub const COL_TABLE_NAME: usize = 2;
pub const COL_COLUMN_NAME: usize = 3;
pub const COL_DATA_TYPE: usize = 4;
pub const COL_TYPE_NAME: usize = 5;
pub const COL_COLUMN_SIZE: usize = 6;
pub const COL_BUFFER_LENGTH: usize = 7;
pub const COL_DECIMAL_DIGITS: usize = 8;
pub const COL_NUM_PREC_RADIX: usize = 9;
pub const COL_NULLABLE: usize = 10;
pub const COL_REMARKS: usize = 11;
pub const COL_COLUMN_DEF: usize = 12;
pub const COL_SQL_DATA_TYPE: usize = 13;
pub const COL_SQL_DATETIME_SUB: usize = 14;
pub const COL_CHAR_OCTET_LENGTH: usize = 15;
pub const COL_ORDINAL_POSITION: usize = 16;
pub const COL_IS_NULLABLE: usize = 17;

/// Number of fields in a `SQLColumns` row.
pub const SQL_COLUMNS_FIELD_COUNT: usize = 18;

// Client compatibility limits for textual columns.
// Client applications hard-code these values; do not tune them.

/// Largest column size still reported as short text (VARCHAR/WVARCHAR).
pub const SHORT_TEXT_MAX_SIZE: i32 = 255;
/// Worst-case bytes per character when sizing octet lengths.
pub const MAX_BYTES_PER_CHAR: i32 = 4;
/// Octet length ceiling for short text.
pub const SHORT_TEXT_OCTET_CAP: i32 = 1020;
/// Octet length ceiling for long text.
pub const LONG_TEXT_OCTET_CAP: i32 = 262_140;
/// Backend maximum string size (16MB - 1), reported for unqualified long text.
pub const STRING_MAX_SIZE: i32 = 16_777_215;

/// Unicode replacement character.
pub const REPLACEMENT_CHAR: char = '\u{FFFD}';
