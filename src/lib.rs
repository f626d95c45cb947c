//! ClickHouse ODBC driver core
//!
//! The data-representation layer of an ODBC driver for ClickHouse: it maps
//! backend column types onto the `SQLColumns` metadata schema and converts
//! text between UTF-8 and the character widths ODBC clients use.
//!
//! # Example
//!
//! ```
//! use clickhouse_odbc_core::protocol::constants::*;
//! use clickhouse_odbc_core::{ColumnMetadataMutator, DriverConfig, FieldValue, Result, Row};
//!
//! fn main() -> Result<()> {
//!     let config = DriverConfig::new();
//!     let mutator = ColumnMetadataMutator::builtin(config.metadata);
//!
//!     // One row of the catalog query, as fetched from the server.
//!     let mut row = Row::sql_columns("default", "trades", "price", "Decimal(18,4)", 1);
//!     mutator.transform_row(&mut row)?;
//!
//!     assert_eq!(row.get(COL_COLUMN_SIZE), Some(&FieldValue::Int32(18)));
//!     assert_eq!(row.get(COL_DECIMAL_DIGITS), Some(&FieldValue::Int16(4)));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod metadata;
pub mod protocol;

// Re-export main types
pub use config::{DriverConfig, MetadataPolicy, ResourceLimits, TextWidth, TypeNameMode};
pub use error::{Error, Result};
pub use metadata::{resolve, ColumnDescription, ColumnMetadataMutator, TypeDescriptor};
pub use protocol::convert::{decode, encode, encode_bytes};
pub use protocol::{CharWidth, ConversionContext, Decoded, Length, SourceBuffer};
pub use protocol::types::{BackendTypeInfo, DataSourceTypeId, FieldValue, Row, TypeInfoCatalog, TypeInfoSource};
