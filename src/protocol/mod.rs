//! ODBC protocol data representation.

pub mod constants;
pub mod convert;
pub mod parser;
pub mod types;

pub use convert::{CharWidth, ConversionContext, Decoded, Length, SourceBuffer};
pub use parser::{TypeAst, TypeParser};
pub use types::{BackendTypeInfo, DataSourceTypeId, FieldValue, Row, TypeInfoCatalog, TypeInfoSource};
