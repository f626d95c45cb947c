//! Data model of metadata result sets.

mod data_source_type;
mod row;
mod type_info;
mod value;

pub use data_source_type::DataSourceTypeId;
pub use row::Row;
pub use type_info::{BackendTypeInfo, TypeInfoCatalog, TypeInfoSource};
pub use value::FieldValue;
