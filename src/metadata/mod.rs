//! Column metadata: backend type resolution and `SQLColumns` row rewriting.

mod columns;
mod resolver;

pub use columns::{needs_unicode, text_type, ColumnDescription, ColumnMetadataMutator, TextLength};
pub use resolver::{resolve, TypeDescriptor};
