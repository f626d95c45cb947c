//! Row type for metadata result sets.

use crate::error::{Error, Result};
use crate::protocol::constants::*;

use super::value::FieldValue;

/// A row of a metadata result set.
///
/// Field positions are fixed by the protocol; the row never reorders,
/// inserts or removes fields once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    fields: Vec<FieldValue>,
}

impl Row {
    /// Create a row from its field values.
    pub fn new(fields: Vec<FieldValue>) -> Self {
        Self { fields }
    }

    /// Create a `SQLColumns` row as the catalog query produces it, before
    /// the column metadata mutator fills in the type-dependent fields.
    ///
    /// `TYPE_NAME` carries the backend type string; type-dependent fields
    /// start out NULL.
    pub fn sql_columns(
        catalog: &str,
        table: &str,
        column: &str,
        type_name: &str,
        ordinal_position: i32,
    ) -> Self {
        let mut fields = vec![FieldValue::Null; SQL_COLUMNS_FIELD_COUNT];
        fields[COL_TABLE_CAT] = catalog.into();
        fields[COL_TABLE_SCHEM] = "".into();
        fields[COL_TABLE_NAME] = table.into();
        fields[COL_COLUMN_NAME] = column.into();
        fields[COL_TYPE_NAME] = type_name.into();
        fields[COL_REMARKS] = "".into();
        fields[COL_ORDINAL_POSITION] = ordinal_position.into();
        Self { fields }
    }

    /// Get field by position (0-based).
    pub fn get(&self, index: usize) -> Option<&FieldValue> {
        self.fields.get(index)
    }

    /// Get a mutable field by position (0-based).
    pub fn get_mut(&mut self, index: usize) -> Option<&mut FieldValue> {
        self.fields.get_mut(index)
    }

    /// Get a string field, failing if it is absent or not a string.
    pub fn get_str(&self, index: usize) -> Result<&str> {
        match self.fields.get(index) {
            Some(FieldValue::String(s)) => Ok(s),
            Some(other) => Err(Error::FieldKindMismatch {
                position: index,
                expected: "String",
                actual: other.kind_name(),
            }),
            None => Err(Error::MissingField {
                position: index,
                width: self.fields.len(),
            }),
        }
    }

    /// Replace the field at `index`.
    pub fn set(&mut self, index: usize, value: impl Into<FieldValue>) -> Result<()> {
        let width = self.fields.len();
        let slot = self.fields.get_mut(index).ok_or(Error::MissingField {
            position: index,
            width,
        })?;
        *slot = value.into();
        Ok(())
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the row is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get all fields.
    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    /// Iterate over fields.
    pub fn iter(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.iter()
    }
}

impl IntoIterator for Row {
    type Item = FieldValue;
    type IntoIter = std::vec::IntoIter<FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a FieldValue;
    type IntoIter = std::slice::Iter<'a, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_columns_layout() {
        let row = Row::sql_columns("default", "events", "id", "UInt64", 1);

        assert_eq!(row.len(), SQL_COLUMNS_FIELD_COUNT);
        assert_eq!(row.get_str(COL_TABLE_NAME).unwrap(), "events");
        assert_eq!(row.get_str(COL_COLUMN_NAME).unwrap(), "id");
        assert_eq!(row.get_str(COL_TYPE_NAME).unwrap(), "UInt64");
        assert_eq!(row.get(COL_ORDINAL_POSITION), Some(&FieldValue::Int32(1)));
        assert!(row.get(COL_DATA_TYPE).unwrap().is_null());
    }

    #[test]
    fn test_get_str_errors() {
        let row = Row::new(vec![FieldValue::Int16(3)]);

        assert_eq!(
            row.get_str(0),
            Err(Error::FieldKindMismatch {
                position: 0,
                expected: "String",
                actual: "Int16",
            })
        );
        assert_eq!(
            row.get_str(5),
            Err(Error::MissingField {
                position: 5,
                width: 1
            })
        );
    }

    #[test]
    fn test_set() {
        let mut row = Row::new(vec![FieldValue::Null, FieldValue::Null]);
        row.set(1, 42i32).unwrap();
        assert_eq!(row.get(1), Some(&FieldValue::Int32(42)));
        assert!(row.set(2, "x").is_err());
    }
}
