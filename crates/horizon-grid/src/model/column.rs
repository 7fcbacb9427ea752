//! Column metadata and rows.

use crate::value::{CellValue, ColumnType};

/// A column of a tabular model.
#[derive(Debug, Clone, PartialEq)]
pub struct GridColumn {
    number: usize,
    name: String,
    column_type: ColumnType,
    type_name: Option<String>,
    size: Option<u32>,
    precision: Option<u32>,
}

impl GridColumn {
    /// Create a string column.
    pub fn new(number: usize, name: impl Into<String>) -> Self {
        Self {
            number,
            name: name.into(),
            column_type: ColumnType::String,
            type_name: None,
            size: None,
            precision: None,
        }
    }

    /// Set the logical type.
    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    /// Set the source-specific type name (e.g. `varchar`).
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Set the size and precision metadata.
    pub fn with_size(mut self, size: u32, precision: Option<u32>) -> Self {
        self.size = Some(size);
        self.precision = precision;
        self
    }

    /// Stable column number.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logical type.
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Source type name, falling back to the logical type name.
    pub fn type_name(&self) -> &str {
        self.type_name.as_deref().unwrap_or(self.column_type.name())
    }

    /// Declared size, if known.
    pub fn size(&self) -> Option<u32> {
        self.size
    }

    /// Declared precision, if known.
    pub fn precision(&self) -> Option<u32> {
        self.precision
    }

    pub(crate) fn set_number(&mut self, number: usize) {
        self.number = number;
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

/// A row of a tabular model.
///
/// The row number is 1-based, assigned at creation and never recomputed when
/// other rows come and go; it is the row's only persistent identity.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    number: usize,
    values: Vec<CellValue>,
}

impl GridRow {
    /// Create a row.
    pub fn new(number: usize, values: Vec<CellValue>) -> Self {
        Self { number, values }
    }

    /// Create a row of `width` nulls.
    pub fn empty(number: usize, width: usize) -> Self {
        Self::new(number, vec![CellValue::Null; width])
    }

    /// The 1-based row number.
    pub fn number(&self) -> usize {
        self.number
    }

    /// All values in column order.
    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    /// The value at `column`.
    pub fn value(&self, column: usize) -> Option<&CellValue> {
        self.values.get(column)
    }

    /// Replace the value at `column`. Returns `false` if out of range.
    pub fn set_value(&mut self, column: usize, value: CellValue) -> bool {
        match self.values.get_mut(column) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the row holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn values_mut(&mut self) -> &mut Vec<CellValue> {
        &mut self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_name_fallback() {
        let column = GridColumn::new(0, "price").with_type(ColumnType::Double);
        assert_eq!(column.type_name(), "double");
        let column = column.with_type_name("numeric").with_size(10, Some(2));
        assert_eq!(column.type_name(), "numeric");
        assert_eq!(column.precision(), Some(2));
    }

    #[test]
    fn test_row_set_value() {
        let mut row = GridRow::empty(3, 2);
        assert!(row.set_value(1, "x".into()));
        assert!(!row.set_value(2, "y".into()));
        assert_eq!(row.value(1), Some(&CellValue::Text("x".into())));
        assert_eq!(row.number(), 3);
    }
}
