//! Table-valued cells and their backends.

use parking_lot::RwLock;

use crate::error::{GridError, Result};
use crate::value::{CellValue, ColumnType, DEFAULT_TYPE_SAMPLE_SIZE, infer_type};

/// A rectangular data source held inside a cell.
///
/// Tables are shared between cells, caches and the navigation stack, so all
/// mutation goes through `&self`.
pub trait NestedTable: Send + Sync {
    /// Number of rows.
    fn row_count(&self) -> usize;

    /// Number of columns.
    fn column_count(&self) -> usize;

    /// Name of `column`.
    fn column_name(&self, column: usize) -> Option<String>;

    /// Declared type of `column`; `None` when it must be inferred.
    fn column_type(&self, column: usize) -> Option<ColumnType>;

    /// The value at (`row`, `column`).
    fn value(&self, row: usize, column: usize) -> Option<CellValue>;

    /// Replace the value at (`row`, `column`).
    fn set_value(&self, row: usize, column: usize, value: CellValue) -> Result<()>;

    /// Append a row.
    fn add_row(&self, values: Vec<CellValue>) -> Result<()>;

    /// Insert a row before `row`.
    fn insert_row(&self, _row: usize, _values: Vec<CellValue>) -> Result<()> {
        Err(GridError::Unsupported {
            operation: "insert_row",
        })
    }

    /// Remove `row`.
    fn remove_row(&self, _row: usize) -> Result<()> {
        Err(GridError::Unsupported {
            operation: "remove_row",
        })
    }

    /// Returns `true` for backends that grow while data is still loading.
    fn is_growable(&self) -> bool {
        false
    }

    /// All values of `row`.
    fn row_values(&self, row: usize) -> Option<Vec<CellValue>> {
        if row >= self.row_count() {
            return None;
        }
        Some(
            (0..self.column_count())
                .map(|column| self.value(row, column).unwrap_or(CellValue::Null))
                .collect(),
        )
    }
}

fn check_cell(rows: &[Vec<CellValue>], row: usize, column: usize, width: usize) -> Result<()> {
    if row >= rows.len() {
        return Err(GridError::invalid_row(row as i64, rows.len()));
    }
    if column >= width {
        return Err(GridError::invalid_column(column as i64, width));
    }
    Ok(())
}

/// A fixed in-memory table. Column names and types never change after
/// construction; rows can be replaced cell by cell or appended.
pub struct StaticNestedTable {
    columns: Vec<String>,
    types: Vec<ColumnType>,
    rows: RwLock<Vec<Vec<CellValue>>>,
}

impl StaticNestedTable {
    /// Create a table with declared column types.
    pub fn new(columns: Vec<String>, types: Vec<ColumnType>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut types = types;
        types.resize(columns.len(), ColumnType::String);
        Self {
            columns,
            types,
            rows: RwLock::new(rows),
        }
    }

    /// Create a table whose column types are inferred from its rows.
    pub fn with_inferred_types(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let types = (0..columns.len())
            .map(|column| {
                infer_type(
                    rows.iter().filter_map(|row| row.get(column)),
                    DEFAULT_TYPE_SAMPLE_SIZE,
                )
            })
            .collect();
        Self::new(columns, types, rows)
    }
}

impl NestedTable for StaticNestedTable {
    fn row_count(&self) -> usize {
        self.rows.read().len()
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, column: usize) -> Option<String> {
        self.columns.get(column).cloned()
    }

    fn column_type(&self, column: usize) -> Option<ColumnType> {
        self.types.get(column).copied()
    }

    fn value(&self, row: usize, column: usize) -> Option<CellValue> {
        if column >= self.columns.len() {
            return None;
        }
        self.rows
            .read()
            .get(row)
            .map(|values| values.get(column).cloned().unwrap_or(CellValue::Null))
    }

    fn set_value(&self, row: usize, column: usize, value: CellValue) -> Result<()> {
        let mut rows = self.rows.write();
        check_cell(&rows, row, column, self.columns.len())?;
        let values = &mut rows[row];
        if values.len() <= column {
            values.resize(column + 1, CellValue::Null);
        }
        values[column] = value;
        Ok(())
    }

    fn add_row(&self, mut values: Vec<CellValue>) -> Result<()> {
        if values.len() > self.columns.len() {
            return Err(GridError::invalid_column(
                values.len() as i64 - 1,
                self.columns.len(),
            ));
        }
        values.resize(self.columns.len(), CellValue::Null);
        self.rows.write().push(values);
        Ok(())
    }
}

/// A growable table: rows and columns may be appended, inserted and removed.
#[derive(Default)]
pub struct DynamicNestedTable {
    columns: RwLock<Vec<String>>,
    rows: RwLock<Vec<Vec<CellValue>>>,
}

impl DynamicNestedTable {
    /// Create an empty table with the given columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns: RwLock::new(columns),
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Create a table holding `rows`.
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            columns: RwLock::new(columns),
            rows: RwLock::new(rows),
        }
    }

    /// Append a column; existing rows read `Null` for it.
    pub fn add_column(&self, name: impl Into<String>) {
        self.columns.write().push(name.into());
    }
}

impl NestedTable for DynamicNestedTable {
    fn row_count(&self) -> usize {
        self.rows.read().len()
    }

    fn column_count(&self) -> usize {
        self.columns.read().len()
    }

    fn column_name(&self, column: usize) -> Option<String> {
        self.columns.read().get(column).cloned()
    }

    fn column_type(&self, _column: usize) -> Option<ColumnType> {
        None
    }

    fn value(&self, row: usize, column: usize) -> Option<CellValue> {
        if column >= self.column_count() {
            return None;
        }
        self.rows
            .read()
            .get(row)
            .map(|values| values.get(column).cloned().unwrap_or(CellValue::Null))
    }

    fn set_value(&self, row: usize, column: usize, value: CellValue) -> Result<()> {
        let width = self.column_count();
        let mut rows = self.rows.write();
        check_cell(&rows, row, column, width)?;
        let values = &mut rows[row];
        if values.len() <= column {
            values.resize(column + 1, CellValue::Null);
        }
        values[column] = value;
        Ok(())
    }

    fn add_row(&self, values: Vec<CellValue>) -> Result<()> {
        self.rows.write().push(values);
        Ok(())
    }

    fn insert_row(&self, row: usize, values: Vec<CellValue>) -> Result<()> {
        let mut rows = self.rows.write();
        if row > rows.len() {
            return Err(GridError::invalid_row(row as i64, rows.len()));
        }
        rows.insert(row, values);
        Ok(())
    }

    fn remove_row(&self, row: usize) -> Result<()> {
        let mut rows = self.rows.write();
        if row >= rows.len() {
            return Err(GridError::invalid_row(row as i64, rows.len()));
        }
        rows.remove(row);
        Ok(())
    }

    fn is_growable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> StaticNestedTable {
        StaticNestedTable::with_inferred_types(
            vec!["sku".into(), "qty".into()],
            vec![
                vec!["a".into(), 1i64.into()],
                vec!["b".into(), 2i64.into()],
            ],
        )
    }

    #[test]
    fn test_static_table_types_are_fixed() {
        let table = items();
        assert_eq!(table.column_type(0), Some(ColumnType::String));
        assert_eq!(table.column_type(1), Some(ColumnType::Integer));
        table.set_value(0, 1, "many".into()).unwrap();
        assert_eq!(table.column_type(1), Some(ColumnType::Integer));
    }

    #[test]
    fn test_static_table_rejects_removal() {
        let table = items();
        assert!(matches!(
            table.remove_row(0),
            Err(GridError::Unsupported { operation: "remove_row" })
        ));
        assert!(table.add_row(vec!["c".into()]).is_ok());
        assert_eq!(table.value(2, 1), Some(CellValue::Null));
        assert!(table.add_row(vec![1i64.into(), 2i64.into(), 3i64.into()]).is_err());
        assert!(table.set_value(5, 0, CellValue::Null).is_err());
    }

    #[test]
    fn test_dynamic_table_grows() {
        let table = DynamicNestedTable::new(vec!["x".into()]);
        assert!(table.is_growable());
        table.add_row(vec![1i64.into()]).unwrap();
        table.insert_row(0, vec![0i64.into()]).unwrap();
        table.add_column("y");
        assert_eq!(table.row_values(0), Some(vec![CellValue::Integer(0), CellValue::Null]));
        table.remove_row(0).unwrap();
        assert_eq!(table.value(0, 0), Some(CellValue::Integer(1)));
        assert_eq!(table.column_type(0), None);
    }
}
