//! Flat in-memory model fed by a data producer.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::error::Result;
use crate::index::{Column, IndexSet, Model, ModelColumn, ModelRow, Row};
use crate::logging::targets;
use crate::value::CellValue;

use super::column::{GridColumn, GridRow};
use super::traits::{CellUpdate, GridMutator, ModelSignals, TabularModel};

/// A flat tabular model.
///
/// Producers push data through [`set_columns`](Self::set_columns),
/// [`add_rows`](Self::add_rows) and
/// [`after_last_row_added`](Self::after_last_row_added). The model can also be
/// edited in memory, through its `&self` methods or [`GridMutator`].
pub struct GridDataModel {
    columns: RwLock<Vec<GridColumn>>,
    rows: RwLock<Vec<GridRow>>,
    complete: AtomicBool,
    signals: ModelSignals,
}

impl Default for GridDataModel {
    fn default() -> Self {
        Self::new()
    }
}

impl GridDataModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self {
            columns: RwLock::new(Vec::new()),
            rows: RwLock::new(Vec::new()),
            complete: AtomicBool::new(false),
            signals: ModelSignals::new(),
        }
    }

    /// Creates a model holding the given columns and rows.
    pub fn with_data(columns: Vec<GridColumn>, rows: Vec<GridRow>) -> Self {
        let model = Self::new();
        *model.columns.write() = columns;
        *model.rows.write() = rows;
        model.complete.store(true, Ordering::Release);
        model
    }

    /// Replace the column set. Existing rows are dropped.
    pub fn set_columns(&self, columns: Vec<GridColumn>) {
        self.signals.emit_reset(|| {
            *self.columns.write() = columns;
            self.rows.write().clear();
            self.complete.store(false, Ordering::Release);
        });
    }

    /// Append a chunk of rows delivered by the producer.
    pub fn add_rows(&self, rows: Vec<GridRow>) {
        if rows.is_empty() {
            return;
        }
        let (first, last) = {
            let mut current = self.rows.write();
            let first = current.len();
            current.extend(rows);
            (first, current.len() - 1)
        };
        tracing::trace!(target: targets::MODEL, first, last, "rows added");
        self.signals
            .rows_inserted
            .emit((ModelRow::new(first), ModelRow::new(last)));
    }

    /// Mark the producer as finished.
    pub fn after_last_row_added(&self) {
        self.complete.store(true, Ordering::Release);
        tracing::debug!(target: targets::MODEL, rows = self.row_count(), "fetch finished");
        self.signals.fetch_finished.emit(());
    }

    /// Replace columns and rows at once.
    pub fn reset(&self, columns: Vec<GridColumn>, rows: Vec<GridRow>) {
        self.signals.emit_reset(|| {
            *self.columns.write() = columns;
            *self.rows.write() = rows;
            self.complete.store(true, Ordering::Release);
        });
    }

    /// Returns `true` once the producer delivered its last row.
    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    /// Replace the row at `row`, keeping its position.
    pub fn replace_row(&self, row: ModelRow, replacement: GridRow) -> Result<()> {
        let index = self.check_row(row)?;
        self.rows.write()[index] = replacement;
        for column in 0..self.column_count() {
            self.signals
                .data_changed
                .emit((row, ModelColumn::new(column)));
        }
        Ok(())
    }

    fn next_row_number(&self) -> usize {
        self.rows
            .read()
            .iter()
            .map(GridRow::number)
            .max()
            .unwrap_or(0)
            + 1
    }
}

impl TabularModel for GridDataModel {
    fn row_count(&self) -> usize {
        self.rows.read().len()
    }

    fn column_count(&self) -> usize {
        self.columns.read().len()
    }

    fn column(&self, column: ModelColumn) -> Result<GridColumn> {
        let index = self.check_column(column)?;
        Ok(self.columns.read()[index].clone())
    }

    fn row(&self, row: ModelRow) -> Result<GridRow> {
        let index = self.check_row(row)?;
        Ok(self.rows.read()[index].clone())
    }

    fn value(&self, row: ModelRow, column: ModelColumn) -> Result<CellValue> {
        let column_index = self.check_column(column)?;
        let row_index = self.check_row(row)?;
        Ok(self.rows.read()[row_index]
            .value(column_index)
            .cloned()
            .unwrap_or(CellValue::Null))
    }

    fn columns(&self) -> Vec<GridColumn> {
        self.columns.read().clone()
    }

    fn rows(&self) -> Vec<GridRow> {
        self.rows.read().clone()
    }

    fn signals(&self) -> &ModelSignals {
        &self.signals
    }
}

impl GridMutator for GridDataModel {
    fn insert_rows(&mut self, count: usize) -> Result<()> {
        GridDataModel::insert_rows(self, count)
    }

    fn clone_row(&mut self, row: ModelRow) -> Result<()> {
        GridDataModel::clone_row(self, row)
    }

    fn delete_rows(&mut self, rows: &IndexSet<Model, Row>) -> Result<()> {
        GridDataModel::delete_rows(self, rows)
    }

    fn insert_column(&mut self, name: Option<&str>) -> Result<()> {
        GridDataModel::insert_column(self, name)
    }

    fn delete_columns(&mut self, columns: &IndexSet<Model, Column>) -> Result<()> {
        GridDataModel::delete_columns(self, columns)
    }

    fn rename_column(&mut self, column: ModelColumn, name: &str) -> Result<()> {
        GridDataModel::rename_column(self, column, name)
    }

    fn move_column(&mut self, from: ModelColumn, to: ModelColumn) -> Result<()> {
        GridDataModel::move_column(self, from, to)
    }

    fn update_cells(&mut self, updates: &[CellUpdate]) -> Result<()> {
        GridDataModel::update_cells(self, updates)
    }
}

/// In-place edits. These take `&self`, so a model shared through an `Arc`
/// can be edited directly.
impl GridDataModel {
    /// Append `count` empty rows.
    pub fn insert_rows(&self, count: usize) -> Result<()> {
        let first_number = self.next_row_number();
        let width = self.column_count();
        self.add_rows(
            (0..count)
                .map(|i| GridRow::empty(first_number + i, width))
                .collect(),
        );
        Ok(())
    }

    /// Append a copy of `row`.
    pub fn clone_row(&self, row: ModelRow) -> Result<()> {
        let source = self.row(row)?;
        let number = self.next_row_number();
        self.add_rows(vec![GridRow::new(number, source.values().to_vec())]);
        Ok(())
    }

    /// Remove `rows`. Fails without changes if any row is out of range.
    pub fn delete_rows(&self, rows: &IndexSet<Model, Row>) -> Result<()> {
        let rows = rows.sorted();
        for row in rows.iter() {
            self.check_row(row)?;
        }
        if rows.is_empty() {
            return Ok(());
        }
        {
            let mut current = self.rows.write();
            // Back to front so earlier positions stay valid.
            for row in rows.iter().rev() {
                if let Some(index) = row.as_usize() {
                    current.remove(index);
                }
            }
        }
        tracing::debug!(target: targets::MODEL, count = rows.len(), "rows deleted");
        self.signals.rows_removed.emit(rows);
        Ok(())
    }

    /// Append a column, null in every row.
    pub fn insert_column(&self, name: Option<&str>) -> Result<()> {
        let number = self.column_count();
        let name = name.map_or_else(|| format!("C{}", number + 1), str::to_string);
        self.columns.write().push(GridColumn::new(number, name));
        for row in self.rows.write().iter_mut() {
            row.values_mut().resize(number + 1, CellValue::Null);
        }
        let column = ModelColumn::new(number);
        self.signals.columns_inserted.emit((column, column));
        Ok(())
    }

    /// Remove `columns`. Fails without changes if any column is out of range.
    pub fn delete_columns(&self, columns: &IndexSet<Model, Column>) -> Result<()> {
        let columns = columns.sorted();
        for column in columns.iter() {
            self.check_column(column)?;
        }
        {
            let mut current = self.columns.write();
            let mut rows = self.rows.write();
            for column in columns.iter().rev() {
                if let Some(index) = column.as_usize() {
                    current.remove(index);
                    for row in rows.iter_mut() {
                        if index < row.len() {
                            row.values_mut().remove(index);
                        }
                    }
                }
            }
            for (number, column) in current.iter_mut().enumerate() {
                column.set_number(number);
            }
        }
        self.signals.columns_removed.emit(columns);
        Ok(())
    }

    /// Rename `column`.
    pub fn rename_column(&self, column: ModelColumn, name: &str) -> Result<()> {
        let index = self.check_column(column)?;
        self.columns.write()[index].set_name(name);
        Ok(())
    }

    /// Move `from` to position `to`.
    pub fn move_column(&self, from: ModelColumn, to: ModelColumn) -> Result<()> {
        let from = self.check_column(from)?;
        let to = self.check_column(to)?;
        if from == to {
            return Ok(());
        }
        self.signals.emit_reset(|| {
            let mut columns = self.columns.write();
            let moved = columns.remove(from);
            columns.insert(to, moved);
            for (number, column) in columns.iter_mut().enumerate() {
                column.set_number(number);
            }
            for row in self.rows.write().iter_mut() {
                let values = row.values_mut();
                if from < values.len() && to < values.len() {
                    let moved = values.remove(from);
                    values.insert(to, moved);
                }
            }
        });
        Ok(())
    }

    /// Apply `updates`. Fails without changes if any coordinate is out of range.
    pub fn update_cells(&self, updates: &[CellUpdate]) -> Result<()> {
        for update in updates {
            self.check_row(update.row)?;
            self.check_column(update.column)?;
        }
        for update in updates {
            if let (Some(row), Some(column)) = (update.row.as_usize(), update.column.as_usize()) {
                let mut rows = self.rows.write();
                let values = rows[row].values_mut();
                if values.len() <= column {
                    values.resize(column + 1, CellValue::Null);
                }
                values[column] = update.value.clone();
            }
            self.signals.data_changed.emit((update.row, update.column));
        }
        Ok(())
    }
}

impl std::fmt::Debug for GridDataModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridDataModel")
            .field("columns", &self.column_count())
            .field("rows", &self.row_count())
            .field("complete", &self.is_complete())
            .finish()
    }
}
