//! Read and write contracts for tabular models.

use horizon_grid_core::Signal;

use crate::error::{GridError, Result};
use crate::index::{Column, IndexSet, Model, ModelColumn, ModelRow, Row};
use crate::value::CellValue;

use super::column::{GridColumn, GridRow};

/// Read access to a rectangular set of rows and columns.
///
/// Everything is addressed by model index; out-of-range indices are reported
/// as [`GridError::InvalidIndex`], never clamped.
///
/// # Implementing TabularModel
///
/// ```
/// use horizon_grid::error::{GridError, Result};
/// use horizon_grid::index::{ModelColumn, ModelRow};
/// use horizon_grid::model::{GridColumn, GridRow, ModelSignals, TabularModel};
///
/// struct Numbers {
///     signals: ModelSignals,
/// }
///
/// impl TabularModel for Numbers {
///     fn row_count(&self) -> usize { 10 }
///     fn column_count(&self) -> usize { 1 }
///
///     fn column(&self, column: ModelColumn) -> Result<GridColumn> {
///         self.check_column(column)?;
///         Ok(GridColumn::new(0, "n"))
///     }
///
///     fn row(&self, row: ModelRow) -> Result<GridRow> {
///         let index = self.check_row(row)?;
///         Ok(GridRow::new(index + 1, vec![(index as i64).into()]))
///     }
///
///     fn signals(&self) -> &ModelSignals {
///         &self.signals
///     }
/// }
/// ```
pub trait TabularModel: Send + Sync {
    /// Number of rows.
    fn row_count(&self) -> usize;

    /// Number of columns.
    fn column_count(&self) -> usize;

    /// The column at `column`.
    fn column(&self, column: ModelColumn) -> Result<GridColumn>;

    /// The row at `row`.
    fn row(&self, row: ModelRow) -> Result<GridRow>;

    /// Change signals of this model.
    fn signals(&self) -> &ModelSignals;

    /// The value at (`row`, `column`).
    ///
    /// Rows shorter than the column count yield `Null` for the missing cells.
    fn value(&self, row: ModelRow, column: ModelColumn) -> Result<CellValue> {
        let column_index = self.check_column(column)?;
        let row = self.row(row)?;
        Ok(row.value(column_index).cloned().unwrap_or(CellValue::Null))
    }

    /// All columns in order.
    fn columns(&self) -> Vec<GridColumn> {
        (0..self.column_count())
            .filter_map(|i| self.column(ModelColumn::new(i)).ok())
            .collect()
    }

    /// All rows in order.
    fn rows(&self) -> Vec<GridRow> {
        (0..self.row_count())
            .filter_map(|i| self.row(ModelRow::new(i)).ok())
            .collect()
    }

    /// Returns `true` if `row` addresses an existing row.
    fn is_valid_row(&self, row: ModelRow) -> bool {
        row.as_usize().is_some_and(|i| i < self.row_count())
    }

    /// Returns `true` if `column` addresses an existing column.
    fn is_valid_column(&self, column: ModelColumn) -> bool {
        column.as_usize().is_some_and(|i| i < self.column_count())
    }

    /// Validate `row`, returning its position.
    fn check_row(&self, row: ModelRow) -> Result<usize> {
        row.as_usize()
            .filter(|&i| i < self.row_count())
            .ok_or_else(|| GridError::invalid_row(row.value(), self.row_count()))
    }

    /// Validate `column`, returning its position.
    fn check_column(&self, column: ModelColumn) -> Result<usize> {
        column
            .as_usize()
            .filter(|&i| i < self.column_count())
            .ok_or_else(|| GridError::invalid_column(column.value(), self.column_count()))
    }
}

/// One cell edit of a batched update.
#[derive(Debug, Clone, PartialEq)]
pub struct CellUpdate {
    /// Target row.
    pub row: ModelRow,
    /// Target column.
    pub column: ModelColumn,
    /// New value.
    pub value: CellValue,
}

impl CellUpdate {
    /// Create a cell update.
    pub fn new(row: ModelRow, column: ModelColumn, value: impl Into<CellValue>) -> Self {
        Self {
            row,
            column,
            value: value.into(),
        }
    }
}

/// Structural and cell edits, expressed in model indices.
///
/// Index sets are processed in ascending order regardless of the order the
/// caller selected them in.
pub trait GridMutator {
    /// Returns `true` if edits are rejected.
    fn is_read_only(&self) -> bool {
        false
    }

    /// Append `count` new rows.
    fn insert_rows(&mut self, count: usize) -> Result<()>;

    /// Append a copy of `row`.
    fn clone_row(&mut self, row: ModelRow) -> Result<()>;

    /// Delete the given rows.
    fn delete_rows(&mut self, rows: &IndexSet<Model, Row>) -> Result<()>;

    /// Append a new column, named `name` or a generated default.
    fn insert_column(&mut self, name: Option<&str>) -> Result<()>;

    /// Delete the given columns.
    fn delete_columns(&mut self, columns: &IndexSet<Model, Column>) -> Result<()>;

    /// Rename `column`.
    fn rename_column(&mut self, column: ModelColumn, name: &str) -> Result<()>;

    /// Move `from` so that it ends up at position `to`.
    fn move_column(&mut self, from: ModelColumn, to: ModelColumn) -> Result<()>;

    /// Apply a batch of cell edits.
    fn update_cells(&mut self, updates: &[CellUpdate]) -> Result<()>;
}

/// Change notifications of a tabular model.
///
/// Row and column ranges are given in model indices as they were when the
/// change happened. A reset invalidates every index handed out before it.
pub struct ModelSignals {
    /// (first, last) of a block of appended or inserted rows.
    pub rows_inserted: Signal<(ModelRow, ModelRow)>,
    /// Deleted rows, ascending, in pre-removal positions.
    pub rows_removed: Signal<IndexSet<Model, Row>>,
    /// (first, last) of a block of new columns.
    pub columns_inserted: Signal<(ModelColumn, ModelColumn)>,
    /// Deleted columns, ascending, in pre-removal positions.
    pub columns_removed: Signal<IndexSet<Model, Column>>,
    /// A single cell got a new value.
    pub data_changed: Signal<(ModelRow, ModelColumn)>,
    /// The producer delivered its last row.
    pub fetch_finished: Signal<()>,
    /// Columns and rows are about to be replaced wholesale.
    pub model_about_to_reset: Signal<()>,
    /// Columns and rows were replaced wholesale.
    pub model_reset: Signal<()>,
}

impl Default for ModelSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ModelSignals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSignals").finish_non_exhaustive()
    }
}

impl ModelSignals {
    /// Signals with nothing connected.
    pub fn new() -> Self {
        Self {
            rows_inserted: Signal::default(),
            rows_removed: Signal::default(),
            columns_inserted: Signal::default(),
            columns_removed: Signal::default(),
            data_changed: Signal::default(),
            fetch_finished: Signal::default(),
            model_about_to_reset: Signal::default(),
            model_reset: Signal::default(),
        }
    }

    /// Run `replace` bracketed by `model_about_to_reset` and `model_reset`.
    pub fn emit_reset(&self, replace: impl FnOnce()) {
        self.model_about_to_reset.emit(());
        replace();
        self.model_reset.emit(());
    }

    /// Block or unblock every signal of the set.
    pub fn set_blocked(&self, blocked: bool) {
        self.rows_inserted.set_blocked(blocked);
        self.rows_removed.set_blocked(blocked);
        self.columns_inserted.set_blocked(blocked);
        self.columns_removed.set_blocked(blocked);
        self.data_changed.set_blocked(blocked);
        self.fetch_finished.set_blocked(blocked);
        self.model_about_to_reset.set_blocked(blocked);
        self.model_reset.set_blocked(blocked);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_emit_reset_order() {
        let signals = ModelSignals::new();
        let events = Arc::new(Mutex::new(Vec::new()));

        let e = events.clone();
        signals.model_about_to_reset.connect(move |_| e.lock().push("about"));
        let e = events.clone();
        signals.model_reset.connect(move |_| e.lock().push("reset"));

        let e = events.clone();
        signals.emit_reset(|| e.lock().push("work"));

        assert_eq!(*events.lock(), vec!["about", "work", "reset"]);
    }

    #[test]
    fn test_blocked_signals_are_silent() {
        let signals = ModelSignals::new();
        let count = Arc::new(Mutex::new(0));
        let c = count.clone();
        signals.data_changed.connect(move |_| *c.lock() += 1);

        signals.set_blocked(true);
        signals.data_changed.emit((ModelRow::new(0), ModelColumn::new(0)));
        signals.set_blocked(false);
        signals.data_changed.emit((ModelRow::new(0), ModelColumn::new(0)));

        assert_eq!(*count.lock(), 1);
    }
}
