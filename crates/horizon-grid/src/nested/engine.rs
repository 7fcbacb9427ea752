//! Navigation into table-valued cells.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use horizon_grid_core::ConnectionId;
use parking_lot::Mutex;

use crate::error::{GridError, Result};
use crate::index::{IndexSet, Model, ModelColumn, ModelRow, Row};
use crate::logging::targets;
use crate::model::{GridColumn, GridRow, TabularModel};
use crate::settings::GridSettings;
use crate::value::{CellValue, ColumnType, DEFAULT_TYPE_SAMPLE_SIZE, infer_type};

use super::cache::BoundedCache;
use super::path::{Coordinate, NavigationPath};
use super::table::NestedTable;

/// Default number of tables whose derived rows and columns stay cached.
pub const DEFAULT_CACHE_CAPACITY: usize = 3;

/// Cache key comparing nested tables by instance.
#[derive(Clone)]
struct TableKey(Arc<dyn NestedTable>);

impl TableKey {
    fn address(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for TableKey {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for TableKey {}

impl Hash for TableKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

fn same_table(a: &Arc<dyn NestedTable>, b: &Arc<dyn NestedTable>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// A column of a nested table.
///
/// The type is resolved on first request, from the table's declared type or
/// by sampling its values, and kept for the lifetime of the wrapper.
pub struct NestedTableColumn {
    table: Arc<dyn NestedTable>,
    index: usize,
    name: String,
    sample_size: usize,
    column_type: OnceLock<ColumnType>,
}

impl NestedTableColumn {
    fn new(table: Arc<dyn NestedTable>, index: usize, sample_size: usize) -> Self {
        let name = table
            .column_name(index)
            .unwrap_or_else(|| format!("C{}", index + 1));
        Self {
            table,
            index,
            name,
            sample_size,
            column_type: OnceLock::new(),
        }
    }

    /// Position of the column in its table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` once the type has been resolved.
    pub fn is_type_resolved(&self) -> bool {
        self.column_type.get().is_some()
    }

    /// The column type.
    pub fn column_type(&self) -> ColumnType {
        *self.column_type.get_or_init(|| {
            self.table.column_type(self.index).unwrap_or_else(|| {
                let rows = self.table.row_count().min(self.sample_size);
                let values: Vec<CellValue> = (0..rows)
                    .filter_map(|row| self.table.value(row, self.index))
                    .collect();
                infer_type(&values, self.sample_size)
            })
        })
    }

    /// Display name of the column type.
    pub fn type_name(&self) -> &'static str {
        self.column_type().name()
    }

    /// This column as a grid column.
    pub fn to_grid_column(&self) -> GridColumn {
        GridColumn::new(self.index, self.name.clone()).with_type(self.column_type())
    }
}

impl fmt::Debug for NestedTableColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NestedTableColumn")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("column_type", &self.column_type.get())
            .finish()
    }
}

struct EngineState {
    path: NavigationPath,
    /// The table entered at each level of `path`.
    tables: Vec<Arc<dyn NestedTable>>,
    rows: BoundedCache<TableKey, Arc<Vec<GridRow>>>,
    columns: BoundedCache<TableKey, Arc<Vec<NestedTableColumn>>>,
}

struct TopConnections {
    rows_removed: ConnectionId,
    columns_removed: ConnectionId,
    data_changed: ConnectionId,
    model_reset: ConnectionId,
}

/// Drill-down navigation through table-valued cells.
///
/// The engine keeps the stack of entered coordinates together with the table
/// each one resolved to. Structural changes of the top-level model mark the
/// path stale; it is re-resolved on the next access and truncated to its
/// longest prefix that still leads to the same tables.
///
/// Derived rows and columns of nested tables are materialized on first access
/// and kept in two bounded least-recently-used caches keyed by table
/// instance.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_grid::model::{GridColumn, GridDataModel, GridRow};
/// use horizon_grid::nested::{Coordinate, NestedTableEngine, StaticNestedTable};
/// use horizon_grid::value::CellValue;
///
/// let items = StaticNestedTable::with_inferred_types(
///     vec!["sku".into()],
///     vec![vec!["a-1".into()]],
/// );
/// let model = Arc::new(GridDataModel::with_data(
///     vec![GridColumn::new(0, "items")],
///     vec![GridRow::new(1, vec![CellValue::Table(Arc::new(items))])],
/// ));
///
/// let engine = NestedTableEngine::new(model);
/// engine.enter(Coordinate::new(0, 0)).unwrap();
/// assert_eq!(engine.depth(), 1);
/// assert_eq!(engine.current_rows().len(), 1);
/// ```
pub struct NestedTableEngine {
    top: Arc<dyn TabularModel>,
    state: Mutex<EngineState>,
    stale: Arc<AtomicBool>,
    enabled: bool,
    sample_size: usize,
    connections: TopConnections,
}

impl NestedTableEngine {
    /// Create an engine over `top` with default settings.
    pub fn new(top: Arc<dyn TabularModel>) -> Self {
        Self::with_options(top, DEFAULT_CACHE_CAPACITY, true, DEFAULT_TYPE_SAMPLE_SIZE)
    }

    /// Create an engine over `top` configured from `settings`.
    pub fn with_settings(top: Arc<dyn TabularModel>, settings: &GridSettings) -> Self {
        Self::with_options(
            top,
            settings.nested_cache_capacity,
            settings.nested_tables_enabled,
            settings.type_sample_size,
        )
    }

    fn with_options(
        top: Arc<dyn TabularModel>,
        capacity: usize,
        enabled: bool,
        sample_size: usize,
    ) -> Self {
        let stale = Arc::new(AtomicBool::new(false));
        let signals = top.signals();

        let flag = stale.clone();
        let rows_removed = signals.rows_removed.connect(move |_| flag.store(true, Ordering::Release));
        let flag = stale.clone();
        let columns_removed =
            signals.columns_removed.connect(move |_| flag.store(true, Ordering::Release));
        let flag = stale.clone();
        let data_changed = signals.data_changed.connect(move |_| flag.store(true, Ordering::Release));
        let flag = stale.clone();
        let model_reset = signals.model_reset.connect(move |_| flag.store(true, Ordering::Release));

        Self {
            top,
            state: Mutex::new(EngineState {
                path: NavigationPath::new(),
                tables: Vec::new(),
                rows: BoundedCache::new(capacity),
                columns: BoundedCache::new(capacity),
            }),
            stale,
            enabled,
            sample_size,
            connections: TopConnections {
                rows_removed,
                columns_removed,
                data_changed,
                model_reset,
            },
        }
    }

    /// The top-level model.
    pub fn top(&self) -> &Arc<dyn TabularModel> {
        &self.top
    }

    /// Returns `true` if table-valued cells may be entered.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Resolve the cell at `coordinate` in the level below `tables`.
    fn resolve(
        &self,
        tables: &[Arc<dyn NestedTable>],
        coordinate: Coordinate,
    ) -> Option<Arc<dyn NestedTable>> {
        let value = match tables.last() {
            Some(table) => table.value(coordinate.row, coordinate.column)?,
            None => self
                .top
                .value(ModelRow::new(coordinate.row), ModelColumn::new(coordinate.column))
                .ok()?,
        };
        value.as_table().cloned()
    }

    /// Enter the nested table held by the cell at `coordinate` of the current
    /// level.
    pub fn enter(&self, coordinate: Coordinate) -> Result<Arc<dyn NestedTable>> {
        if !self.enabled {
            return Err(GridError::navigation(
                coordinate.row,
                coordinate.column,
                "nested tables are disabled",
            ));
        }
        self.sync();
        let mut state = self.state.lock();
        let table = self.resolve(&state.tables, coordinate).ok_or_else(|| {
            GridError::navigation(coordinate.row, coordinate.column, "cell does not hold a table")
        })?;
        state.path.push(coordinate);
        state.tables.push(table.clone());
        tracing::debug!(
            target: targets::NESTED,
            %coordinate,
            depth = state.path.len(),
            "entered nested table"
        );
        Ok(table)
    }

    /// Leave `steps` levels, clamped to the current depth. Returns the number
    /// of levels actually left.
    pub fn exit(&self, steps: usize) -> usize {
        self.sync();
        let mut state = self.state.lock();
        let steps = steps.min(state.path.len());
        let depth = state.path.len() - steps;
        state.path.truncate(depth);
        state.tables.truncate(depth);
        tracing::debug!(target: targets::NESTED, steps, depth, "left nested tables");
        steps
    }

    /// Return to the top-level model.
    pub fn exit_to_top(&self) {
        let mut state = self.state.lock();
        state.path.clear();
        state.tables.clear();
        self.stale.store(false, Ordering::Release);
    }

    /// Re-resolve every coordinate of the path, truncating it at the first
    /// one that no longer leads to the table it was entered on. Returns the
    /// number of levels removed.
    pub fn revalidate(&self) -> usize {
        let _span =
            tracing::debug_span!(target: targets::NESTED, "horizon_grid::revalidate").entered();

        self.stale.store(false, Ordering::Release);
        let mut state = self.state.lock();
        let before = state.path.len();
        let mut valid = 0;
        while valid < before {
            let coordinate = state.path.coordinates()[valid];
            let resolved = self.resolve(&state.tables[..valid], coordinate);
            match resolved {
                Some(table) if same_table(&table, &state.tables[valid]) => valid += 1,
                _ => break,
            }
        }
        state.path.truncate(valid);
        state.tables.truncate(valid);

        let removed = before - valid;
        if removed > 0 {
            tracing::debug!(
                target: targets::NESTED,
                removed,
                path = %state.path,
                "navigation path truncated"
            );
        }
        removed
    }

    /// Revalidate if the top-level model changed structurally since the last
    /// check.
    pub fn sync(&self) -> usize {
        if self.stale.load(Ordering::Acquire) {
            self.revalidate()
        } else {
            0
        }
    }

    /// The current navigation path.
    pub fn path(&self) -> NavigationPath {
        self.sync();
        self.state.lock().path.clone()
    }

    /// Number of entered levels.
    pub fn depth(&self) -> usize {
        self.sync();
        self.state.lock().path.len()
    }

    /// Returns `true` while a nested table is shown.
    pub fn is_nested(&self) -> bool {
        self.depth() > 0
    }

    /// The innermost entered table, or `None` at the top level.
    pub fn current_table(&self) -> Option<Arc<dyn NestedTable>> {
        self.sync();
        self.state.lock().tables.last().cloned()
    }

    /// Rows of the current level.
    pub fn current_rows(&self) -> Arc<Vec<GridRow>> {
        self.sync();
        let mut state = self.state.lock();
        let Some(table) = state.tables.last().cloned() else {
            drop(state);
            return Arc::new(self.top.rows());
        };
        let key = TableKey(table.clone());
        if let Some(rows) = state.rows.get(&key) {
            return rows.clone();
        }
        let rows: Arc<Vec<GridRow>> = Arc::new(
            (0..table.row_count())
                .filter_map(|row| {
                    table
                        .row_values(row)
                        .map(|values| GridRow::new(row + 1, values))
                })
                .collect(),
        );
        if state.rows.insert(key, rows.clone()).is_some() {
            tracing::trace!(target: targets::NESTED, "evicted cached nested rows");
        }
        rows
    }

    /// Column wrappers of the current nested table, or `None` at the top
    /// level.
    pub fn nested_columns(&self) -> Option<Arc<Vec<NestedTableColumn>>> {
        self.sync();
        let mut state = self.state.lock();
        let table = state.tables.last().cloned()?;
        let key = TableKey(table.clone());
        if let Some(columns) = state.columns.get(&key) {
            return Some(columns.clone());
        }
        let columns: Arc<Vec<NestedTableColumn>> = Arc::new(
            (0..table.column_count())
                .map(|column| NestedTableColumn::new(table.clone(), column, self.sample_size))
                .collect(),
        );
        if state.columns.insert(key, columns.clone()).is_some() {
            tracing::trace!(target: targets::NESTED, "evicted cached nested columns");
        }
        Some(columns)
    }

    /// Columns of the current level.
    pub fn current_columns(&self) -> Vec<GridColumn> {
        match self.nested_columns() {
            Some(columns) => columns.iter().map(NestedTableColumn::to_grid_column).collect(),
            None => self.top.columns(),
        }
    }

    /// Drop the derived rows and columns cached for `table`.
    pub fn invalidate(&self, table: &Arc<dyn NestedTable>) {
        let key = TableKey(table.clone());
        let mut state = self.state.lock();
        state.rows.remove(&key);
        state.columns.remove(&key);
    }

    /// Drop every cached derivation.
    pub fn clear_caches(&self) {
        let mut state = self.state.lock();
        state.rows.clear();
        state.columns.clear();
    }

    /// Number of tables with cached rows.
    pub fn cached_tables(&self) -> usize {
        self.state.lock().rows.len()
    }

    fn current_or_unsupported(&self, operation: &'static str) -> Result<Arc<dyn NestedTable>> {
        self.current_table()
            .ok_or(GridError::Unsupported { operation })
    }

    /// Replace a value of the current nested table.
    ///
    /// Top-level edits go through the model's own mutator.
    pub fn set_value(&self, row: usize, column: usize, value: CellValue) -> Result<()> {
        let table = self.current_or_unsupported("set_value")?;
        table.set_value(row, column, value)?;
        self.invalidate(&table);
        self.revalidate();
        Ok(())
    }

    /// Append a row to the current nested table.
    pub fn add_row(&self, values: Vec<CellValue>) -> Result<()> {
        let table = self.current_or_unsupported("add_row")?;
        table.add_row(values)?;
        self.invalidate(&table);
        Ok(())
    }

    /// Remove rows of the current nested table.
    pub fn remove_rows(&self, rows: &IndexSet<Model, Row>) -> Result<()> {
        let table = self.current_or_unsupported("remove_row")?;
        let sorted = rows.sorted();
        let mut removed = Vec::with_capacity(sorted.len());
        for row in sorted.iter() {
            let index = row
                .as_usize()
                .filter(|&i| i < table.row_count())
                .ok_or_else(|| GridError::invalid_row(row.value(), table.row_count()))?;
            removed.push(index);
        }
        let result = removed
            .iter()
            .rev()
            .try_for_each(|&index| table.remove_row(index));
        self.invalidate(&table);
        self.revalidate();
        result
    }
}

impl Drop for NestedTableEngine {
    fn drop(&mut self) {
        let signals = self.top.signals();
        signals.rows_removed.disconnect(self.connections.rows_removed);
        signals.columns_removed.disconnect(self.connections.columns_removed);
        signals.data_changed.disconnect(self.connections.data_changed);
        signals.model_reset.disconnect(self.connections.model_reset);
    }
}

impl fmt::Debug for NestedTableEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("NestedTableEngine")
            .field("path", &state.path)
            .field("enabled", &self.enabled)
            .field("cached_tables", &state.rows.len())
            .finish()
    }
}
