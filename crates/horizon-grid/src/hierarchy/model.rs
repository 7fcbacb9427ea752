//! Leaf-column view over a model with nested column values.

use std::collections::HashMap;
use std::sync::Arc;

use horizon_grid_core::ConnectionId;
use parking_lot::{Mutex, RwLock};

use crate::error::Result;
use crate::index::{ModelColumn, ModelRow};
use crate::model::{GridColumn, GridRow, ModelSignals, TabularModel};
use crate::value::{CellValue, ColumnType};

use super::reader::HierarchicalReader;
use super::tree::ColumnNameNode;

/// Flattens a model whose cells hold nested arrays into one column per leaf of
/// a hierarchical column tree.
///
/// The source rows are wrapped, not copied: every value read resolves the
/// leaf's path against the source row on demand. Leaf column types are
/// inferred lazily and cached until the source resets.
pub struct HierarchicalModel {
    source: Arc<dyn TabularModel>,
    reader: RwLock<HierarchicalReader>,
    types: Arc<Mutex<HashMap<usize, ColumnType>>>,
    sample_size: usize,
    signals: Arc<ModelSignals>,
    connections: SourceConnections,
}

/// Connections to the wrapped model's signals, released on drop.
struct SourceConnections {
    rows_inserted: ConnectionId,
    rows_removed: ConnectionId,
    fetch_finished: ConnectionId,
    model_reset: ConnectionId,
}

impl HierarchicalModel {
    /// Wrap `source` using the given column tree.
    pub fn new(source: Arc<dyn TabularModel>, roots: &[ColumnNameNode], sample_size: usize) -> Self {
        let signals = Arc::new(ModelSignals::new());
        let types: Arc<Mutex<HashMap<usize, ColumnType>>> = Arc::new(Mutex::new(HashMap::new()));
        let source_signals = source.signals();

        let forward = signals.clone();
        let rows_inserted = source_signals.rows_inserted.connect(move |&range| {
            forward.rows_inserted.emit(range);
        });
        let forward = signals.clone();
        let rows_removed = source_signals.rows_removed.connect(move |rows| {
            forward.rows_removed.emit(rows.clone());
        });
        let forward = signals.clone();
        let fetch_finished = source_signals.fetch_finished.connect(move |_| {
            forward.fetch_finished.emit(());
        });
        let forward = signals.clone();
        let reset_types = types.clone();
        let model_reset = source_signals.model_reset.connect(move |_| {
            reset_types.lock().clear();
            forward.emit_reset(|| {});
        });
        let connections = SourceConnections {
            rows_inserted,
            rows_removed,
            fetch_finished,
            model_reset,
        };

        Self {
            source,
            reader: RwLock::new(HierarchicalReader::new(roots)),
            types,
            sample_size,
            signals,
            connections,
        }
    }

    /// Replace the column tree.
    pub fn set_columns(&self, roots: &[ColumnNameNode]) {
        self.signals.emit_reset(|| {
            self.reader.write().set_columns(roots);
            self.types.lock().clear();
        });
    }

    /// Read access to the column tree queries.
    pub fn reader(&self) -> parking_lot::RwLockReadGuard<'_, HierarchicalReader> {
        self.reader.read()
    }

    /// Mutable access to the column tree queries (e.g. to update the depth
    /// of hierarchy).
    pub fn reader_mut(&self) -> parking_lot::RwLockWriteGuard<'_, HierarchicalReader> {
        self.reader.write()
    }

    /// The wrapped model.
    pub fn source(&self) -> &Arc<dyn TabularModel> {
        &self.source
    }

    fn leaf_type(&self, leaf: usize, path: &[usize]) -> ColumnType {
        if let Some(&ty) = self.types.lock().get(&leaf) {
            return ty;
        }
        let rows: Vec<GridRow> = (0..self.source.row_count().min(self.sample_size))
            .filter_map(|i| self.source.row(ModelRow::new(i)).ok())
            .collect();
        let ty = self.reader.read().infer_type(&rows, path, self.sample_size);
        self.types.lock().insert(leaf, ty);
        ty
    }
}

impl TabularModel for HierarchicalModel {
    fn row_count(&self) -> usize {
        self.source.row_count()
    }

    fn column_count(&self) -> usize {
        self.reader.read().leaf_count()
    }

    fn column(&self, column: ModelColumn) -> Result<GridColumn> {
        let leaf = self.check_column(column)?;
        let (name, path) = {
            let reader = self.reader.read();
            let tree = reader.tree();
            let id = reader.leaves()[leaf];
            (tree.name(id).to_string(), tree.path(id).to_vec())
        };
        let ty = self.leaf_type(leaf, &path);
        Ok(GridColumn::new(leaf, name).with_type(ty))
    }

    fn row(&self, row: ModelRow) -> Result<GridRow> {
        let source_row = self.source.row(row)?;
        let reader = self.reader.read();
        let values = (0..reader.leaf_count())
            .map(|leaf| {
                let path = reader.path_of_leaf(leaf).unwrap_or_default();
                reader.value_at(&source_row, path)
            })
            .collect::<Result<Vec<CellValue>>>()?;
        Ok(GridRow::new(source_row.number(), values))
    }

    fn value(&self, row: ModelRow, column: ModelColumn) -> Result<CellValue> {
        let leaf = self.check_column(column)?;
        let source_row = self.source.row(row)?;
        let reader = self.reader.read();
        let path = reader.path_of_leaf(leaf).unwrap_or_default();
        reader.value_at(&source_row, path)
    }

    fn signals(&self) -> &ModelSignals {
        &self.signals
    }
}

impl Drop for HierarchicalModel {
    fn drop(&mut self) {
        let source_signals = self.source.signals();
        source_signals.rows_inserted.disconnect(self.connections.rows_inserted);
        source_signals.rows_removed.disconnect(self.connections.rows_removed);
        source_signals.fetch_finished.disconnect(self.connections.fetch_finished);
        source_signals.model_reset.disconnect(self.connections.model_reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GridError;
    use crate::model::GridDataModel;

    fn source() -> Arc<GridDataModel> {
        Arc::new(GridDataModel::with_data(
            vec![GridColumn::new(0, "user"), GridColumn::new(1, "score")],
            vec![
                GridRow::new(
                    1,
                    vec![CellValue::Array(vec!["ann".into(), 31i64.into()]), 10i64.into()],
                ),
                GridRow::new(
                    2,
                    vec![CellValue::Array(vec!["bob".into(), 42i64.into()]), 1.5f64.into()],
                ),
            ],
        ))
    }

    fn columns() -> Vec<ColumnNameNode> {
        vec![
            ColumnNameNode::group(
                "user",
                vec![ColumnNameNode::leaf("name"), ColumnNameNode::leaf("age")],
            ),
            ColumnNameNode::leaf("score"),
        ]
    }

    #[test]
    fn test_leaf_columns() {
        let model = HierarchicalModel::new(source(), &columns(), 200);
        assert_eq!(model.column_count(), 3);
        assert_eq!(model.row_count(), 2);
        let age = model.column(ModelColumn::new(1)).unwrap();
        assert_eq!(age.name(), "age");
        assert_eq!(age.column_type(), ColumnType::Integer);
        assert_eq!(
            model.column(ModelColumn::new(2)).unwrap().column_type(),
            ColumnType::Double
        );
    }

    #[test]
    fn test_values_resolve_through_paths() {
        let model = HierarchicalModel::new(source(), &columns(), 200);
        assert_eq!(
            model.value(ModelRow::new(1), ModelColumn::new(0)).unwrap(),
            CellValue::Text("bob".into())
        );
        let row = model.row(ModelRow::new(0)).unwrap();
        assert_eq!(row.number(), 1);
        assert_eq!(row.values().len(), 3);
    }

    #[test]
    fn test_schema_mismatch_is_a_hard_failure() {
        let model = HierarchicalModel::new(
            source(),
            &[
                ColumnNameNode::leaf("user"),
                ColumnNameNode::group("score", vec![ColumnNameNode::leaf("inner")]),
            ],
            200,
        );
        assert!(matches!(
            model.value(ModelRow::new(0), ModelColumn::new(1)),
            Err(GridError::HierarchicalPath { row: 1, .. })
        ));
    }

    #[test]
    fn test_forwards_source_signals() {
        let source = source();
        let model = HierarchicalModel::new(source.clone(), &columns(), 200);
        let count = Arc::new(Mutex::new(0));
        let c = count.clone();
        model.signals().rows_inserted.connect(move |_| *c.lock() += 1);

        source.add_rows(vec![GridRow::new(3, vec![CellValue::Array(vec![]), 0i64.into()])]);
        assert_eq!(*count.lock(), 1);

        drop(model);
        assert_eq!(source.signals().rows_inserted.connection_count(), 0);
    }
}
