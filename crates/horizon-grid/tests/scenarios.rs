//! End-to-end behavior of the grid layers through the public API.

use std::sync::Arc;
use std::time::Duration;

use horizon_grid::hierarchy::{ColumnNameNode, HierarchicalReader};
use horizon_grid::index::{IndexSet, ModelColumn, ModelRow};
use horizon_grid::model::{CellUpdate, GridColumn, GridDataModel, GridMutator, GridRow, TabularModel};
use horizon_grid::nested::{Coordinate, NestedTableEngine, StaticNestedTable};
use horizon_grid::paging::{MultiPagePaging, NestedPaging, PageWindow, PagingModel};
use horizon_grid::text::{CsvFormat, ParseService, RopeBuffer, TextBuffer, TextMutationEngine};
use horizon_grid::{CellValue, GridError};
use pretty_assertions::assert_eq;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn csv_engine(text: &str, header: bool) -> TextMutationEngine<RopeBuffer, CsvFormat> {
    TextMutationEngine::new(RopeBuffer::new(text), CsvFormat::new().with_header(header)).unwrap()
}

#[test]
fn test_rename_column_in_header() {
    let mut engine = csv_engine("a,b,c\n1,2,3", true);
    engine.rename_column(ModelColumn::new(1), "bb").unwrap();

    assert_eq!(engine.buffer().text(), "a,bb,c\n1,2,3");
    let model = engine.model();
    assert_eq!(model.column(ModelColumn::new(1)).unwrap().name(), "bb");
    assert_eq!(model.row_count(), 1);
}

#[test]
fn test_insert_column_without_header() {
    let mut engine = csv_engine("x,y", false);
    engine.insert_column(None).unwrap();

    assert_eq!(engine.buffer().text(), "x,y,");
    assert!(!engine.format().has_header);
    assert_eq!(engine.markup().column_count(), 3);
    assert_eq!(engine.markup().columns()[2].name(), "C3");
}

#[test]
fn test_move_first_column_to_end() {
    let mut engine = csv_engine("a,b,c\n1,2,3\n4,5,6\n", false);
    engine
        .move_column(ModelColumn::new(0), ModelColumn::new(2))
        .unwrap();

    assert_eq!(engine.buffer().text(), "b,c,a\n2,3,1\n5,6,4\n");
}

#[test]
fn test_hierarchical_leaf_paths() {
    let reader = HierarchicalReader::new(&[
        ColumnNameNode::group(
            "user",
            vec![ColumnNameNode::leaf("name"), ColumnNameNode::leaf("age")],
        ),
        ColumnNameNode::leaf("score"),
    ]);

    assert_eq!(reader.leaf_count(), 3);
    assert_eq!(reader.path_of_leaf(0), Some(&[0, 0][..]));
    assert_eq!(reader.path_of_leaf(1), Some(&[0, 1][..]));
    assert_eq!(reader.path_of_leaf(2), Some(&[1][..]));
    assert!(reader.is_valid_path(&[0]));
    assert!(!reader.is_valid_path(&[2]));
}

fn orders() -> Arc<GridDataModel> {
    let items = |n: i64| {
        CellValue::Table(Arc::new(StaticNestedTable::with_inferred_types(
            vec!["sku".into(), "qty".into()],
            (0..n).map(|i| vec![format!("sku-{i}").into(), i.into()]).collect(),
        )))
    };
    Arc::new(GridDataModel::with_data(
        vec![GridColumn::new(0, "id"), GridColumn::new(1, "items")],
        (0..4)
            .map(|i| GridRow::new(i + 1, vec![(i as i64).into(), items(i as i64 + 1)]))
            .collect(),
    ))
}

#[test]
fn test_deleting_entered_row_returns_to_parent() {
    let top = orders();
    let engine = NestedTableEngine::new(top.clone());

    engine.enter(Coordinate::new(2, 1)).unwrap();
    assert_eq!(engine.depth(), 1);
    assert_eq!(engine.current_rows().len(), 3);

    top.delete_rows(&IndexSet::from_values([2])).unwrap();
    assert_eq!(engine.sync(), 1);

    assert!(engine.path().is_empty());
    assert!(engine.current_table().is_none());
    assert_eq!(engine.current_rows().len(), 3);
    assert_eq!(engine.current_columns()[1].name(), "items");
}

#[test]
fn test_nested_paging_follows_navigation() {
    let top = orders();
    let engine = Arc::new(NestedTableEngine::new(top.clone()));
    let pager = Arc::new(MultiPagePaging::new(2));
    pager.set_window(PageWindow {
        start: 3,
        end: 4,
        size: 2,
        total: 4,
        total_precise: true,
        total_updateable: false,
    });
    let paging = NestedPaging::new(pager, engine.clone());

    assert!(paging.is_last_page());
    assert_eq!(paging.find_row(3).value(), 0);

    engine.enter(Coordinate::new(3, 1)).unwrap();
    assert_eq!(paging.window(), PageWindow::single(4));
    assert!(paging.is_first_page());

    top.delete_rows(&IndexSet::from_values([3])).unwrap();
    assert_eq!(paging.window().start, 3);
    assert!(!engine.is_nested());
}

#[test]
fn test_background_parse_feeds_engine() {
    init_logging();
    let mut engine = csv_engine("a,b\n1,2", true);
    let service = ParseService::new(engine.format().clone());

    engine.buffer_mut().insert(7, "\n3,4\n5,6").unwrap();
    service.request_buffer(engine.buffer()).unwrap();
    assert!(service.wait_idle(Duration::from_secs(5)));

    let parsed = service.latest().unwrap();
    assert!(engine.apply_parsed(&parsed));
    assert!(engine.is_parsed());
    assert_eq!(engine.model().row_count(), 3);

    engine.buffer_mut().insert(0, "x").unwrap();
    assert!(!engine.apply_parsed(&parsed));
    service.shutdown();
}

#[test]
fn test_failed_batch_leaves_text_untouched() {
    init_logging();
    let mut engine = csv_engine("a,b\n1,2\n3,4", true);
    let before = engine.buffer().text();

    let err = engine
        .delete_rows(&IndexSet::from_values([0, 7]))
        .unwrap_err();
    assert!(matches!(err, GridError::InvalidIndex { index: 7, count: 2, .. }));
    assert_eq!(engine.buffer().text(), before);

    let err = engine
        .move_column(ModelColumn::new(0), ModelColumn::new(5))
        .unwrap_err();
    assert!(matches!(err, GridError::InvalidIndex { .. }));
    assert_eq!(engine.buffer().text(), before);
}

#[test]
fn test_model_signals_follow_edits() {
    let mut engine = csv_engine("a,b\n1,2", true);
    let model = engine.model();
    let resets = Arc::new(parking_lot::Mutex::new(0));
    let r = resets.clone();
    model.signals().model_reset.connect(move |_| *r.lock() += 1);

    engine.insert_rows(1).unwrap();
    engine
        .update_cells(&[CellUpdate::new(
            ModelRow::new(1),
            ModelColumn::new(0),
            9i64,
        )])
        .unwrap();

    assert_eq!(*resets.lock(), 2);
    assert_eq!(engine.buffer().text(), "a,b\n1,2\n9,");
    assert_eq!(
        model.value(ModelRow::new(1), ModelColumn::new(0)).unwrap(),
        CellValue::Integer(9)
    );
}
