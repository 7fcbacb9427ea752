//! Property tests for index conversion, leaf numbering and text edits.

use horizon_grid::hierarchy::{ColumnNameNode, HierarchicalReader};
use horizon_grid::index::{IndexSet, ModelColumn, ModelRow, to_model, to_view};
use horizon_grid::model::{CellUpdate, GridMutator, TabularModel};
use horizon_grid::text::{CsvFormat, Markup, RopeBuffer, TextBuffer, TextFormat, TextMutationEngine};
use horizon_grid::{CellValue, GridError};
use proptest::prelude::*;

fn column_tree() -> impl Strategy<Value = Vec<ColumnNameNode>> {
    let leaf = "[a-z]{1,4}".prop_map(|name: String| ColumnNameNode::leaf(name));
    let node = leaf.prop_recursive(3, 24, 4, |inner| {
        ("[a-z]{1,4}", prop::collection::vec(inner, 1..4))
            .prop_map(|(name, children)| ColumnNameNode::group(name, children))
    });
    prop::collection::vec(node, 1..5)
}

/// Rows of equal width. Fields may be empty, also in single-column
/// documents; the alphabet holds no numbers or booleans, so every value keeps
/// its text type.
fn document() -> impl Strategy<Value = Vec<Vec<String>>> {
    (1usize..5).prop_flat_map(|width| {
        prop::collection::vec(prop::collection::vec("[a-dxyz ,\"]{0,4}", width), 1..8)
    })
}

/// One line per row, each terminated.
fn render(format: &CsvFormat, rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| format!("{}\n", format.format_record(row).unwrap()))
        .collect()
}

/// Lines joined without a final terminator.
fn render_unterminated(format: &CsvFormat, rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| format.format_record(row).unwrap())
        .collect::<Vec<_>>()
        .join("\n")
}

proptest! {
    #[test]
    fn test_view_conversion_round_trips(
        permutation in (1usize..40).prop_flat_map(|n| Just((0..n as i64).collect::<Vec<_>>()).prop_shuffle()),
    ) {
        let mut inverse = vec![0i64; permutation.len()];
        for (model, &view) in permutation.iter().enumerate() {
            inverse[view as usize] = model as i64;
        }
        for row in 0..permutation.len() {
            let view = to_view(ModelRow::new(row), |i| permutation[i as usize]);
            prop_assert_eq!(to_model(view, |i| inverse[i as usize]), ModelRow::new(row));
        }
    }

    #[test]
    fn test_leaf_numbers_are_dense(roots in column_tree()) {
        let reader = HierarchicalReader::new(&roots);
        let tree = reader.tree();
        prop_assert_eq!(reader.leaf_count(), reader.leaves().len());
        for (i, &leaf) in reader.leaves().iter().enumerate() {
            prop_assert_eq!(tree.leaf_number(leaf), Some(i));
            prop_assert!(tree.is_leaf(leaf));
            prop_assert_eq!(reader.path_of_leaf(i), Some(tree.path(leaf)));
            prop_assert!(reader.is_valid_path(tree.path(leaf)));
        }
    }

    #[test]
    fn test_csv_values_survive_parsing(rows in document()) {
        let format = CsvFormat::new();
        let text = render(&format, &rows);
        let markup = Markup::parse(&text, &format, 200, None).unwrap();

        prop_assert_eq!(markup.row_count(), rows.len());
        for (record, expected) in markup.records().iter().zip(&rows) {
            let values: Vec<&str> = record.values.iter().map(|v| v.value.as_str()).collect();
            prop_assert_eq!(values, expected.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_markup_text_round_trips(rows in document(), terminated in any::<bool>()) {
        let format = CsvFormat::new();
        let text = if terminated {
            render(&format, &rows)
        } else {
            render_unterminated(&format, &rows)
        };
        let markup = Markup::parse(&text, &format, 200, None).unwrap();

        let written = markup.to_text(&format).unwrap();
        let reparsed = Markup::parse(&written, &format, 200, None).unwrap();
        prop_assert_eq!(reparsed.row_count(), markup.row_count());
        prop_assert_eq!(reparsed.rows(), markup.rows());
    }

    #[test]
    fn test_column_delete_keeps_row_count(
        rows in document(),
        column in any::<prop::sample::Index>(),
    ) {
        let format = CsvFormat::new();
        let text = render_unterminated(&format, &rows);
        let mut engine = TextMutationEngine::new(RopeBuffer::new(&text), format).unwrap();
        let width = engine.markup().column_count();
        prop_assume!(width > 1);
        let before = engine.model().row_count();

        engine.delete_columns(&IndexSet::from_values([column.index(width)])).unwrap();
        prop_assert_eq!(engine.model().row_count(), before);
        prop_assert_eq!(engine.markup().column_count(), width - 1);
    }

    #[test]
    fn test_cell_update_keeps_row_count(
        rows in document(),
        row in any::<prop::sample::Index>(),
        column in any::<prop::sample::Index>(),
        value in prop_oneof![Just(CellValue::Null), "[a-d]{0,2}".prop_map(CellValue::Text)],
    ) {
        let format = CsvFormat::new();
        let text = render_unterminated(&format, &rows);
        let mut engine = TextMutationEngine::new(RopeBuffer::new(&text), format).unwrap();
        let before = engine.model().row_count();
        prop_assume!(before > 0);
        let row = ModelRow::new(row.index(before));
        let column = ModelColumn::new(column.index(engine.markup().column_count()));

        engine.update_cells(&[CellUpdate::new(row, column, value)]).unwrap();
        prop_assert_eq!(engine.model().row_count(), before);
    }

    #[test]
    fn test_insert_then_delete_column_restores_text(rows in document()) {
        let format = CsvFormat::new();
        let text = render(&format, &rows);
        let width = rows[0].len();
        let mut engine = TextMutationEngine::new(RopeBuffer::new(&text), format).unwrap();

        engine.insert_column(None).unwrap();
        prop_assert_eq!(engine.markup().column_count(), width + 1);
        engine.delete_columns(&IndexSet::from_values([width])).unwrap();
        prop_assert_eq!(engine.buffer().text(), text);
    }

    #[test]
    fn test_deleting_absent_column_changes_nothing(rows in document()) {
        let format = CsvFormat::new();
        let text = render(&format, &rows);
        let last = rows[0].len() - 1;
        let mut engine = TextMutationEngine::new(RopeBuffer::new(&text), format).unwrap();

        if last == 0 {
            let result = engine.rename_column(ModelColumn::new(1), "x");
            prop_assert!(
                matches!(result, Err(GridError::InvalidIndex { .. })),
                "out-of-range rename must fail"
            );
            return Ok(());
        }
        engine.delete_columns(&IndexSet::from_values([last])).unwrap();
        let after_first = engine.buffer().text();

        let second = engine.delete_columns(&IndexSet::from_values([last]));
        prop_assert!(
            matches!(second, Err(GridError::InvalidIndex { .. })),
            "second delete must fail"
        );
        prop_assert_eq!(engine.buffer().text(), after_first);
    }
}
