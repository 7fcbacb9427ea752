//! Page windows over loaded rows.
//!
//! The data loader decides which slice of a result is loaded; the grid only
//! needs to know the bounds of that slice to translate absolute data row
//! numbers into model rows. [`NestedPaging`] switches between the top-level
//! pager and a "whole table is one page" window while a nested table is shown.

use std::sync::Arc;

use horizon_grid_core::Signal;
use parking_lot::RwLock;

use crate::index::ModelRow;
use crate::logging::targets;
use crate::model::TabularModel;
use crate::nested::NestedTableEngine;
use crate::settings::GridSettings;

/// Bounds of the loaded page. Row numbers are 1-based and `end` is inclusive,
/// so an empty page has `end == start - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Data row number of the first loaded row.
    pub start: usize,
    /// Data row number of the last loaded row.
    pub end: usize,
    /// Rows per page; 0 means unbounded.
    pub size: usize,
    /// Total rows of the result, as far as known.
    pub total: usize,
    /// Returns `true` if `total` is exact.
    pub total_precise: bool,
    /// Returns `true` if `total` may still grow.
    pub total_updateable: bool,
}

impl PageWindow {
    /// One unbounded page holding all `total` rows.
    pub const fn single(total: usize) -> Self {
        Self {
            start: 1,
            end: total,
            size: 0,
            total,
            total_precise: true,
            total_updateable: false,
        }
    }

    /// Number of rows in the window.
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    /// Returns `true` if the window holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `row_number` lies within the window.
    pub fn contains(&self, row_number: usize) -> bool {
        self.start <= row_number && row_number <= self.end
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::single(0)
    }
}

/// Translate an absolute data row number into a model row of `window`.
///
/// Returns a not-found index when the row is outside the window.
pub fn find_row(window: &PageWindow, row_number: usize) -> ModelRow {
    if window.contains(row_number) {
        ModelRow::new(row_number - window.start)
    } else {
        ModelRow::not_found()
    }
}

/// Page bookkeeping queried by the display layer.
pub trait PagingModel: Send + Sync {
    /// The current window.
    fn window(&self) -> PageWindow;

    /// Returns `true` if no rows precede the window.
    fn is_first_page(&self) -> bool {
        self.window().start <= 1
    }

    /// Returns `true` if no rows are known to follow the window.
    fn is_last_page(&self) -> bool {
        let window = self.window();
        window.end >= window.total && !window.total_updateable
    }

    /// Model row of the data row `row_number`, or not-found when it is not
    /// loaded.
    fn find_row(&self, row_number: usize) -> ModelRow {
        find_row(&self.window(), row_number)
    }
}

/// The whole result of a model is page 1.
pub struct SinglePagePaging {
    model: Arc<dyn TabularModel>,
}

impl SinglePagePaging {
    /// Page over every row of `model`.
    pub fn new(model: Arc<dyn TabularModel>) -> Self {
        Self { model }
    }
}

impl PagingModel for SinglePagePaging {
    fn window(&self) -> PageWindow {
        PageWindow::single(self.model.row_count())
    }
}

/// A window whose bounds and total are set by the data loader.
pub struct MultiPagePaging {
    window: RwLock<PageWindow>,
    window_changed: Signal<PageWindow>,
}

impl Default for MultiPagePaging {
    fn default() -> Self {
        Self::new(0)
    }
}

impl MultiPagePaging {
    /// Create an empty window with pages of `size` rows.
    pub fn new(size: usize) -> Self {
        Self {
            window: RwLock::new(PageWindow {
                start: 1,
                end: 0,
                size,
                total: 0,
                total_precise: false,
                total_updateable: true,
            }),
            window_changed: Signal::new(),
        }
    }

    /// Replace the window after a page has been loaded.
    pub fn set_window(&self, window: PageWindow) {
        {
            let mut current = self.window.write();
            if *current == window {
                return;
            }
            *current = window;
        }
        tracing::debug!(
            target: targets::PAGING,
            start = window.start,
            end = window.end,
            total = window.total,
            "page window changed"
        );
        self.window_changed.emit(window);
    }

    /// Update the known total, e.g. while rows are still being counted.
    pub fn set_total(&self, total: usize, precise: bool) {
        let mut window = *self.window.read();
        window.total = total;
        window.total_precise = precise;
        window.total_updateable = !precise;
        self.set_window(window);
    }

    /// Emitted with the new window whenever it changes.
    pub fn window_changed(&self) -> &Signal<PageWindow> {
        &self.window_changed
    }
}

impl PagingModel for MultiPagePaging {
    fn window(&self) -> PageWindow {
        *self.window.read()
    }
}

/// The top-level pager for `settings`: one page when `page_size` is 0,
/// otherwise a loader-driven window of that size.
pub fn top_level_paging(model: Arc<dyn TabularModel>, settings: &GridSettings) -> Arc<dyn PagingModel> {
    if settings.page_size == 0 {
        Arc::new(SinglePagePaging::new(model))
    } else {
        Arc::new(MultiPagePaging::new(settings.page_size))
    }
}

/// Paging that follows the level shown by a [`NestedTableEngine`].
///
/// At the top level, and inside growable nested tables, the top-level pager
/// answers. Inside a fixed nested table the whole table is one page. The
/// level is read from the engine on every query, so a path truncated by
/// revalidation is seen immediately.
pub struct NestedPaging {
    top: Arc<dyn PagingModel>,
    engine: Arc<NestedTableEngine>,
}

impl NestedPaging {
    /// Page `engine`'s current level, deferring to `top` outside fixed
    /// nested tables.
    pub fn new(top: Arc<dyn PagingModel>, engine: Arc<NestedTableEngine>) -> Self {
        Self { top, engine }
    }

    /// The top-level pager.
    pub fn top(&self) -> &Arc<dyn PagingModel> {
        &self.top
    }

    /// The engine whose level is paged.
    pub fn engine(&self) -> &Arc<NestedTableEngine> {
        &self.engine
    }
}

impl PagingModel for NestedPaging {
    fn window(&self) -> PageWindow {
        match self.engine.current_table() {
            Some(table) if !table.is_growable() => PageWindow::single(table.row_count()),
            _ => self.top.window(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexSet;
    use crate::model::{GridColumn, GridDataModel, GridRow};
    use crate::nested::{Coordinate, DynamicNestedTable, NestedTable, StaticNestedTable};
    use crate::value::CellValue;

    fn loaded(start: usize, end: usize, total: usize) -> Arc<MultiPagePaging> {
        let paging = Arc::new(MultiPagePaging::new(10));
        paging.set_window(PageWindow {
            start,
            end,
            size: 10,
            total,
            total_precise: true,
            total_updateable: false,
        });
        paging
    }

    #[test]
    fn test_find_row_within_window() {
        let paging = loaded(11, 20, 35);
        assert_eq!(paging.find_row(11), ModelRow::new(0));
        assert_eq!(paging.find_row(20), ModelRow::new(9));
        assert_eq!(paging.find_row(10).value(), -1);
        assert_eq!(paging.find_row(21).value(), -1);
        assert!(!paging.is_first_page());
        assert!(!paging.is_last_page());
    }

    #[test]
    fn test_top_level_paging_from_settings() {
        let model = Arc::new(GridDataModel::with_data(
            vec![GridColumn::new(0, "a")],
            vec![GridRow::new(1, vec![CellValue::Integer(1)])],
        ));
        let mut settings = GridSettings::default();
        assert_eq!(top_level_paging(model.clone(), &settings).window().len(), 1);

        settings.page_size = 50;
        let paging = top_level_paging(model, &settings);
        assert_eq!(paging.window().size, 50);
        assert!(paging.window().is_empty());
    }

    #[test]
    fn test_single_page_follows_model() {
        let model = Arc::new(GridDataModel::new());
        let paging = SinglePagePaging::new(model.clone());
        assert!(paging.window().is_empty());
        assert!(paging.find_row(1).value() < 0);

        model.add_rows(vec![GridRow::new(1, vec![]), GridRow::new(2, vec![])]);
        assert_eq!(paging.window().len(), 2);
        assert_eq!(paging.find_row(2), ModelRow::new(1));
        assert!(paging.is_first_page() && paging.is_last_page());
    }

    #[test]
    fn test_window_changed_signal() {
        let paging = MultiPagePaging::new(5);
        let count = Arc::new(parking_lot::Mutex::new(0));
        let c = count.clone();
        paging.window_changed().connect(move |_| *c.lock() += 1);
        paging.set_total(40, false);
        paging.set_total(40, false);
        assert_eq!(*count.lock(), 1);
        assert!(paging.window().total_updateable);
    }

    #[test]
    fn test_nested_fixed_table_is_one_page() {
        let table = StaticNestedTable::with_inferred_types(
            vec!["n".into()],
            (0..3).map(|i| vec![CellValue::Integer(i)]).collect(),
        );
        let model = Arc::new(GridDataModel::with_data(
            vec![GridColumn::new(0, "t")],
            vec![GridRow::new(1, vec![CellValue::Table(Arc::new(table))])],
        ));
        let engine = Arc::new(NestedTableEngine::new(model));
        let paging = NestedPaging::new(loaded(1, 10, 100), engine.clone());
        assert_eq!(paging.window().total, 100);

        engine.enter(Coordinate::new(0, 0)).unwrap();
        assert_eq!(paging.window(), PageWindow::single(3));
        assert!(paging.is_last_page());

        engine.exit_to_top();
        assert_eq!(paging.window().total, 100);
    }

    #[test]
    fn test_nested_window_follows_truncated_path() {
        let table = StaticNestedTable::with_inferred_types(
            vec!["n".into()],
            (0..4).map(|i| vec![CellValue::Integer(i)]).collect(),
        );
        let model = Arc::new(GridDataModel::with_data(
            vec![GridColumn::new(0, "t")],
            vec![GridRow::new(1, vec![CellValue::Table(Arc::new(table))])],
        ));
        let engine = Arc::new(NestedTableEngine::new(model.clone()));
        let paging = NestedPaging::new(loaded(1, 10, 100), engine.clone());

        engine.enter(Coordinate::new(0, 0)).unwrap();
        assert_eq!(paging.window(), PageWindow::single(4));

        model.delete_rows(&IndexSet::from_values([0])).unwrap();
        assert_eq!(paging.window().total, 100);
        assert!(!engine.is_nested());
    }

    #[test]
    fn test_nested_growable_table_defers_to_top() {
        let dynamic: Arc<dyn NestedTable> = Arc::new(DynamicNestedTable::new(vec!["n".into()]));
        let model = Arc::new(GridDataModel::with_data(
            vec![GridColumn::new(0, "t")],
            vec![GridRow::new(1, vec![CellValue::Table(dynamic)])],
        ));
        let engine = Arc::new(NestedTableEngine::new(model));
        engine.enter(Coordinate::new(0, 0)).unwrap();

        let paging = NestedPaging::new(loaded(21, 30, 50), engine);
        assert_eq!(paging.window().start, 21);
        assert_eq!(paging.find_row(25), ModelRow::new(4));
    }
}
