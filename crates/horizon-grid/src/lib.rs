//! Data and indexing core for spreadsheet-like grids.
//!
//! This crate holds everything between a raw data producer and the widget
//! that draws the grid:
//!
//! - **Index spaces**: typed row and column handles in model or view space
//! - **Models**: the [`TabularModel`](model::TabularModel) read contract, the
//!   [`GridMutator`](model::GridMutator) edit contract and a flat in-memory model
//! - **Hierarchical columns**: nested schemas flattened into leaf columns
//! - **Nested tables**: drilling into table-valued cells along a navigation path
//! - **Paging**: page windows that switch when a nested table is shown
//! - **Text-backed tables**: structural edits translated into text edits
//! - **Settings**: TOML or JSON configuration of all of the above
//!
//! # Example
//!
//! ```
//! use horizon_grid::index::IndexSet;
//! use horizon_grid::model::{GridMutator, TabularModel};
//! use horizon_grid::text::{CsvFormat, RopeBuffer, TextBuffer, TextMutationEngine};
//!
//! let buffer = RopeBuffer::new("id,name\n1,ann\n2,bob\n3,cy\n");
//! let mut engine = TextMutationEngine::new(buffer, CsvFormat::new().with_header(true)).unwrap();
//!
//! engine.delete_rows(&IndexSet::from_values([2, 0])).unwrap();
//! assert_eq!(engine.buffer().text(), "id,name\n2,bob\n");
//! assert_eq!(engine.model().row_count(), 1);
//! ```
//!
//! # Logging
//!
//! Events are emitted through `tracing` under the targets in
//! [`logging::targets`]. No subscriber is installed by this crate.

pub mod error;
pub mod hierarchy;
pub mod index;
pub mod logging;
pub mod model;
pub mod nested;
pub mod paging;
pub mod settings;
pub mod text;
pub mod value;

pub use error::{GridError, Result};
pub use index::{Index, IndexSet, ModelColumn, ModelRow, ViewColumn, ViewRow};
pub use model::{GridColumn, GridDataModel, GridMutator, GridRow, TabularModel};
pub use settings::GridSettings;
pub use value::{CellValue, ColumnType};
