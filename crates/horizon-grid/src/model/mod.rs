//! Tabular models: the read and write contracts shared by every grid layer.
//!
//! # Core Types
//!
//! - [`GridColumn`] / [`GridRow`]: column metadata and row values
//! - [`TabularModel`]: read access by model index plus change signals
//! - [`GridMutator`]: structural and cell edits, in model-index terms
//! - [`ModelSignals`]: change notifications for views and wrapping models
//! - [`GridDataModel`]: the flat in-memory model fed by a data producer
//!
//! # Example
//!
//! ```
//! use horizon_grid::index::{ModelColumn, ModelRow};
//! use horizon_grid::model::{GridColumn, GridDataModel, GridRow, TabularModel};
//!
//! let model = GridDataModel::new();
//! model.set_columns(vec![GridColumn::new(0, "id"), GridColumn::new(1, "name")]);
//! model.add_rows(vec![GridRow::new(1, vec![1i64.into(), "ann".into()])]);
//! model.after_last_row_added();
//!
//! let name = model.value(ModelRow::new(0), ModelColumn::new(1)).unwrap();
//! assert_eq!(name.as_str(), Some("ann"));
//! ```
//!
//! Views query models by [`ModelRow`](crate::index::ModelRow) and
//! [`ModelColumn`](crate::index::ModelColumn); all view-order bookkeeping
//! stays in the display layer.

mod column;
mod data_model;
mod traits;

pub use column::{GridColumn, GridRow};
pub use data_model::GridDataModel;
pub use traits::{CellUpdate, GridMutator, ModelSignals, TabularModel};
