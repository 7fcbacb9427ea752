//! Table-valued cells.
//!
//! A cell may hold a whole table ([`NestedTable`]). The grid drills into such
//! cells like a breadcrumb trail: [`NestedTableEngine`] keeps the
//! [`NavigationPath`] of entered [`Coordinate`]s, serves rows and columns of
//! the innermost table from a [`BoundedCache`], and re-resolves the path after
//! the top-level model changes.
//!
//! Two backends are provided: [`StaticNestedTable`] with fixed columns and
//! types, and the growable [`DynamicNestedTable`].

mod cache;
mod engine;
mod path;
mod table;

pub use cache::BoundedCache;
pub use engine::{DEFAULT_CACHE_CAPACITY, NestedTableColumn, NestedTableEngine};
pub use path::{Coordinate, NavigationPath};
pub use table::{DynamicNestedTable, NestedTable, StaticNestedTable};
