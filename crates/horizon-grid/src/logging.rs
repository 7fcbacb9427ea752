//! Log targets for the grid data core.
//!
//! Span names and [`PerfSpan`](horizon_grid_core::PerfSpan) live in
//! `horizon_grid_core::logging`; this module adds the per-subsystem targets of
//! this crate so output can be filtered with e.g.
//! `RUST_LOG=horizon_grid::text=debug`.

/// Target names for log filtering.
pub mod targets {
    /// Flat tabular models.
    pub const MODEL: &str = "horizon_grid::model";
    /// Hierarchical column tree.
    pub const HIERARCHY: &str = "horizon_grid::hierarchy";
    /// Nested table navigation and caches.
    pub const NESTED: &str = "horizon_grid::nested";
    /// Paging.
    pub const PAGING: &str = "horizon_grid::paging";
    /// Text buffer parsing and edit batches.
    pub const TEXT: &str = "horizon_grid::text";
    /// Settings loading.
    pub const SETTINGS: &str = "horizon_grid::settings";
}
