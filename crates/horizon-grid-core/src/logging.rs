//! Logging facilities for Horizon Grid.
//!
//! Horizon Grid uses the `tracing` crate for instrumentation. Library crates
//! never install a subscriber; to see logs, install one in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_grid=debug,horizon_grid_core=info")
//!     .init();
//! ```
//!
//! All events are emitted with one of the explicit [`targets`], so output can
//! be filtered per subsystem.

/// Span names used throughout Horizon Grid for tracing.
pub mod span_names {
    /// Parsing a text buffer into a markup.
    pub const PARSE: &str = "horizon_grid::parse";
    /// Applying one batch of text edits.
    pub const EDIT_BATCH: &str = "horizon_grid::edit_batch";
    /// Re-validating a nested table navigation path.
    pub const REVALIDATE: &str = "horizon_grid::revalidate";
    /// Rebuilding hierarchical column caches.
    pub const HIERARCHY: &str = "horizon_grid::hierarchy";
}

/// Target names for log filtering.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_grid_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_grid_core::signal";
    /// Background worker target.
    pub const WORKER: &str = "horizon_grid_core::worker";
    /// Performance spans.
    pub const PERF: &str = "horizon_grid::perf";
}

/// A performance tracing span.
///
/// Creates an `info` span on the `horizon_grid::perf` target that is active
/// until the guard is dropped. Wrap parse runs and edit batches in one so an
/// external profiler can attribute time to them.
///
/// # Example
///
/// ```
/// use horizon_grid_core::PerfSpan;
///
/// {
///     let _span = PerfSpan::new("parse");
///     // ... work ...
/// }
/// ```
#[must_use = "the span ends as soon as the guard is dropped"]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_grid::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}

/// Trace-level event on the core target.
#[macro_export]
macro_rules! grid_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "horizon_grid_core", $($arg)*)
    };
}

/// Debug-level event on the core target.
#[macro_export]
macro_rules! grid_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "horizon_grid_core", $($arg)*)
    };
}

/// Info-level event on the core target.
#[macro_export]
macro_rules! grid_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "horizon_grid_core", $($arg)*)
    };
}

/// Warn-level event on the core target.
#[macro_export]
macro_rules! grid_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "horizon_grid_core", $($arg)*)
    };
}

/// Error-level event on the core target.
#[macro_export]
macro_rules! grid_error {
    ($($arg:tt)*) => {
        tracing::error!(target: "horizon_grid_core", $($arg)*)
    };
}
