//! Error types for the grid data core.

use std::path::PathBuf;

use horizon_grid_core::CoreError;

use crate::index::AxisKind;

/// Result type alias for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors that can occur while reading or mutating grid data.
///
/// Cross-space index comparisons are not represented here: they are rejected
/// at compile time by the typed indices and asserted on by
/// [`AnyIndex`](crate::index::AnyIndex).
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// An out-of-range row or column index.
    #[error("invalid {axis} index {index} (count {count})")]
    InvalidIndex {
        axis: AxisKind,
        index: i64,
        count: usize,
    },

    /// A hierarchical column path that cannot be resolved against a row.
    #[error("cannot resolve column path {path:?} in row {row}: {reason}")]
    HierarchicalPath {
        row: usize,
        path: Vec<usize>,
        reason: String,
    },

    /// Entering a cell that does not hold a nested table.
    #[error("cannot enter nested table at ({row}, {column}): {reason}")]
    NestedTableNavigation {
        row: usize,
        column: usize,
        reason: String,
    },

    /// A batch of text edits failed part way.
    #[error("text edit failed: {message}")]
    TextEdit {
        message: String,
        #[source]
        source: Option<Box<GridError>>,
    },

    /// A mutating operation against a read-only buffer.
    #[error("buffer is read-only")]
    ReadOnly,

    /// The text could not be split into records.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A backend does not support the requested operation.
    #[error("operation '{operation}' is not supported by this table")]
    Unsupported { operation: &'static str },

    /// Invalid or unreadable configuration.
    #[error("invalid settings: {message}")]
    Settings { message: String },

    /// Settings file I/O error.
    #[error("failed to access settings file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The operation was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// Error from the core runtime.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl GridError {
    /// Create an invalid row index error.
    pub fn invalid_row(index: i64, count: usize) -> Self {
        Self::InvalidIndex {
            axis: AxisKind::Row,
            index,
            count,
        }
    }

    /// Create an invalid column index error.
    pub fn invalid_column(index: i64, count: usize) -> Self {
        Self::InvalidIndex {
            axis: AxisKind::Column,
            index,
            count,
        }
    }

    /// Create a hierarchical path error.
    pub fn hierarchical_path(row: usize, path: &[usize], reason: impl Into<String>) -> Self {
        Self::HierarchicalPath {
            row,
            path: path.to_vec(),
            reason: reason.into(),
        }
    }

    /// Create a nested table navigation error.
    pub fn navigation(row: usize, column: usize, reason: impl Into<String>) -> Self {
        Self::NestedTableNavigation {
            row,
            column,
            reason: reason.into(),
        }
    }

    /// Create a text edit error.
    pub fn text_edit(message: impl Into<String>) -> Self {
        Self::TextEdit {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a failure that interrupted an edit batch.
    pub fn edit_failed(source: GridError) -> Self {
        match source {
            Self::ReadOnly | Self::TextEdit { .. } => source,
            other => Self::TextEdit {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }

    /// Create a parse error.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create a settings error.
    pub fn settings(message: impl Into<String>) -> Self {
        Self::Settings {
            message: message.into(),
        }
    }

    /// Create a settings I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
