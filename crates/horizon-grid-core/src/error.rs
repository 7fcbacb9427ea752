//! Error types for Horizon Grid core systems.

use thiserror::Error;

/// Errors produced by the core runtime pieces.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The worker has been stopped and no longer accepts tasks.
    #[error("worker '{name}' has been stopped")]
    WorkerStopped {
        /// Thread name of the worker.
        name: String,
    },

    /// The worker's task queue is full.
    #[error("worker '{name}' task queue is full (capacity {capacity})")]
    QueueFull {
        /// Thread name of the worker.
        name: String,
        /// Configured queue capacity.
        capacity: usize,
    },

    /// The operation was cancelled through its cancellation token.
    #[error("operation cancelled")]
    Cancelled,
}

impl CoreError {
    /// Create a worker-stopped error.
    pub fn worker_stopped(name: impl Into<String>) -> Self {
        Self::WorkerStopped { name: name.into() }
    }

    /// Create a queue-full error.
    pub fn queue_full(name: impl Into<String>, capacity: usize) -> Self {
        Self::QueueFull {
            name: name.into(),
            capacity,
        }
    }
}

/// A specialized Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
