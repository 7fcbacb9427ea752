//! Core systems for Horizon Grid.
//!
//! This crate provides the grid-agnostic runtime pieces that the data core is
//! built on:
//!
//! - **Signal/Slot System**: Type-safe change notification between models and views
//! - **Cancellation**: Cooperative cancellation tokens for background tasks
//! - **Worker**: A dedicated background thread with its own task queue
//! - **Logging**: `tracing` targets, span names and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_grid_core::Signal;
//!
//! // Create a signal that notifies when rows are added
//! let rows_added = Signal::<(usize, usize)>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = rows_added.connect(|(first, last)| {
//!     println!("Rows {first}..={last} added");
//! });
//!
//! // Emit the signal
//! rows_added.emit((0, 9));
//!
//! // Disconnect when done
//! rows_added.disconnect(conn_id);
//! ```
//!
//! # Worker Example
//!
//! ```no_run
//! use horizon_grid_core::Worker;
//!
//! let worker = Worker::<usize>::new();
//! worker.on_result().connect(|len| println!("parsed {len} records"));
//! worker.send(|_token| 42).unwrap();
//! worker.stop_and_join();
//! ```

pub mod cancel;
mod error;
pub mod logging;
pub mod signal;
pub mod worker;

pub use cancel::CancellationToken;
pub use error::{CoreError, Result};
pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
pub use worker::{Worker, WorkerBuilder, WorkerConfig};
