//! Text-backed tables.
//!
//! A delimiter-separated document lives in a [`TextBuffer`]. A [`TextFormat`]
//! splits it into [`Record`]s that remember where every value sits, and
//! [`Markup`] turns those into grid columns and rows.
//!
//! Grid edits never touch the parsed rows directly. [`TextMutationEngine`]
//! translates each [`GridMutator`](crate::model::GridMutator) operation into
//! text edits, applies them through one [`UpdateSession`] in ascending offset
//! order, and parses the buffer again. While a batch runs, the
//! [`ReparseController`] holds back re-parse requests so the batch triggers at
//! most one. Large documents can be parsed off-thread with [`ParseService`].
//!
//! # Example
//!
//! ```
//! use horizon_grid::index::ModelColumn;
//! use horizon_grid::model::GridMutator;
//! use horizon_grid::text::{CsvFormat, RopeBuffer, TextBuffer, TextMutationEngine};
//!
//! let buffer = RopeBuffer::new("a,b,c\nx,y,z");
//! let mut engine = TextMutationEngine::new(buffer, CsvFormat::new().with_header(true)).unwrap();
//!
//! engine.move_column(ModelColumn::new(0), ModelColumn::new(2)).unwrap();
//! assert_eq!(engine.buffer().text(), "b,c,a\ny,z,x");
//! ```

mod buffer;
mod engine;
mod format;
mod markup;
mod parse_service;
mod reparse;
mod session;

pub use buffer::{RopeBuffer, TextBuffer};
pub use engine::TextMutationEngine;
pub use format::{CsvFormat, Record, TextFormat, ValueRange, detect_separator, next_row_id};
pub use markup::Markup;
pub use parse_service::{ParseService, ParsedMarkup};
pub use reparse::{MuteGuard, ReparseController};
pub use session::UpdateSession;
