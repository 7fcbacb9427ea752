//! Background parsing on a dedicated worker thread.

use std::sync::Arc;
use std::time::Duration;

use horizon_grid_core::{CancellationToken, PerfSpan, Signal, Worker, WorkerBuilder};
use parking_lot::Mutex;

use crate::error::{GridError, Result};
use crate::logging::targets;
use crate::value::DEFAULT_TYPE_SAMPLE_SIZE;

use super::buffer::TextBuffer;
use super::format::TextFormat;
use super::markup::Markup;

/// A markup together with the buffer revision it was parsed from.
#[derive(Debug, Clone)]
pub struct ParsedMarkup {
    /// Value of [`TextBuffer::modification_count`] when the text was taken.
    pub revision: u64,
    /// The parse result.
    pub markup: Arc<Markup>,
}

/// Parses buffer snapshots off the calling thread.
///
/// At most one parse runs at a time. A new request cancels the one before it;
/// a cancelled parse never publishes its result.
pub struct ParseService<F: TextFormat + Clone + 'static> {
    worker: Worker<Result<ParsedMarkup>>,
    format: F,
    sample_size: usize,
    pending: Mutex<Option<CancellationToken>>,
    latest: Arc<Mutex<Option<ParsedMarkup>>>,
}

impl<F: TextFormat + Clone + 'static> ParseService<F> {
    /// Start a service parsing with `format`.
    pub fn new(format: F) -> Self {
        Self::with_sample_size(format, DEFAULT_TYPE_SAMPLE_SIZE)
    }

    /// Start a service inferring column types from up to `sample_size` values.
    pub fn with_sample_size(format: F, sample_size: usize) -> Self {
        let worker = WorkerBuilder::new()
            .name("horizon-grid-parse")
            .queue_capacity(16)
            .build::<Result<ParsedMarkup>>();

        let latest: Arc<Mutex<Option<ParsedMarkup>>> = Arc::new(Mutex::new(None));
        let store = latest.clone();
        worker.on_result().connect(move |result| match result {
            Ok(parsed) => {
                let mut latest = store.lock();
                if latest.as_ref().is_none_or(|l| l.revision <= parsed.revision) {
                    *latest = Some(parsed.clone());
                }
            }
            Err(GridError::Cancelled) => {}
            Err(err) => {
                tracing::warn!(target: targets::TEXT, error = %err, "background parse failed");
            }
        });

        Self {
            worker,
            format,
            sample_size,
            pending: Mutex::new(None),
            latest,
        }
    }

    /// The format used for new requests.
    pub fn format(&self) -> &F {
        &self.format
    }

    /// Replace the format used for new requests.
    pub fn set_format(&mut self, format: F) {
        self.format = format;
    }

    /// Emitted on the worker thread for every parse that ran to completion.
    pub fn parsed(&self) -> &Signal<Result<ParsedMarkup>> {
        self.worker.on_result()
    }

    /// Queue a parse of `text`, cancelling any parse still pending.
    pub fn request(&self, text: String, revision: u64) -> Result<()> {
        let token = CancellationToken::new();
        if let Some(previous) = self.pending.lock().replace(token.clone()) {
            if previous.cancel() {
                tracing::debug!(target: targets::TEXT, revision, "superseded parse cancelled");
            }
        }

        let format = self.format.clone();
        let sample_size = self.sample_size;
        self.worker.send_with_token(token, move |token| {
            let _perf = PerfSpan::new("background_parse");
            Markup::parse(&text, &format, sample_size, Some(token)).map(|markup| ParsedMarkup {
                revision,
                markup: Arc::new(markup),
            })
        })?;
        Ok(())
    }

    /// Queue a parse of the current contents of `buffer`.
    pub fn request_buffer<B: TextBuffer + ?Sized>(&self, buffer: &B) -> Result<()> {
        self.request(buffer.text(), buffer.modification_count())
    }

    /// The newest result published so far.
    pub fn latest(&self) -> Option<ParsedMarkup> {
        self.latest.lock().clone()
    }

    /// Block until no parse is queued or running. Returns `false` on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.worker.wait_idle(timeout)
    }

    /// Cancel the pending parse and stop the worker thread.
    pub fn shutdown(&self) {
        if let Some(token) = self.pending.lock().take() {
            token.cancel();
        }
        self.worker.stop_and_join();
    }
}

impl<F: TextFormat + Clone + 'static> std::fmt::Debug for ParseService<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseService")
            .field("worker", &self.worker.name())
            .field("pending_tasks", &self.worker.pending_tasks())
            .finish_non_exhaustive()
    }
}
