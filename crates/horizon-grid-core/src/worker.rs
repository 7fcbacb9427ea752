//! A dedicated background thread with its own task queue.
//!
//! Tasks run one after another in submission order, so at most one is in
//! flight at any time. Each task runs under a [`CancellationToken`]:
//!
//! - [`Worker::send`] uses the worker's own token, cancelled by
//!   [`Worker::stop`]
//! - [`Worker::send_with_token`] uses a caller-supplied token
//!
//! A task whose token is cancelled before it starts is skipped; a result whose
//! token was cancelled while the task ran is dropped. Everything else is
//! published through [`Worker::on_result`] on the worker thread.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use horizon_grid_core::{CancellationToken, WorkerBuilder};
//!
//! let worker = WorkerBuilder::new().name("record-counter").build::<usize>();
//! worker.on_result().connect(|count| println!("{count} records"));
//!
//! let stale = CancellationToken::new();
//! stale.cancel();
//! worker.send_with_token(stale, |_| 1).unwrap();
//!
//! worker.send(|token| (0..1000).take_while(|_| !token.is_cancelled()).count()).unwrap();
//! assert!(worker.wait_idle(Duration::from_secs(5)));
//! worker.stop_and_join();
//! ```

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use parking_lot::{Condvar, Mutex};

use crate::cancel::CancellationToken;
use crate::error::{CoreError, Result};
use crate::logging::targets;
use crate::signal::Signal;

const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Settings of a [`Worker`].
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Thread name, also used in errors.
    pub name: String,
    /// Tasks that may wait in the queue.
    pub queue_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name: "horizon-grid-worker".to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Builder for [`Worker`].
#[derive(Debug, Default)]
pub struct WorkerBuilder {
    config: WorkerConfig,
}

impl WorkerBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the thread name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the queue capacity (at least 1).
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity.max(1);
        self
    }

    /// Spawn the worker thread.
    pub fn build<T: Send + 'static>(self) -> Worker<T> {
        Worker::with_config(self.config)
    }
}

type TaskFn<T> = Box<dyn FnOnce(&CancellationToken) -> T + Send>;

struct Job<T> {
    /// `None` runs under the worker's own token.
    token: Option<CancellationToken>,
    run: TaskFn<T>,
}

impl<T> Job<T> {
    fn execute(self, shutdown: &CancellationToken) -> Option<T> {
        let token = self.token.as_ref().unwrap_or(shutdown);
        if token.is_cancelled() {
            tracing::trace!(target: targets::WORKER, "task cancelled before start");
            return None;
        }
        let result = (self.run)(token);
        if token.is_cancelled() {
            tracing::trace!(target: targets::WORKER, "result of cancelled task dropped");
            return None;
        }
        Some(result)
    }
}

/// State shared with the worker thread.
struct Shared {
    /// Jobs queued or running.
    pending: Mutex<usize>,
    idle: Condvar,
    shutdown: CancellationToken,
}

impl Shared {
    fn job_done(&self) {
        let mut pending = self.pending.lock();
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.idle.notify_all();
        }
    }
}

/// A dedicated worker thread producing results of type `T`.
pub struct Worker<T: Send + 'static> {
    name: String,
    capacity: usize,
    /// Dropped by [`stop`](Self::stop), which closes the queue.
    queue: Mutex<Option<Sender<Job<T>>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
    shared: Arc<Shared>,
    results: Arc<Signal<T>>,
}

impl<T: Send + 'static> Worker<T> {
    /// Spawn a worker with the default configuration.
    pub fn new() -> Self {
        Self::with_config(WorkerConfig::default())
    }

    /// Spawn a worker with `config`.
    pub fn with_config(config: WorkerConfig) -> Self {
        let capacity = config.queue_capacity.max(1);
        let (sender, receiver) = bounded(capacity);
        let shared = Arc::new(Shared {
            pending: Mutex::new(0),
            idle: Condvar::new(),
            shutdown: CancellationToken::new(),
        });
        let results = Arc::new(Signal::new());

        let thread = {
            let shared = shared.clone();
            let results = results.clone();
            thread::Builder::new()
                .name(config.name.clone())
                .spawn(move || run_queue(&receiver, &shared, &results))
                .expect("failed to spawn worker thread")
        };
        tracing::debug!(target: targets::WORKER, name = %config.name, capacity, "worker started");

        Self {
            name: config.name,
            capacity,
            queue: Mutex::new(Some(sender)),
            thread: Mutex::new(Some(thread)),
            shared,
            results,
        }
    }

    /// The thread name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` until [`stop`](Self::stop) is called.
    pub fn is_running(&self) -> bool {
        self.queue.lock().is_some()
    }

    /// Tasks queued or running.
    pub fn pending_tasks(&self) -> usize {
        *self.shared.pending.lock()
    }

    /// Emitted on the worker thread with every published result.
    pub fn on_result(&self) -> &Signal<T> {
        &self.results
    }

    /// Queue a task under the worker's own token.
    pub fn send<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce(&CancellationToken) -> T + Send + 'static,
    {
        self.submit(Job {
            token: None,
            run: Box::new(task),
        })
    }

    /// Queue a task governed by `token`.
    pub fn send_with_token<F>(&self, token: CancellationToken, task: F) -> Result<()>
    where
        F: FnOnce(&CancellationToken) -> T + Send + 'static,
    {
        self.submit(Job {
            token: Some(token),
            run: Box::new(task),
        })
    }

    fn submit(&self, job: Job<T>) -> Result<()> {
        let queue = self.queue.lock();
        let Some(sender) = queue.as_ref() else {
            return Err(CoreError::worker_stopped(&self.name));
        };

        *self.shared.pending.lock() += 1;
        match sender.try_send(job) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.shared.job_done();
                Err(match err {
                    TrySendError::Full(_) => CoreError::queue_full(&self.name, self.capacity),
                    TrySendError::Disconnected(_) => CoreError::worker_stopped(&self.name),
                })
            }
        }
    }

    /// Block until nothing is queued or running. Returns `false` if
    /// `timeout` elapsed first.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut pending = self.shared.pending.lock();
        while *pending > 0 {
            if self.shared.idle.wait_until(&mut pending, deadline).timed_out() {
                return *pending == 0;
            }
        }
        true
    }

    /// Stop accepting tasks and cancel the worker's own token. Tasks already
    /// queued under their own tokens still run.
    pub fn stop(&self) {
        self.shared.shutdown.cancel();
        if self.queue.lock().take().is_some() {
            tracing::debug!(target: targets::WORKER, name = %self.name, "worker stopping");
        }
    }

    /// Wait for the thread to exit. Returns `false` if it was already joined
    /// or panicked.
    pub fn join(&self) -> bool {
        match self.thread.lock().take() {
            Some(thread) => thread.join().is_ok(),
            None => false,
        }
    }

    /// [`stop`](Self::stop), then [`join`](Self::join).
    pub fn stop_and_join(&self) -> bool {
        self.stop();
        self.join()
    }
}

impl<T: Send + 'static> Default for Worker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Drop for Worker<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Runs jobs until the queue is closed and drained.
fn run_queue<T: Send + 'static>(jobs: &Receiver<Job<T>>, shared: &Shared, results: &Signal<T>) {
    for job in jobs.iter() {
        if let Some(result) = job.execute(&shared.shutdown) {
            results.emit(result);
        }
        shared.job_done();
    }
    tracing::debug!(target: targets::WORKER, "worker queue closed");
}
