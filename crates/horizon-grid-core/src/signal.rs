//! Change notification between models and their observers.
//!
//! A model owns one [`Signal`] per kind of change (rows inserted, columns
//! removed, reset, ...). Views, wrapping models and engines connect closures
//! to the signals they care about and disconnect them with the returned
//! [`ConnectionId`] when they go away.
//!
//! Slots run synchronously on the emitting thread, oldest connection first.
//! The slot list is copied out of the lock before any slot runs, so a slot may
//! connect to or disconnect from the signal that is calling it; the change is
//! seen by the next emission.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use horizon_grid_core::Signal;
//!
//! // (first row, last row) of an inserted block
//! let rows_inserted = Signal::<(usize, usize)>::new();
//! let total = Arc::new(AtomicUsize::new(0));
//!
//! let t = total.clone();
//! let id = rows_inserted.connect(move |&(first, last)| {
//!     t.fetch_add(last - first + 1, Ordering::Relaxed);
//! });
//!
//! rows_inserted.emit((0, 9));
//! rows_inserted.disconnect(id);
//! rows_inserted.emit((10, 19));
//!
//! assert_eq!(total.load(Ordering::Relaxed), 10);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Handle of one connected slot, valid until it is disconnected.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A list of slots invoked with `&Args` on every emission.
///
/// Use `()` for signals without payload and a tuple for several values.
pub struct Signal<Args> {
    slots: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    blocked: AtomicBool,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.slots.lock().len())
            .field("blocked", &self.blocked.load(Ordering::Relaxed))
            .finish()
    }
}

impl<Args: 'static> Signal<Args> {
    /// A signal with nothing connected.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect `slot`, returning the id to disconnect it with.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.slots.lock().insert(Arc::new(slot))
    }

    /// Disconnect the slot `id`. Returns `false` if it was not connected.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.slots.lock().remove(id).is_some()
    }

    /// Number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.slots.lock().len()
    }

    /// Suppress or resume emissions. A blocked signal drops its payloads.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::Release);
    }

    /// Returns `true` while emissions are suppressed.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::Acquire)
    }

    /// Call every slot with `args`. Returns how many slots ran.
    pub fn emit(&self, args: Args) -> usize {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "emission dropped: signal blocked");
            return 0;
        }

        let snapshot: Vec<Slot<Args>> = self.slots.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, slots = snapshot.len(), "emit");
        snapshot.iter().for_each(|slot| slot(&args));
        snapshot.len()
    }
}
