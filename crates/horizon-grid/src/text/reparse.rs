//! Coalescing of re-parse requests around edit batches.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use horizon_grid_core::Signal;

use crate::logging::targets;

/// Turns buffer changes into re-parse requests.
///
/// Outside an edit batch every change requests a re-parse. While muted,
/// changes are only remembered; when the last [`MuteGuard`] is dropped,
/// exactly one request is emitted if anything changed in between.
#[derive(Debug, Default)]
pub struct ReparseController {
    muted: AtomicUsize,
    dirty: AtomicBool,
    reparse_requested: Signal<()>,
}

impl ReparseController {
    /// Create an unmuted controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emitted when the buffer should be parsed again.
    pub fn reparse_requested(&self) -> &Signal<()> {
        &self.reparse_requested
    }

    /// Returns `true` while at least one guard is alive.
    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Acquire) > 0
    }

    /// Report a buffer change.
    pub fn notify_changed(&self) {
        if self.is_muted() {
            self.dirty.store(true, Ordering::Release);
        } else {
            self.reparse_requested.emit(());
        }
    }

    /// Suppress requests until the returned guard is dropped.
    pub fn mute(&self) -> MuteGuard<'_> {
        self.muted.fetch_add(1, Ordering::AcqRel);
        MuteGuard {
            controller: self,
            active: true,
        }
    }

    /// Leave a muted window. Returns whether changes were pending and, if
    /// `emit` is set, requests the re-parse for them.
    fn unmute(&self, emit: bool) -> bool {
        if self.muted.fetch_sub(1, Ordering::AcqRel) != 1 {
            return false;
        }
        let changed = self.dirty.swap(false, Ordering::AcqRel);
        if changed && emit {
            tracing::trace!(target: targets::TEXT, "re-parse requested after muted window");
            self.reparse_requested.emit(());
        }
        changed
    }
}

/// Keeps a [`ReparseController`] muted while alive.
#[must_use = "the controller is unmuted as soon as the guard is dropped"]
pub struct MuteGuard<'a> {
    controller: &'a ReparseController,
    active: bool,
}

impl MuteGuard<'_> {
    /// Unmute without emitting a request, returning whether the buffer
    /// changed. For callers that re-parse themselves.
    pub fn take_changed(mut self) -> bool {
        self.active = false;
        self.controller.unmute(false)
    }
}

impl Drop for MuteGuard<'_> {
    fn drop(&mut self) {
        if self.active {
            self.controller.unmute(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn counting(controller: &ReparseController) -> Arc<Mutex<usize>> {
        let count = Arc::new(Mutex::new(0));
        let c = count.clone();
        controller.reparse_requested().connect(move |_| *c.lock() += 1);
        count
    }

    #[test]
    fn test_unmuted_changes_request_immediately() {
        let controller = ReparseController::new();
        let count = counting(&controller);
        controller.notify_changed();
        controller.notify_changed();
        assert_eq!(*count.lock(), 2);
    }

    #[test]
    fn test_muted_window_requests_once() {
        let controller = ReparseController::new();
        let count = counting(&controller);
        {
            let _outer = controller.mute();
            {
                let _inner = controller.mute();
                controller.notify_changed();
            }
            controller.notify_changed();
            assert_eq!(*count.lock(), 0);
        }
        assert_eq!(*count.lock(), 1);
        assert!(!controller.is_muted());
    }

    #[test]
    fn test_quiet_window_requests_nothing() {
        let controller = ReparseController::new();
        let count = counting(&controller);
        drop(controller.mute());
        assert_eq!(*count.lock(), 0);
    }

    #[test]
    fn test_take_changed() {
        let controller = ReparseController::new();
        let count = counting(&controller);
        let guard = controller.mute();
        controller.notify_changed();
        assert!(guard.take_changed());
        assert_eq!(*count.lock(), 0);
        assert!(!controller.is_muted());
    }
}
