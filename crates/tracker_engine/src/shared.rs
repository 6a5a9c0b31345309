use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracker_core::{update, Effect, Msg, TrackerState};

/// Tracker state shared between the coordinator and its polling loops.
///
/// The lock is only held while `update` runs, never across an await point.
#[derive(Debug, Clone, Default)]
pub struct SharedTracker {
    inner: Arc<Mutex<TrackerState>>,
}

impl SharedTracker {
    pub fn new(state: TrackerState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn dispatch(&self, msg: Msg) -> Vec<Effect> {
        let mut guard = self.lock();
        let state = std::mem::take(&mut *guard);
        let (state, effects) = update(state, msg);
        *guard = state;
        effects
    }

    /// Runs `read` against the current state.
    pub fn with<R>(&self, read: impl FnOnce(&TrackerState) -> R) -> R {
        read(&self.lock())
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&self) -> bool {
        self.lock().consume_dirty()
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
