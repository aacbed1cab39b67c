//! Coalescing debouncer
//!
//! Turns a rapid stream of keyed requests into at most one dispatched task
//! per quiet period. Last write wins: rescheduling with a new key cancels
//! the pending timer, so intermediate values are never dispatched. A key
//! equal to the most recently dispatched one is suppressed outright.
//!
//! Cancelling only ever stops a timer. Once a task has been dispatched it
//! runs to completion on its own; callers discard stale results themselves.
//!
//! The debouncer knows nothing about what the task does. Scheduling spawns
//! onto the current Tokio runtime.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

/// What `schedule` did with a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// A new timer was started (any previous one was cancelled)
    Scheduled,
    /// A timer for the same key is already pending; it was left running
    Coalesced,
    /// The key matches the last dispatched key; nothing was scheduled
    Suppressed,
}

#[derive(Debug)]
struct Pending {
    key: String,
    timer: JoinHandle<()>,
}

#[derive(Debug, Default)]
struct DebounceState {
    pending: Option<Pending>,
    last_dispatched: Option<String>,
    /// Bumped on every schedule/cancel so a timer that already woke up can
    /// tell it has been superseded.
    generation: u64,
}

impl DebounceState {
    fn cancel_pending(&mut self) -> bool {
        self.generation += 1;
        match self.pending.take() {
            Some(pending) => {
                pending.timer.abort();
                true
            }
            None => false,
        }
    }
}

/// Keyed last-write-wins debouncer
#[derive(Debug, Default)]
pub struct Debouncer {
    state: Arc<Mutex<DebounceState>>,
}

fn lock(state: &Mutex<DebounceState>) -> MutexGuard<'_, DebounceState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task(key)` once `delay` passes without a schedule for another key
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule<F, Fut>(&self, key: impl Into<String>, delay: Duration, task: F) -> Schedule
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let key = key.into();
        let mut state = lock(&self.state);

        if state.last_dispatched.as_deref() == Some(key.as_str()) {
            // Back where the last lookup went; a pending timer elsewhere is moot.
            state.cancel_pending();
            trace!("Suppressed lookup for {}", key);
            return Schedule::Suppressed;
        }

        if state.pending.as_ref().is_some_and(|p| p.key == key) {
            return Schedule::Coalesced;
        }

        state.cancel_pending();
        let generation = state.generation;
        let shared = Arc::clone(&self.state);
        let dispatch_key = key.clone();

        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut state = lock(&shared);
                if state.generation != generation {
                    return;
                }
                state.pending = None;
                state.last_dispatched = Some(dispatch_key.clone());
            }
            trace!("Dispatching {}", dispatch_key);
            // Detached so cancelling the timer never aborts dispatched work
            tokio::spawn(task(dispatch_key));
        });

        state.pending = Some(Pending { key, timer });
        Schedule::Scheduled
    }

    /// Cancel the pending timer, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        lock(&self.state).cancel_pending()
    }

    /// Record `key` as dispatched outside the timer path, cancelling any timer
    pub fn mark_dispatched(&self, key: impl Into<String>) {
        let mut state = lock(&self.state);
        state.cancel_pending();
        state.last_dispatched = Some(key.into());
    }

    /// Forget `key` as dispatched so the same position can be looked up again
    ///
    /// No-op if a different key has been dispatched since.
    pub fn forget(&self, key: &str) {
        let mut state = lock(&self.state);
        if state.last_dispatched.as_deref() == Some(key) {
            state.last_dispatched = None;
        }
    }

    /// Key of the most recently dispatched task
    pub fn last_dispatched(&self) -> Option<String> {
        lock(&self.state).last_dispatched.clone()
    }

    /// Key of the pending timer, if one is running
    pub fn pending_key(&self) -> Option<String> {
        lock(&self.state).pending.as_ref().map(|p| p.key.clone())
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.state).pending.is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        lock(&self.state).cancel_pending();
    }
}
