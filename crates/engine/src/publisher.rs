// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Debounced, per-session state publisher.
//!
//! Progress updates are queued per session and applied together when the
//! debounce timer fires (or on an explicit flush). Critical transitions
//! bypass the window: pending updates are applied first, then the critical
//! action, so readers never observe actions out of order.
//!
//! A session's slot is released once `COMPLETE` is published. Subscribers
//! still read the completed state, then see the channel close.

use autorun_core::{reduce, BatchRunState, RunAction, SessionId};
use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

struct Slot {
    tx: watch::Sender<BatchRunState>,
    pending: Vec<RunAction>,
    timer: Option<JoinHandle<()>>,
}

impl Slot {
    fn new() -> Self {
        let (tx, _) = watch::channel(BatchRunState::default());
        Self {
            tx,
            pending: Vec::new(),
            timer: None,
        }
    }

    fn apply(&mut self, actions: Vec<RunAction>) {
        if actions.is_empty() {
            return;
        }
        self.tx.send_modify(|state| {
            for action in actions {
                *state = reduce(std::mem::take(state), action);
            }
        });
    }

    fn apply_pending(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        let pending = std::mem::take(&mut self.pending);
        self.apply(pending);
    }
}

struct Inner {
    window: Duration,
    sessions: Mutex<HashMap<SessionId, Slot>>,
}

impl Inner {
    fn fire(&self, session: &SessionId) {
        let mut sessions = self.sessions.lock();
        if let Some(slot) = sessions.get_mut(session) {
            slot.timer = None;
            let pending = std::mem::take(&mut slot.pending);
            tracing::trace!(session_id = %session, count = pending.len(), "debounce fired");
            slot.apply(pending);
        }
    }
}

/// Cloneable handle; all clones share the same sessions
#[derive(Clone)]
pub struct StatePublisher {
    inner: Arc<Inner>,
}

impl StatePublisher {
    pub fn new(window: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                window,
                sessions: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn window(&self) -> Duration {
        self.inner.window
    }

    /// Queue an action. Critical actions are applied immediately.
    ///
    /// Must be called from within a tokio runtime when the window is non-zero.
    pub fn dispatch(&self, session: &SessionId, action: RunAction) {
        if action.is_critical() || self.inner.window.is_zero() {
            self.dispatch_immediate(session, action);
            return;
        }
        let mut sessions = self.inner.sessions.lock();
        let Some(slot) = sessions.get_mut(session) else {
            // Progress on a session with no slot would reduce against idle
            return;
        };
        slot.pending.push(action);
        if slot.timer.is_none() {
            let inner = Arc::clone(&self.inner);
            let session = session.clone();
            let window = self.inner.window;
            slot.timer = Some(tokio::spawn(async move {
                tokio::time::sleep(window).await;
                inner.fire(&session);
            }));
        }
    }

    /// Apply pending updates, then `action`, without waiting
    pub fn dispatch_immediate(&self, session: &SessionId, action: RunAction) {
        tracing::debug!(session_id = %session, action = action.name(), "dispatch");
        let mut sessions = self.inner.sessions.lock();
        let complete = matches!(action, RunAction::Complete);
        let slot = match sessions.entry(session.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) if matches!(action, RunAction::Start(_)) => {
                entry.insert(Slot::new())
            }
            // Everything but START is a no-op against a fresh idle state
            Entry::Vacant(_) => return,
        };
        slot.apply_pending();
        slot.apply(vec![action]);
        if complete {
            sessions.remove(session);
            tracing::trace!(session_id = %session, "released publisher slot");
        }
    }

    /// Number of sessions holding a slot
    pub fn session_count(&self) -> usize {
        self.inner.sessions.lock().len()
    }

    /// Apply every pending update for `session` now
    pub fn flush(&self, session: &SessionId) {
        if let Some(slot) = self.inner.sessions.lock().get_mut(session) {
            slot.apply_pending();
        }
    }

    /// Latest published state (may lag pending updates by up to one window)
    pub fn snapshot(&self, session: &SessionId) -> BatchRunState {
        self.inner
            .sessions
            .lock()
            .get(session)
            .map(|slot| slot.tx.borrow().clone())
            .unwrap_or_default()
    }

    pub fn subscribe(&self, session: &SessionId) -> watch::Receiver<BatchRunState> {
        self.inner
            .sessions
            .lock()
            .entry(session.clone())
            .or_insert_with(Slot::new)
            .tx
            .subscribe()
    }

    pub fn has_pending(&self, session: &SessionId) -> bool {
        self.inner
            .sessions
            .lock()
            .get(session)
            .is_some_and(|slot| !slot.pending.is_empty())
    }
}

#[cfg(test)]
#[path = "publisher_tests.rs"]
mod tests;
