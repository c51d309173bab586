// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Visibility-gated elapsed time per session.
//!
//! Time only accrues while the host is active. Every activity transition
//! flushes the running stretch into each entry's accumulator, so a host
//! that sleeps mid-run does not inflate the reported duration.

use autorun_core::{Clock, SessionId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Entry {
    accumulated: Duration,
    /// Start of the current active stretch; `None` while the host is inactive
    active_since: Option<Instant>,
}

impl Entry {
    fn flush(&mut self, now: Instant) {
        if let Some(since) = self.active_since.take() {
            self.accumulated += now.saturating_duration_since(since);
        }
    }

    fn elapsed(&self, now: Instant) -> Duration {
        match self.active_since {
            Some(since) => self.accumulated + now.saturating_duration_since(since),
            None => self.accumulated,
        }
    }
}

struct TrackerState {
    host_active: bool,
    entries: HashMap<SessionId, Entry>,
}

/// Per-session accumulator of active elapsed time
pub struct TimeTracker<C: Clock> {
    clock: C,
    state: Mutex<TrackerState>,
}

impl<C: Clock> TimeTracker<C> {
    pub fn new(clock: C, host_active: bool) -> Self {
        Self {
            clock,
            state: Mutex::new(TrackerState {
                host_active,
                entries: HashMap::new(),
            }),
        }
    }

    /// Begin (or restart) tracking `session` from zero
    pub fn start_tracking(&self, session: &SessionId) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let active_since = state.host_active.then_some(now);
        state.entries.insert(
            session.clone(),
            Entry {
                accumulated: Duration::ZERO,
                active_since,
            },
        );
    }

    /// Stop tracking and return the final elapsed time
    pub fn stop_tracking(&self, session: &SessionId) -> Duration {
        let now = self.clock.now();
        self.state
            .lock()
            .entries
            .remove(session)
            .map(|e| e.elapsed(now))
            .unwrap_or_default()
    }

    /// Active elapsed time so far (zero for untracked sessions)
    pub fn get_elapsed_time(&self, session: &SessionId) -> Duration {
        let now = self.clock.now();
        self.state
            .lock()
            .entries
            .get(session)
            .map(|e| e.elapsed(now))
            .unwrap_or_default()
    }

    /// Record a host visibility transition for every tracked session.
    /// Returns false when `active` matches the current state.
    pub fn set_host_active(&self, active: bool) -> bool {
        let now = self.clock.now();
        let mut state = self.state.lock();
        if state.host_active == active {
            return false;
        }
        state.host_active = active;
        for entry in state.entries.values_mut() {
            entry.flush(now);
            if active {
                entry.active_since = Some(now);
            }
        }
        tracing::debug!(active, tracked = state.entries.len(), "host activity changed");
        true
    }

    pub fn epoch_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }

    pub fn is_host_active(&self) -> bool {
        self.state.lock().host_active
    }

    pub fn is_tracking(&self, session: &SessionId) -> bool {
        self.state.lock().entries.contains_key(session)
    }
}

#[cfg(test)]
#[path = "time_tracker_tests.rs"]
mod tests;
