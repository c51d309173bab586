// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so elapsed-time accounting is testable.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Source of monotonic and wall-clock time
pub trait Clock: Clone + Send + Sync + 'static {
    /// Monotonic instant, used for durations
    fn now(&self) -> Instant;

    /// Wall-clock milliseconds since the Unix epoch, used for records
    fn epoch_ms(&self) -> u64;
}

/// Real system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Manually advanced clock for tests
///
/// Clones share the same underlying time, so a test can hold one handle and
/// advance it while the code under test reads another.
#[derive(Clone, Debug)]
pub struct FakeClock {
    inner: Arc<Mutex<FakeClockState>>,
}

#[derive(Debug)]
struct FakeClockState {
    instant: Instant,
    epoch_ms: u64,
}

/// Epoch used by fresh fake clocks (2026-01-01T00:00:00Z)
const FAKE_EPOCH_MS: u64 = 1_767_225_600_000;

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeClockState {
                instant: Instant::now(),
                epoch_ms: FAKE_EPOCH_MS,
            })),
        }
    }

    /// Move both the monotonic and wall clock forward
    pub fn advance(&self, by: Duration) {
        let mut inner = self.inner.lock();
        inner.instant += by;
        inner.epoch_ms += by.as_millis() as u64;
    }

    /// Pin the wall clock to a specific epoch
    pub fn set_epoch_ms(&self, epoch_ms: u64) {
        self.inner.lock().epoch_ms = epoch_ms;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.inner.lock().instant
    }

    fn epoch_ms(&self) -> u64 {
        self.inner.lock().epoch_ms
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
