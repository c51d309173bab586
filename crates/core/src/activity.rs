// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host activity (visible/awake vs hidden/asleep).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Reports whether the host is currently active.
///
/// Elapsed run time only accumulates while this returns true.
pub trait ActivitySource: Clone + Send + Sync + 'static {
    fn is_active(&self) -> bool;
}

/// Activity flag toggled explicitly by the host integration (or a test)
#[derive(Clone, Debug)]
pub struct ManualActivity {
    active: Arc<AtomicBool>,
}

impl Default for ManualActivity {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ManualActivity {
    pub fn new(active: bool) -> Self {
        Self {
            active: Arc::new(AtomicBool::new(active)),
        }
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }
}

impl ActivitySource for ManualActivity {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Host that is always considered active (headless CLI use)
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysActive;

impl ActivitySource for AlwaysActive {
    fn is_active(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
