// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the engine crate.

use std::time::Duration;

/// Default coalescing window for published state updates
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

fn parse_ms(value: Option<String>) -> Option<Duration> {
    value
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// State publisher debounce window (`AUTORUN_DEBOUNCE_MS`, default 200ms).
pub fn debounce_window() -> Duration {
    parse_ms(std::env::var("AUTORUN_DEBOUNCE_MS").ok()).unwrap_or(DEFAULT_DEBOUNCE)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
