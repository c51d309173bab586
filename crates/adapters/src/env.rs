// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::path::PathBuf;
use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Upper bound on a single agent invocation (default: 30 minutes).
pub fn agent_timeout() -> Duration {
    parse_duration_ms("AUTORUN_AGENT_TIMEOUT_MS").unwrap_or(Duration::from_secs(30 * 60))
}

/// Upper bound on a single git/gh call (default: 60s).
pub fn git_timeout() -> Duration {
    parse_duration_ms("AUTORUN_GIT_TIMEOUT_MS").unwrap_or(Duration::from_secs(60))
}

/// Directory for history and stats files.
///
/// `AUTORUN_STATE_DIR`, else `$XDG_STATE_HOME/autorun`, else `~/.local/state/autorun`.
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("AUTORUN_STATE_DIR") {
        return PathBuf::from(dir);
    }
    dirs::state_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("state")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("autorun")
}
