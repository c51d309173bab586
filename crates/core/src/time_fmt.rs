// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable durations for summaries and CLI output.

/// Format milliseconds as `"850ms"`, `"42s"`, `"1m 5s"`, `"2h 3m"`.
///
/// Zero-valued trailing units are dropped (`"2m"` not `"2m 0s"`).
pub fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        return format!("{}ms", ms);
    }
    let secs = ms / 1000;
    if secs < 60 {
        return format!("{}s", secs);
    }
    if secs < 3600 {
        let (m, s) = (secs / 60, secs % 60);
        return if s > 0 {
            format!("{}m {}s", m, s)
        } else {
            format!("{}m", m)
        };
    }
    let (h, m) = (secs / 3600, (secs % 3600) / 60);
    if m > 0 {
        format!("{}h {}m", h, m)
    } else {
        format!("{}h", h)
    }
}

/// Compact form for progress lines: `"5s"`, `"2m"`, `"1h30m"`.
pub fn format_elapsed_ms(ms: u64) -> String {
    let secs = ms / 1000;
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else {
        let h = secs / 3600;
        let m = (secs % 3600) / 60;
        if m > 0 {
            format!("{}h{}m", h, m)
        } else {
            format!("{}h", h)
        }
    }
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
