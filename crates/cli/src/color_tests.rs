// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[yare::parameterized(
    completed   = { "completed",             "\x1b[32m" },
    with_stalls = { "completed with stalls", "\x1b[33m" },
    stopped     = { "stopped",               "\x1b[33m" },
    stalled     = { "stalled",               "\x1b[31m" },
)]
fn status_colors(text: &str, code: &str) {
    assert_eq!(apply_status(text), format!("{code}{text}\x1b[0m"));
}

#[test]
fn unknown_status_is_left_alone() {
    assert_eq!(apply_status("pending"), "pending");
}

#[test]
#[serial]
fn muted_produces_ansi_when_color_forced() {
    std::env::set_var("COLOR", "1");
    std::env::remove_var("NO_COLOR");

    let result = muted("dim");
    assert!(result.contains("\x1b[38;5;240m"));
    assert!(result.contains("\x1b[0m"));
    std::env::remove_var("COLOR");
}

#[test]
fn header_color_code() {
    assert_eq!(apply_header("DOCUMENT"), "\x1b[38;5;74mDOCUMENT\x1b[0m");
}

#[test]
#[serial]
fn no_color_wins_over_force() {
    std::env::set_var("COLOR", "1");
    std::env::set_var("NO_COLOR", "1");

    assert_eq!(muted("dim"), "dim");
    assert_eq!(status("stalled"), "stalled");
    std::env::remove_var("COLOR");
    std::env::remove_var("NO_COLOR");
}
