// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use autorun_core::DocumentRef;

fn args(loop_mode: bool, max_loops: Option<u32>) -> RunArgs {
    RunArgs {
        file: PathBuf::from("autorun.toml"),
        session: None,
        loop_mode,
        max_loops,
        on_error: OnError::Ask,
    }
}

fn base() -> RunConfig {
    RunConfig::new(vec![DocumentRef::new("Phase-1")], "Work on {{DOCUMENT_NAME}}")
}

#[yare::parameterized(
    completed   = { RunStatus::Completed,           0 },
    with_stalls = { RunStatus::CompletedWithStalls, 0 },
    stopped     = { RunStatus::Stopped,             2 },
    stalled     = { RunStatus::Stalled,             3 },
)]
fn exit_codes(status: RunStatus, code: i32) {
    assert_eq!(exit_code(status), code);
}

#[yare::parameterized(
    short_resume = { "r\n",      Some(ErrorResolution::Resume) },
    long_skip    = { " Skip ",   Some(ErrorResolution::SkipDocument) },
    abort        = { "abort",    Some(ErrorResolution::Abort) },
    unknown      = { "later",    None },
    empty        = { "\n",       None },
)]
fn resolutions(input: &str, expected: Option<ErrorResolution>) {
    assert_eq!(parse_resolution(input), expected);
}

#[test]
fn no_overrides_keep_the_file_settings() {
    let config = apply_overrides(base(), &args(false, None)).unwrap();
    assert!(!config.loop_enabled);
}

#[test]
fn loop_flag_enables_unbounded_loop() {
    let config = apply_overrides(base(), &args(true, None)).unwrap();
    assert!(config.loop_enabled);
    assert_eq!(config.max_loops, None);
}

#[test]
fn max_loops_implies_loop() {
    let config = apply_overrides(base(), &args(false, Some(3))).unwrap();
    assert!(config.loop_enabled);
    assert_eq!(config.max_loops, Some(3));
}

#[test]
fn zero_max_loops_is_rejected() {
    assert!(apply_overrides(base(), &args(false, Some(0))).is_err());
}
