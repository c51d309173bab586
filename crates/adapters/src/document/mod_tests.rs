// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    plain       = { "Phase-1", true },
    nested      = { "sub/Phase-1", true },
    runs_copy   = { "Runs/Phase-1-20260101-000000-000-loop-1", true },
    empty       = { "", false },
    absolute    = { "/etc/passwd", false },
    parent      = { "../secret", false },
    inner_dots  = { "a/../b", false },
    double_sep  = { "a//b", false },
)]
fn name_validation(name: &str, ok: bool) {
    assert_eq!(validate_name(name).is_ok(), ok, "{name}");
}

#[test]
fn working_copy_stem_uses_last_segment() {
    assert_eq!(
        working_copy_stem("sub/Phase-1", "20260101-120000-123", 2),
        "Phase-1-20260101-120000-123-loop-2"
    );
}
