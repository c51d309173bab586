// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn two_misses_stall() {
    let mut d = StallDetector::new();
    assert!(!d.record("a", false, 0));
    assert!(!d.is_stalled("a"));
    assert!(d.record("a", false, 0));
    assert!(d.is_stalled("a"));
    assert_eq!(d.stalled_count(), 1);
}

#[yare::parameterized(
    changed   = { true, 0 },
    completed = { false, 1 },
    both      = { true, 2 },
)]
fn progress_resets_counter(changed: bool, completed: u32) {
    let mut d = StallDetector::new();
    d.record("a", false, 0);
    assert_eq!(d.consecutive_misses("a"), 1);
    assert!(!d.record("a", changed, completed));
    assert_eq!(d.consecutive_misses("a"), 0);
    assert!(!d.record("a", false, 0));
    assert!(!d.is_stalled("a"));
}

#[test]
fn documents_are_tracked_separately() {
    let mut d = StallDetector::new();
    d.record("a", false, 0);
    d.record("b", false, 0);
    assert!(d.record("a", false, 0));
    assert!(!d.is_stalled("b"));
}

#[test]
fn stalled_document_reports_once() {
    let mut d = StallDetector::new();
    d.record("a", false, 0);
    assert!(d.record("a", false, 0));
    assert!(!d.record("a", false, 0));
    assert!(d.is_stalled("a"));
}

#[test]
fn zero_threshold_is_treated_as_one() {
    let mut d = StallDetector::with_threshold(0);
    assert_eq!(d.threshold(), 1);
    assert!(d.record("a", false, 0));
}
