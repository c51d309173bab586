// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_advances_both_clocks() {
    let clock = FakeClock::new();
    let start = clock.now();
    let start_ms = clock.epoch_ms();

    clock.advance(Duration::from_millis(1500));

    assert_eq!(clock.now() - start, Duration::from_millis(1500));
    assert_eq!(clock.epoch_ms() - start_ms, 1500);
}

#[test]
fn fake_clock_clones_share_time() {
    let clock = FakeClock::new();
    let other = clock.clone();
    clock.advance(Duration::from_secs(3));
    assert_eq!(clock.now(), other.now());
}

#[test]
fn system_clock_epoch_is_after_2020() {
    assert!(SystemClock.epoch_ms() > 1_577_836_800_000);
}
