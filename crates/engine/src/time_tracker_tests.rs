// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use autorun_core::FakeClock;
use proptest::prelude::*;

fn tracker() -> (FakeClock, TimeTracker<FakeClock>, SessionId) {
    let clock = FakeClock::new();
    let tracker = TimeTracker::new(clock.clone(), true);
    (clock, tracker, SessionId::new("s"))
}

#[test]
fn accumulates_while_active() {
    let (clock, tracker, id) = tracker();
    tracker.start_tracking(&id);
    clock.advance(Duration::from_secs(5));
    assert_eq!(tracker.get_elapsed_time(&id), Duration::from_secs(5));
}

#[test]
fn pauses_while_inactive() {
    let (clock, tracker, id) = tracker();
    tracker.start_tracking(&id);
    clock.advance(Duration::from_secs(3));
    tracker.set_host_active(false);
    clock.advance(Duration::from_secs(3600));
    assert_eq!(tracker.get_elapsed_time(&id), Duration::from_secs(3));

    tracker.set_host_active(true);
    clock.advance(Duration::from_secs(2));
    assert_eq!(tracker.get_elapsed_time(&id), Duration::from_secs(5));
}

#[test]
fn start_while_inactive_waits_for_activity() {
    let clock = FakeClock::new();
    let tracker = TimeTracker::new(clock.clone(), false);
    let id = SessionId::new("s");
    tracker.start_tracking(&id);
    clock.advance(Duration::from_secs(10));
    assert_eq!(tracker.get_elapsed_time(&id), Duration::ZERO);
    tracker.set_host_active(true);
    clock.advance(Duration::from_secs(1));
    assert_eq!(tracker.get_elapsed_time(&id), Duration::from_secs(1));
}

#[test]
fn repeated_transitions_are_ignored() {
    let (clock, tracker, id) = tracker();
    tracker.start_tracking(&id);
    clock.advance(Duration::from_secs(1));
    assert!(!tracker.set_host_active(true));
    clock.advance(Duration::from_secs(1));
    assert!(tracker.set_host_active(false));
    assert!(!tracker.set_host_active(false));
    clock.advance(Duration::from_secs(9));
    assert_eq!(tracker.get_elapsed_time(&id), Duration::from_secs(2));
}

#[test]
fn stop_returns_total_and_forgets_session() {
    let (clock, tracker, id) = tracker();
    tracker.start_tracking(&id);
    clock.advance(Duration::from_millis(1500));
    assert_eq!(tracker.stop_tracking(&id), Duration::from_millis(1500));
    assert!(!tracker.is_tracking(&id));
    assert_eq!(tracker.get_elapsed_time(&id), Duration::ZERO);
    assert_eq!(tracker.stop_tracking(&id), Duration::ZERO);
}

#[test]
fn sessions_are_independent() {
    let (clock, tracker, a) = tracker();
    let b = SessionId::new("b");
    tracker.start_tracking(&a);
    clock.advance(Duration::from_secs(2));
    tracker.start_tracking(&b);
    clock.advance(Duration::from_secs(1));
    assert_eq!(tracker.get_elapsed_time(&a), Duration::from_secs(3));
    assert_eq!(tracker.get_elapsed_time(&b), Duration::from_secs(1));
}

proptest! {
    /// Elapsed time equals the sum of active stretches, whatever the toggle pattern
    #[test]
    fn never_advances_while_inactive(steps in prop::collection::vec((any::<bool>(), 0u64..10_000), 0..30)) {
        let (clock, tracker, id) = tracker();
        tracker.start_tracking(&id);
        let mut active = true;
        let mut expected = 0u64;
        for (toggle, ms) in steps {
            if toggle {
                active = !active;
                tracker.set_host_active(active);
            }
            clock.advance(Duration::from_millis(ms));
            if active {
                expected += ms;
            }
            prop_assert_eq!(tracker.get_elapsed_time(&id), Duration::from_millis(expected));
        }
    }
}
