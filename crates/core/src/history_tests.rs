// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    clean            = { false, 0, 2, RunStatus::Completed },
    stopped          = { true,  0, 2, RunStatus::Stopped },
    stopped_wins     = { true,  2, 2, RunStatus::Stopped },
    all_stalled      = { false, 2, 2, RunStatus::Stalled },
    some_stalled     = { false, 1, 2, RunStatus::CompletedWithStalls },
    single_stalled   = { false, 1, 1, RunStatus::Stalled },
)]
fn status_resolution(stopped: bool, stalled: usize, total: usize, expected: RunStatus) {
    assert_eq!(RunStatus::resolve(stopped, stalled, total), expected);
}

fn summary() -> RunSummary {
    RunSummary {
        session_id: SessionId::new("s"),
        status: RunStatus::CompletedWithStalls,
        tasks_completed: 3,
        tasks_attempted: 5,
        loops_completed: 1,
        elapsed_ms: 65_000,
        task_time_ms: 60_000,
        usage: UsageStats {
            input_tokens: 100,
            output_tokens: 50,
            total_cost_usd: 0.125,
            ..Default::default()
        },
        stalled_documents: vec![StalledDocument {
            document: "Phase-2".to_string(),
            reason: "no progress after 2 attempts".to_string(),
        }],
        notes: vec!["agent error on Phase-1: rate limited".to_string()],
        pr_url: Some("https://example.com/pr/1".to_string()),
    }
}

#[test]
fn headline_reads_naturally() {
    assert_eq!(
        summary().headline(),
        "Auto Run completed with stalls: 3 tasks in 1m 5s"
    );
    let single = RunSummary {
        tasks_completed: 1,
        status: RunStatus::Completed,
        ..summary()
    };
    assert_eq!(single.headline(), "Auto Run completed: 1 task in 1m 5s");
}

#[test]
fn details_lists_stalls_notes_and_cost() {
    let details = summary().details();
    assert!(details.contains("**Tasks:** 3 completed (5 attempted)"));
    assert!(details.contains("- Phase-2: no progress after 2 attempts"));
    assert!(details.contains("- agent error on Phase-1: rate limited"));
    assert!(details.contains("**Cost:** $0.1250"));
    assert!(details.contains("https://example.com/pr/1"));
}

#[test]
fn details_omit_usage_when_unknown() {
    let s = RunSummary {
        usage: UsageStats::default(),
        ..summary()
    };
    assert!(!s.details().contains("Tokens"));
}

#[test]
fn loop_aggregate_counts_tasks_and_usage() {
    let mut agg = LoopAggregate::new(10);
    agg.record_task(1, Some(UsageStats {
        input_tokens: 5,
        ..Default::default()
    }));
    agg.record_task(0, None);
    assert_eq!(agg.tasks_attempted, 2);
    assert_eq!(agg.tasks_completed, 1);
    assert_eq!(agg.usage.input_tokens, 5);
    assert_eq!(agg.started_at_ms, 10);
}
