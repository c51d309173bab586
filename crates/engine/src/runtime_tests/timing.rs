// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use autorun_core::ManualActivity;
use std::time::Duration;

/// Agent that takes ten (fake) seconds per task; `on_call` runs before the clock moves
fn slow_agent(ctx: &TestContext, on_call: impl Fn(u32) + Send + Sync + 'static) {
    let docs = ctx.docs.clone();
    let folder = ctx.folder.clone();
    let clock = ctx.clock.clone();
    let count = std::sync::Arc::new(AtomicU32::new(0));
    ctx.agent.on_spawn(move |req| {
        on_call(count.fetch_add(1, Ordering::SeqCst) + 1);
        clock.advance(Duration::from_secs(10));
        let name = req.prompt.trim();
        if let Some(content) = docs.doc(&folder, name) {
            docs.set_doc(&folder, name, content.replacen("- [ ]", "- [x]", 1));
        }
        Ok(AgentResponse::ok("done"))
    });
}

#[tokio::test]
async fn elapsed_counts_while_host_is_active() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(3, 0));
    slow_agent(&ctx, |_| {});

    let outcome = run_to_end(&ctx, single("Phase-1")).await;
    assert_eq!(outcome.summary.elapsed_ms, 30_000);
    assert_eq!(outcome.summary.task_time_ms, 30_000);
    assert_eq!(outcome.final_state.accumulated_elapsed_ms, 30_000);
    assert_eq!(ctx.engine.elapsed(&ctx.session), Duration::ZERO);
}

#[tokio::test]
async fn inactive_host_does_not_accumulate_elapsed() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(3, 0));
    slow_agent(&ctx, |_| {});
    ctx.engine.set_host_active(false);

    let outcome = run_to_end(&ctx, single("Phase-1")).await;
    assert_eq!(outcome.summary.elapsed_ms, 0);
    // Agent time is real time regardless of visibility
    assert_eq!(outcome.summary.task_time_ms, 30_000);
}

#[tokio::test]
async fn host_going_inactive_mid_run_freezes_elapsed() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(3, 0));
    let engine = ctx.engine.clone();
    slow_agent(&ctx, move |n| {
        if n == 2 {
            engine.set_host_active(false);
        }
    });

    let outcome = run_to_end(&ctx, single("Phase-1")).await;
    assert_eq!(outcome.summary.elapsed_ms, 10_000);
    assert_eq!(outcome.summary.task_time_ms, 30_000);
}

#[tokio::test]
async fn visibility_change_publishes_elapsed_mid_task() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(1, 0));
    let engine = ctx.engine.clone();
    let session = ctx.session.clone();
    let clock = ctx.clock.clone();
    let seen = std::sync::Arc::new(std::sync::Mutex::new(None));
    let sink = seen.clone();
    ctx.agent.on_spawn(move |_| {
        clock.advance(Duration::from_secs(4));
        engine.set_host_active(false);
        let state = engine.state(&session);
        *sink.lock().unwrap() = Some((
            state.accumulated_elapsed_ms,
            state.last_active_timestamp,
            autorun_core::Clock::epoch_ms(&clock),
        ));
        clock.advance(Duration::from_secs(6));
        Ok(AgentResponse::ok("done"))
    });

    let outcome = run_to_end(&ctx, single("Phase-1")).await;
    let (elapsed, last_active, now) = seen.lock().unwrap().take().unwrap();
    assert_eq!(elapsed, 4_000);
    assert_eq!(last_active, Some(now));
    assert_eq!(outcome.summary.elapsed_ms, 4_000);
}

#[tokio::test]
async fn task_history_carries_agent_duration() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(1, 0));
    slow_agent(&ctx, |_| {});

    run_to_end(&ctx, single("Phase-1")).await;
    let tasks = ctx.history.entries_of(HistoryKind::Task);
    assert_eq!(tasks[0].elapsed_ms, 10_000);
    assert_eq!(ctx.stats.tasks()[0].elapsed_ms, 10_000);
}

#[tokio::test(start_paused = true)]
async fn debounced_progress_is_flushed_before_pause() {
    let ctx = setup_with_debounce(Duration::from_millis(200));
    ctx.add_doc("Phase-1", task_doc(2, 0));
    agent_fails_on_call(&ctx, 2);

    let handle = ctx
        .engine
        .start_run(ctx.session.clone(), ctx.request(single("Phase-1")))
        .await
        .unwrap();
    wait_until(|| ctx.engine.has_pending_error(&ctx.session)).await;

    let state = ctx.engine.state(&ctx.session);
    assert_eq!(state.phase, RunPhase::ErrorPaused);
    assert_eq!(state.completed_tasks_across_all_docs, 1);
    assert_eq!(state.current_doc_tasks_completed, 1);

    ctx.engine.stop(&ctx.session).unwrap();
    handle.wait().await.unwrap();
    assert!(!ctx.engine.is_running(&ctx.session));
    assert_eq!(ctx.engine.state(&ctx.session).phase, RunPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn activity_watcher_follows_the_source() {
    let ctx = setup();
    let source = ManualActivity::new(true);
    let watcher = ctx
        .engine
        .watch_activity(source.clone(), Duration::from_millis(50));

    source.set_active(false);
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(!ctx.engine.tracker.is_host_active());

    source.set_active(true);
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(ctx.engine.tracker.is_host_active());
    watcher.abort();
}
