// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use autorun_core::AgentErrorKind;

async fn paused_run(ctx: &TestContext, cfg: RunConfig) -> RunHandle {
    let handle = ctx
        .engine
        .start_run(ctx.session.clone(), ctx.request(cfg))
        .await
        .unwrap();
    wait_until(|| ctx.engine.has_pending_error(&ctx.session)).await;
    handle
}

#[tokio::test]
async fn failure_pauses_with_error_state() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(1, 0));
    agent_fails_on_call(&ctx, 1);
    let handle = paused_run(&ctx, single("Phase-1")).await;

    let state = ctx.engine.state(&ctx.session);
    assert_eq!(state.phase, RunPhase::ErrorPaused);
    assert_eq!(state.error_document_index, Some(0));
    assert_eq!(state.error.unwrap().kind, AgentErrorKind::RateLimited);

    ctx.engine
        .resolve_error(&ctx.session, ErrorResolution::Resume)
        .unwrap();
    let outcome = handle.wait().await.unwrap();

    assert_eq!(ctx.agent.call_count(), 2);
    assert_eq!(outcome.summary.status, RunStatus::Completed);
    assert_eq!(outcome.summary.tasks_completed, 1);
    assert!(outcome.final_state.error.is_none());
    assert!(outcome
        .summary
        .notes
        .iter()
        .any(|n| n.starts_with("agent error on Phase-1")));
}

#[tokio::test]
async fn skip_document_moves_on() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(1, 0));
    ctx.add_doc("Phase-2", task_doc(1, 0));
    agent_fails_on_call(&ctx, 1);
    let handle = paused_run(
        &ctx,
        config(vec![DocumentRef::new("Phase-1"), DocumentRef::new("Phase-2")]),
    )
    .await;

    ctx.engine
        .resolve_error(&ctx.session, ErrorResolution::SkipDocument)
        .unwrap();
    let outcome = handle.wait().await.unwrap();

    assert_eq!(ctx.prompts(), vec!["Phase-1", "Phase-2"]);
    assert_eq!(ctx.doc("Phase-1"), task_doc(1, 0));
    assert_eq!(outcome.summary.status, RunStatus::Completed);
    assert!(outcome
        .summary
        .notes
        .contains(&"skipped Phase-1 after error".to_string()));
}

async fn stopped_by(ctx: &TestContext, interrupt: impl FnOnce(&TestContext)) -> RunOutcome {
    ctx.add_doc("Phase-1", task_doc(2, 0));
    agent_fails_on_call(ctx, 1);
    let handle = paused_run(ctx, single("Phase-1")).await;
    interrupt(ctx);
    handle.wait().await.unwrap()
}

#[tokio::test]
async fn abort_is_equivalent_to_stop() {
    let aborted_ctx = setup();
    let aborted = stopped_by(&aborted_ctx, |ctx| {
        ctx.engine
            .resolve_error(&ctx.session, ErrorResolution::Abort)
            .unwrap();
    })
    .await;

    let stopped_ctx = setup();
    let stopped = stopped_by(&stopped_ctx, |ctx| ctx.engine.stop(&ctx.session).unwrap()).await;

    assert_eq!(aborted.summary.status, RunStatus::Stopped);
    assert_eq!(stopped.summary.status, RunStatus::Stopped);
    assert_eq!(aborted.summary.tasks_completed, stopped.summary.tasks_completed);
    assert_eq!(aborted_ctx.agent.call_count(), 1);
    assert_eq!(stopped_ctx.agent.call_count(), 1);
    assert_eq!(aborted.final_state.phase, RunPhase::Stopping);
    assert_eq!(stopped.final_state.phase, RunPhase::Stopping);
    assert!(aborted.final_state.error.is_none());
}

#[tokio::test]
async fn resolve_without_pending_error_fails() {
    let ctx = setup();
    let err = ctx
        .engine
        .resolve_error(&ctx.session, ErrorResolution::Resume)
        .unwrap_err();
    assert!(matches!(err, EngineError::NoPendingError(_)));
}

#[tokio::test]
async fn stop_without_run_fails() {
    let ctx = setup();
    let err = ctx.engine.stop(&ctx.session).unwrap_err();
    assert!(matches!(err, EngineError::NotRunning(_)));
}

#[tokio::test]
async fn stop_lets_in_flight_task_finish() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(3, 0));
    let docs = ctx.docs.clone();
    let folder = ctx.folder.clone();
    let engine = ctx.engine.clone();
    let session = ctx.session.clone();
    ctx.agent.on_spawn(move |_| {
        let content = docs.doc(&folder, "Phase-1").unwrap_or_default();
        docs.set_doc(&folder, "Phase-1", content.replacen("- [ ]", "- [x]", 1));
        engine.stop(&session).unwrap();
        Ok(AgentResponse::ok("ok"))
    });

    let outcome = run_to_end(&ctx, single("Phase-1")).await;
    assert_eq!(ctx.agent.call_count(), 1);
    assert_eq!(outcome.summary.tasks_completed, 1);
    assert_eq!(outcome.summary.status, RunStatus::Stopped);
}

#[tokio::test]
async fn without_pause_failures_are_noted_and_skipped() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(1, 0));
    ctx.add_doc("Phase-2", task_doc(1, 0));
    agent_fails_on_call(&ctx, 1);
    let cfg = config(vec![DocumentRef::new("Phase-1"), DocumentRef::new("Phase-2")])
        .with_pause_on_error(false);

    let outcome = run_to_end(&ctx, cfg).await;

    assert_eq!(ctx.prompts(), vec!["Phase-1", "Phase-2"]);
    assert!(!ctx.engine.has_pending_error(&ctx.session));
    assert_eq!(outcome.summary.tasks_completed, 1);
    assert_eq!(outcome.summary.tasks_attempted, 2);
    assert_eq!(outcome.summary.status, RunStatus::Completed);

    let tasks = ctx.history.entries_of(HistoryKind::Task);
    assert!(!tasks[0].success);
    assert!(tasks[1].success);
    assert!(!ctx.stats.tasks()[0].success);
}

#[tokio::test]
async fn repeated_failures_without_pause_stall() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(3, 0));
    ctx.agent
        .on_spawn(|_| Ok(AgentResponse::failed("something odd happened")));
    let cfg = single("Phase-1").with_pause_on_error(false);

    let outcome = run_to_end(&ctx, cfg).await;
    assert_eq!(ctx.agent.call_count(), 2);
    assert_eq!(outcome.summary.status, RunStatus::Stalled);
}
