// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn three_tasks_three_invocations() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(3, 0));
    ctx.agent_checks_one_task();

    let outcome = run_to_end(&ctx, single("Phase-1")).await;

    assert_eq!(ctx.agent.call_count(), 3);
    assert_eq!(outcome.summary.status, RunStatus::Completed);
    assert_eq!(outcome.summary.tasks_completed, 3);
    assert_eq!(outcome.summary.tasks_attempted, 3);
    assert_eq!(outcome.summary.loops_completed, 1);
    assert_eq!(outcome.final_state.completed_tasks_across_all_docs, 3);
    assert_eq!(outcome.final_state.total_tasks_across_all_docs, 3);
    assert_eq!(
        ctx.doc("Phase-1"),
        "# Tasks\n\n- [x] open task 1\n- [x] open task 2\n- [x] open task 3\n"
    );
    assert_eq!(ctx.engine.state(&ctx.session), BatchRunState::default());
    assert!(!ctx.engine.is_running(&ctx.session));
}

#[tokio::test]
async fn complete_resets_published_counters() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(1, 0));
    ctx.agent_checks_one_task();
    let states = ctx.engine.subscribe(&ctx.session);
    run_to_end(&ctx, single("Phase-1")).await;

    let state = states.borrow().clone();
    assert!(states.has_changed().is_err());
    assert_eq!(state.phase, RunPhase::Completed);
    assert_eq!(state.completed_tasks_across_all_docs, 0);
    assert!(state.documents.is_empty());
}

#[tokio::test]
async fn documents_run_in_declared_order() {
    let ctx = setup();
    ctx.add_doc("B", task_doc(1, 0));
    ctx.add_doc("A", task_doc(2, 0));
    ctx.agent_checks_one_task();

    run_to_end(
        &ctx,
        config(vec![DocumentRef::new("B"), DocumentRef::new("A")]),
    )
    .await;
    assert_eq!(ctx.prompts(), vec!["B", "A", "A"]);
}

#[tokio::test]
async fn finished_documents_are_skipped() {
    let ctx = setup();
    ctx.add_doc("Done", task_doc(0, 2));
    ctx.add_doc("Open", task_doc(1, 0));
    ctx.agent_checks_one_task();

    let outcome = run_to_end(
        &ctx,
        config(vec![DocumentRef::new("Done"), DocumentRef::new("Open")]),
    )
    .await;
    assert_eq!(ctx.prompts(), vec!["Open"]);
    assert_eq!(outcome.summary.status, RunStatus::Completed);
}

#[tokio::test]
async fn agent_that_never_changes_anything_stalls() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(2, 0));
    ctx.agent_does_nothing();

    let outcome = run_to_end(&ctx, single("Phase-1")).await;

    assert_eq!(ctx.agent.call_count(), 2);
    assert_eq!(outcome.summary.status, RunStatus::Stalled);
    assert_eq!(outcome.summary.tasks_completed, 0);
    assert_eq!(outcome.summary.stalled_documents.len(), 1);
    assert_eq!(outcome.summary.stalled_documents[0].document, "Phase-1");
}

#[tokio::test]
async fn unwritable_template_document_still_stalls() {
    let ctx = setup();
    ctx.add_doc("Phase-1", "# Notes for loop {{LOOP_NUMBER}}\n- [ ] open task 1\n");
    ctx.docs.fail_writes("Phase-1", 10);
    ctx.agent_does_nothing();

    let outcome = run_to_end(&ctx, single("Phase-1")).await;

    assert_eq!(ctx.agent.call_count(), 2);
    assert_eq!(outcome.summary.status, RunStatus::Stalled);
    assert_eq!(outcome.summary.stalled_documents.len(), 1);
}

#[tokio::test]
async fn one_stalled_document_of_two() {
    let ctx = setup();
    ctx.add_doc("Stuck", task_doc(1, 0));
    ctx.add_doc("Fine", task_doc(1, 0));
    let docs = ctx.docs.clone();
    let folder = ctx.folder.clone();
    ctx.agent.on_spawn(move |req| {
        if req.prompt == "Fine" {
            docs.set_doc(&folder, "Fine", task_doc(0, 1));
        }
        Ok(AgentResponse::ok("ok"))
    });

    let outcome = run_to_end(
        &ctx,
        config(vec![DocumentRef::new("Stuck"), DocumentRef::new("Fine")]),
    )
    .await;
    assert_eq!(ctx.prompts(), vec!["Stuck", "Stuck", "Fine"]);
    assert_eq!(outcome.summary.status, RunStatus::CompletedWithStalls);
    assert_eq!(outcome.summary.tasks_completed, 1);
}

#[tokio::test]
async fn added_tasks_grow_the_total() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(1, 0));
    let docs = ctx.docs.clone();
    let folder = ctx.folder.clone();
    let count = std::sync::Arc::new(AtomicU32::new(0));
    ctx.agent.on_spawn(move |_| {
        // First run closes its task and appends two more
        let next = match count.fetch_add(1, Ordering::SeqCst) {
            0 => "- [x] a\n- [ ] b\n- [ ] c\n",
            1 => "- [x] a\n- [x] b\n- [ ] c\n",
            _ => "- [x] a\n- [x] b\n- [x] c\n",
        };
        docs.set_doc(&folder, "Phase-1", next);
        Ok(AgentResponse::ok("ok"))
    });

    let outcome = run_to_end(&ctx, single("Phase-1")).await;
    assert_eq!(ctx.agent.call_count(), 3);
    assert_eq!(outcome.final_state.completed_tasks_across_all_docs, 3);
    assert_eq!(outcome.final_state.total_tasks_across_all_docs, 3);
}

#[tokio::test]
async fn no_unchecked_tasks_is_rejected_without_state() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(0, 3));

    let err = ctx
        .engine
        .start_run(ctx.session.clone(), ctx.request(single("Phase-1")))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, EngineError::NoTasks));
    assert_eq!(ctx.engine.state(&ctx.session).phase, RunPhase::Idle);
    assert!(!ctx.engine.is_running(&ctx.session));
    assert_eq!(ctx.agent.call_count(), 0);
    assert!(ctx.stats.run_starts().is_empty());
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let ctx = setup();
    let err = ctx
        .engine
        .start_run(ctx.session.clone(), ctx.request(config(vec![])))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, EngineError::Config(_)));
}

#[tokio::test]
async fn second_start_for_active_session_is_rejected() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(2, 0));
    agent_fails_on_call(&ctx, 1);

    let handle = ctx
        .engine
        .start_run(ctx.session.clone(), ctx.request(single("Phase-1")))
        .await
        .unwrap();
    wait_until(|| ctx.engine.has_pending_error(&ctx.session)).await;

    let err = ctx
        .engine
        .start_run(ctx.session.clone(), ctx.request(single("Phase-1")))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, EngineError::AlreadyRunning(_)));

    ctx.engine.stop(&ctx.session).unwrap();
    handle.wait().await.unwrap();

    // Completed sessions may start again
    let outcome = run_to_end(&ctx, single("Phase-1")).await;
    assert_eq!(outcome.summary.status, RunStatus::Completed);
}

#[tokio::test]
async fn other_sessions_run_independently() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(1, 0));
    ctx.add_doc("Phase-2", task_doc(1, 0));
    ctx.agent_checks_one_task();

    let a = ctx
        .engine
        .start_run(SessionId::new("a"), ctx.request(single("Phase-1")))
        .await
        .unwrap();
    let b = ctx
        .engine
        .start_run(SessionId::new("b"), ctx.request(single("Phase-2")))
        .await
        .unwrap();

    assert_eq!(a.wait().await.unwrap().summary.tasks_completed, 1);
    assert_eq!(b.wait().await.unwrap().summary.tasks_completed, 1);
}

#[tokio::test]
async fn history_and_stats_are_recorded() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(2, 0));
    ctx.agent_checks_one_task();
    run_to_end(&ctx, single("Phase-1")).await;

    let tasks = ctx.history.entries_of(HistoryKind::Task);
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].summary, "Checked off a task in Phase-1.");
    assert_eq!(tasks[0].document.as_deref(), Some("Phase-1"));
    assert_eq!(tasks[0].loop_number, 1);

    let runs = ctx.history.entries_of(HistoryKind::Run);
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, Some(RunStatus::Completed));
    assert!(ctx.history.entries_of(HistoryKind::Loop).is_empty());

    assert_eq!(ctx.stats.run_starts()[0].total_tasks, 2);
    assert_eq!(ctx.stats.tasks().len(), 2);
    assert_eq!(ctx.stats.run_ends()[0].tasks_completed, 2);
}

#[tokio::test]
async fn collaborator_failures_never_fail_the_run() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(1, 0));
    ctx.agent_checks_one_task();
    ctx.history.set_failing(true);
    ctx.stats.set_failing(true);
    ctx.keep_awake.set_fail_acquire(true);

    let outcome = run_to_end(&ctx, single("Phase-1")).await;
    assert_eq!(outcome.summary.status, RunStatus::Completed);
    assert_eq!(outcome.summary.tasks_completed, 1);
}

#[tokio::test]
async fn keep_awake_is_held_for_the_run() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(1, 0));
    ctx.agent_checks_one_task();
    run_to_end(&ctx, single("Phase-1")).await;

    assert_eq!(
        ctx.keep_awake.calls(),
        vec![
            KeepAwakeCall::Acquire(ctx.session.clone()),
            KeepAwakeCall::Release(ctx.session.clone()),
        ]
    );
    assert!(!ctx.keep_awake.is_held(&ctx.session));
}

#[tokio::test]
async fn prompt_variables_are_expanded() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(1, 0));
    let cfg = RunConfig::new(
        vec![DocumentRef::new("Phase-1")],
        "{{SESSION_NAME}}|{{LOOP_NUMBER}}|{{GIT_BRANCH}}|{{CWD}}|{{DOCUMENT_PATH}}",
    );
    ctx.agent.on_spawn(|_| Ok(AgentResponse::ok("ok")));
    run_to_end(&ctx, cfg).await;

    assert_eq!(
        ctx.prompts()[0],
        "Test Agent|1|main|/repo|/docs/Phase-1.md"
    );
}
