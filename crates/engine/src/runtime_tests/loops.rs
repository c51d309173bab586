// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn reset_document_uses_fresh_copy_each_pass() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(1, 0));
    ctx.add_doc("Phase-2", task_doc(1, 0));
    // Phase-1 fails once so it still has work after the first pass
    agent_fails_on_call(&ctx, 1);
    let cfg = config(vec![
        DocumentRef::new("Phase-1"),
        DocumentRef::resetting("Phase-2"),
    ])
    .with_loop(Some(2))
    .with_pause_on_error(false);

    let outcome = run_to_end(&ctx, cfg).await;

    assert_eq!(ctx.agent.call_count(), 4);
    assert_eq!(outcome.summary.loops_completed, 2);
    assert_eq!(ctx.history.entries_of(HistoryKind::Loop).len(), 2);
    assert_eq!(ctx.doc("Phase-2"), task_doc(1, 0));

    let copies = ctx.working_copies();
    assert_eq!(copies.len(), 2);
    assert_ne!(copies[0], copies[1]);
    assert!(copies.iter().any(|c| c.ends_with("loop-1")));
    assert!(copies.iter().any(|c| c.ends_with("loop-2")));
    for copy in &copies {
        assert_eq!(ctx.doc(copy), task_doc(0, 0) + "- [x] open task 1\n");
    }

    assert_eq!(outcome.summary.tasks_completed, 3);
    assert_eq!(outcome.final_state.loop_iteration, 1);
    assert_eq!(outcome.final_state.total_tasks_across_all_docs, 3);
}

#[tokio::test]
async fn reset_only_runs_are_bounded_by_max_loops() {
    let ctx = setup();
    ctx.add_doc("Daily", task_doc(1, 0));
    ctx.agent_checks_one_task();
    let cfg = config(vec![DocumentRef::resetting("Daily")]).with_loop(Some(3));

    let outcome = run_to_end(&ctx, cfg).await;

    assert_eq!(ctx.agent.call_count(), 3);
    assert_eq!(ctx.working_copies().len(), 3);
    assert_eq!(outcome.summary.loops_completed, 3);
    assert_eq!(outcome.summary.tasks_completed, 3);
    assert_eq!(ctx.doc("Daily"), task_doc(1, 0));
}

#[tokio::test]
async fn completed_reset_document_is_replayed_from_reset_copy() {
    let ctx = setup();
    ctx.add_doc("Open", task_doc(1, 0));
    ctx.add_doc("Checklist", task_doc(0, 2));
    ctx.agent_checks_one_task();
    let cfg = config(vec![
        DocumentRef::new("Open"),
        DocumentRef::resetting("Checklist"),
    ])
    .with_loop(Some(5));

    let outcome = run_to_end(&ctx, cfg).await;

    // One task in Open, two in the reset copy; then no non-reset work remains
    assert_eq!(ctx.agent.call_count(), 3);
    assert_eq!(outcome.summary.loops_completed, 1);
    assert_eq!(outcome.final_state.total_tasks_across_all_docs, 3);
    assert_eq!(ctx.doc("Checklist"), task_doc(0, 2));
}

#[tokio::test]
async fn completed_reset_document_is_skipped_without_loop() {
    let ctx = setup();
    ctx.add_doc("Open", task_doc(1, 0));
    ctx.add_doc("Checklist", task_doc(0, 2));
    ctx.agent_checks_one_task();
    let cfg = config(vec![
        DocumentRef::new("Open"),
        DocumentRef::resetting("Checklist"),
    ]);

    run_to_end(&ctx, cfg).await;
    assert_eq!(ctx.prompts(), vec!["Open"]);
    assert!(ctx.working_copies().is_empty());
}

#[tokio::test]
async fn loop_ends_when_non_reset_work_is_done() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(2, 0));
    ctx.agent_checks_one_task();
    let cfg = single("Phase-1").with_loop(None);

    let outcome = run_to_end(&ctx, cfg).await;
    assert_eq!(ctx.agent.call_count(), 2);
    assert_eq!(outcome.summary.loops_completed, 1);
    assert_eq!(ctx.history.entries_of(HistoryKind::Loop).len(), 1);
}

#[tokio::test]
async fn stalled_documents_stay_excluded() {
    let ctx = setup();
    ctx.add_doc("Stuck", task_doc(1, 0));
    ctx.add_doc("Replay", task_doc(1, 0));
    let docs = ctx.docs.clone();
    let folder = ctx.folder.clone();
    ctx.agent.on_spawn(move |req| {
        if req.prompt.starts_with("Runs/") {
            if let Some(content) = docs.doc(&folder, &req.prompt) {
                docs.set_doc(&folder, &req.prompt, content.replacen("- [ ]", "- [x]", 1));
            }
        }
        Ok(AgentResponse::ok("ok"))
    });
    let cfg = config(vec![
        DocumentRef::new("Stuck"),
        DocumentRef::resetting("Replay"),
    ])
    .with_loop(Some(3));

    let outcome = run_to_end(&ctx, cfg).await;

    assert_eq!(ctx.agent.call_count(), 3);
    assert_eq!(outcome.summary.status, RunStatus::CompletedWithStalls);
    assert_eq!(outcome.summary.stalled_documents[0].document, "Stuck");
}

#[tokio::test]
async fn pass_without_any_task_ends_the_loop() {
    let ctx = setup();
    ctx.add_doc("Daily", task_doc(1, 0));
    let docs = ctx.docs.clone();
    let folder = ctx.folder.clone();
    ctx.agent.on_spawn(move |req| {
        if let Some(content) = docs.doc(&folder, &req.prompt) {
            docs.set_doc(&folder, &req.prompt, content.replacen("- [ ]", "- [x]", 1));
        }
        // The original loses its tasks, so the next pass has nothing to do
        docs.set_doc(&folder, "Daily", "# Tasks\n");
        Ok(AgentResponse::ok("ok"))
    });
    let cfg = config(vec![DocumentRef::resetting("Daily")]).with_loop(None);

    let outcome = run_to_end(&ctx, cfg).await;
    assert_eq!(ctx.agent.call_count(), 1);
    assert_eq!(outcome.summary.loops_completed, 2);
    assert_eq!(outcome.summary.status, RunStatus::Completed);
}

#[tokio::test]
async fn loop_number_advances_in_prompts_and_history() {
    let ctx = setup();
    ctx.add_doc("Daily", task_doc(1, 0));
    let docs = ctx.docs.clone();
    let folder = ctx.folder.clone();
    ctx.agent.on_spawn(move |req| {
        let name = req.prompt.split('|').next().unwrap_or_default();
        if let Some(content) = docs.doc(&folder, name) {
            docs.set_doc(&folder, name, content.replacen("- [ ]", "- [x]", 1));
        }
        Ok(AgentResponse::ok("ok"))
    });
    let cfg = RunConfig::new(
        vec![DocumentRef::resetting("Daily")],
        "{{DOCUMENT_NAME}}|{{LOOP_NUMBER}}",
    )
    .with_loop(Some(2));

    run_to_end(&ctx, cfg).await;

    let loops: Vec<String> = ctx
        .prompts()
        .iter()
        .map(|p| p.rsplit('|').next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(loops, vec!["1", "2"]);
    let numbers: Vec<u32> = ctx
        .history
        .entries_of(HistoryKind::Loop)
        .iter()
        .map(|e| e.loop_number)
        .collect();
    assert_eq!(numbers, vec![1, 2]);
}

#[tokio::test]
async fn loop_history_only_carries_its_own_notes() {
    let ctx = setup();
    ctx.add_doc("Daily", task_doc(1, 0));
    agent_fails_on_call(&ctx, 1);
    let cfg = config(vec![DocumentRef::resetting("Daily")])
        .with_loop(Some(2))
        .with_pause_on_error(false);

    let outcome = run_to_end(&ctx, cfg).await;

    assert_eq!(ctx.agent.call_count(), 2);
    let loops = ctx.history.entries_of(HistoryKind::Loop);
    assert_eq!(loops.len(), 2);
    assert!(loops[0].details.as_deref().unwrap().contains("agent error on Daily"));
    assert!(!loops[1].details.as_deref().unwrap().contains("**Notes:**"));
    assert_eq!(outcome.summary.notes.len(), 1);
}
