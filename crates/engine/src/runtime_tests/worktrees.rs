// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use autorun_adapters::{VcsCall, VcsError};
use autorun_core::WorktreeConfig;
use std::path::PathBuf;

fn worktree(create_pr: bool, remove_on_completion: bool) -> WorktreeConfig {
    WorktreeConfig {
        path: PathBuf::from("/wt/feature"),
        branch: "autorun/feature".to_string(),
        create_pr,
        pr_target_branch: None,
        remove_on_completion,
    }
}

fn worktree_run(ctx: &TestContext, create_pr: bool, remove: bool) -> RunConfig {
    ctx.add_doc("Phase-1", task_doc(2, 0));
    single("Phase-1").with_worktree(worktree(create_pr, remove))
}

#[tokio::test]
async fn agent_runs_inside_worktree_and_pr_is_opened() {
    let ctx = setup();
    ctx.agent_checks_one_task();
    let cfg = worktree_run(&ctx, true, false);

    let outcome = run_to_end(&ctx, cfg).await;

    for call in ctx.agent.calls() {
        assert_eq!(call.cwd, Some(PathBuf::from("/wt/feature")));
    }
    assert!(outcome.final_state.worktree_active);
    assert_eq!(
        outcome.final_state.worktree_branch.as_deref(),
        Some("autorun/feature")
    );

    let prs = ctx.vcs.pr_requests();
    assert_eq!(prs.len(), 1);
    assert_eq!(prs[0].head_branch, "autorun/feature");
    assert_eq!(prs[0].base_branch, "main");
    assert!(prs[0].title.starts_with("Auto Run completed"));
    assert_eq!(
        outcome.summary.pr_url.as_deref(),
        Some("https://github.com/example/repo/pull/1")
    );
}

#[tokio::test]
async fn pr_targets_configured_branch() {
    let ctx = setup();
    ctx.agent_checks_one_task();
    ctx.add_doc("Phase-1", task_doc(1, 0));
    let cfg = single("Phase-1").with_worktree(WorktreeConfig {
        pr_target_branch: Some("develop".to_string()),
        ..worktree(true, false)
    });

    run_to_end(&ctx, cfg).await;
    assert_eq!(ctx.vcs.pr_requests()[0].base_branch, "develop");
}

#[tokio::test]
async fn git_branch_variable_is_the_worktree_branch() {
    let ctx = setup();
    ctx.add_doc("Phase-1", task_doc(1, 0));
    ctx.agent_does_nothing();
    let cfg = RunConfig::new(vec![DocumentRef::new("Phase-1")], "{{GIT_BRANCH}}")
        .with_worktree(worktree(false, false));

    run_to_end(&ctx, cfg).await;
    assert_eq!(ctx.prompts()[0], "autorun/feature");
}

#[tokio::test]
async fn stopped_run_opens_no_pr() {
    let ctx = setup();
    let cfg = worktree_run(&ctx, true, false);
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

    let outcome = run_to_end(&ctx, cfg).await;
    assert_eq!(outcome.summary.status, RunStatus::Stopped);
    assert!(ctx.vcs.pr_requests().is_empty());
    assert!(outcome.summary.pr_url.is_none());
}

#[tokio::test]
async fn run_without_completed_tasks_opens_no_pr() {
    let ctx = setup();
    ctx.agent_does_nothing();
    let cfg = worktree_run(&ctx, true, false);

    let outcome = run_to_end(&ctx, cfg).await;
    assert_eq!(outcome.summary.tasks_completed, 0);
    assert!(ctx.vcs.pr_requests().is_empty());
}

#[tokio::test]
async fn pr_failure_is_a_note_not_a_failure() {
    let ctx = setup();
    ctx.agent_checks_one_task();
    ctx.vcs
        .set_pr_error(VcsError::CommandFailed("gh: not logged in".to_string()));
    let cfg = worktree_run(&ctx, true, false);

    let outcome = run_to_end(&ctx, cfg).await;
    assert_eq!(outcome.summary.status, RunStatus::Completed);
    assert!(outcome.summary.pr_url.is_none());
    assert!(outcome
        .summary
        .notes
        .iter()
        .any(|n| n.starts_with("pull request failed")));
}

#[tokio::test]
async fn worktree_failure_aborts_start() {
    let ctx = setup();
    ctx.agent_checks_one_task();
    ctx.vcs
        .set_worktree_error(VcsError::CommandFailed("branch exists".to_string()));
    let cfg = worktree_run(&ctx, false, false);

    let err = ctx
        .engine
        .start_run(ctx.session.clone(), ctx.request(cfg.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Worktree(_)));
    assert_eq!(ctx.agent.call_count(), 0);
    assert!(!ctx.engine.is_running(&ctx.session));
    assert!(ctx.engine.state(&ctx.session).phase.is_idle());

    // The session is free again once the worktree problem is gone
    let plain = RunConfig {
        worktree: None,
        ..cfg
    };
    let outcome = run_to_end(&ctx, plain).await;
    assert_eq!(outcome.summary.tasks_completed, 2);
}

#[tokio::test]
async fn worktree_requires_a_repository() {
    let ctx = setup();
    ctx.vcs.set_is_repo(false);
    let cfg = worktree_run(&ctx, false, false);

    let err = ctx
        .engine
        .start_run(ctx.session.clone(), ctx.request(cfg))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Worktree(_)));
}

#[tokio::test]
async fn worktree_removed_after_pr_when_requested() {
    let ctx = setup();
    ctx.agent_checks_one_task();
    let cfg = worktree_run(&ctx, true, true);

    run_to_end(&ctx, cfg).await;

    let calls = ctx.vcs.calls();
    let pr = calls
        .iter()
        .position(|c| matches!(c, VcsCall::CreatePr { .. }))
        .unwrap();
    let removed = calls
        .iter()
        .position(|c| matches!(c, VcsCall::RemoveWorktree { path } if path == &PathBuf::from("/wt/feature")))
        .unwrap();
    assert!(pr < removed);
}

#[tokio::test]
async fn worktree_retained_by_default() {
    let ctx = setup();
    ctx.agent_checks_one_task();
    let cfg = worktree_run(&ctx, false, false);

    run_to_end(&ctx, cfg).await;
    assert!(!ctx
        .vcs
        .calls()
        .iter()
        .any(|c| matches!(c, VcsCall::RemoveWorktree { .. })));
}
