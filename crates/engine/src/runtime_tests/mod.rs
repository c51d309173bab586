// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine run tests

mod errors;
mod lifecycle;
mod loops;
mod timing;
mod worktrees;

use super::*;
use crate::test_helpers::{setup, setup_with_debounce, wait_until, TestContext, TARGET_PROMPT};
use autorun_adapters::{AgentResponse, KeepAwakeCall};
use autorun_core::test_support::task_doc;
use autorun_core::{DocumentRef, HistoryKind, RunPhase, RunStatus};
use std::sync::atomic::{AtomicU32, Ordering};

fn config(documents: Vec<DocumentRef>) -> RunConfig {
    RunConfig::new(documents, TARGET_PROMPT)
}

fn single(name: &str) -> RunConfig {
    config(vec![DocumentRef::new(name)])
}

async fn run_to_end(ctx: &TestContext, config: RunConfig) -> RunOutcome {
    ctx.engine
        .start_run(ctx.session.clone(), ctx.request(config))
        .await
        .unwrap()
        .wait()
        .await
        .unwrap()
}

/// Agent whose `fail_on`-th call (1-based) fails and every other call checks off a task
fn agent_fails_on_call(ctx: &TestContext, fail_on: u32) {
    let docs = ctx.docs.clone();
    let folder = ctx.folder.clone();
    let count = std::sync::Arc::new(AtomicU32::new(0));
    ctx.agent.on_spawn(move |req| {
        let n = count.fetch_add(1, Ordering::SeqCst) + 1;
        if n == fail_on {
            return Ok(AgentResponse::failed("429 rate limit exceeded"));
        }
        let name = req.prompt.trim();
        if let Some(content) = docs.doc(&folder, name) {
            docs.set_doc(&folder, name, content.replacen("- [ ]", "- [x]", 1));
        }
        Ok(AgentResponse::ok("Checked off a task."))
    });
}
