// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::config::{DocumentRef, RunConfig};
use crate::state::{reduce, BatchRunState, RunAction, RunStart};

/// Markdown document with `unchecked` open tasks followed by `checked` done ones
pub fn task_doc(unchecked: u32, checked: u32) -> String {
    let mut out = String::from("# Tasks\n\n");
    for i in 1..=unchecked {
        out.push_str(&format!("- [ ] open task {}\n", i));
    }
    for i in 1..=checked {
        out.push_str(&format!("- [x] done task {}\n", i));
    }
    out
}

/// Single-pass config over plain (non-resetting) documents
pub fn run_config(documents: &[&str]) -> RunConfig {
    RunConfig::new(
        documents.iter().map(|d| DocumentRef::new(*d)).collect(),
        "Work on {{DOCUMENT_PATH}}. Complete the next unchecked task and check it off.",
    )
}

/// State after `START` + `SET_RUNNING` with the given task total
pub fn running_state(documents: &[&str], total_tasks: u32) -> BatchRunState {
    let state = reduce(
        BatchRunState::default(),
        RunAction::Start(RunStart {
            documents: documents.iter().map(|d| d.to_string()).collect(),
            total_tasks,
            loop_enabled: false,
            max_loops: None,
            worktree: None,
            started_at_ms: 0,
        }),
    );
    reduce(state, RunAction::SetRunning)
}
