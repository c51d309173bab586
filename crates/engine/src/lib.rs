// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Autonomous task run engine

pub mod env;
mod error;
pub mod gate;
pub mod processor;
pub mod publisher;
mod runtime;
pub mod stall;
pub mod time_tracker;
pub mod worktree;

#[cfg(test)]
mod test_helpers;

pub use error::EngineError;
pub use gate::{ErrorGate, ErrorResolution};
pub use processor::{
    extract_summary, DocSnapshot, DocumentProcessor, TaskRequest, TaskResult, MAX_SUMMARY_CHARS,
};
pub use publisher::StatePublisher;
pub use runtime::{Engine, EngineConfig, EngineDeps, RunHandle, RunOutcome, RunRequest};
pub use stall::{StallDetector, STALL_THRESHOLD};
pub use time_tracker::TimeTracker;
pub use worktree::{should_create_pr, WorktreeManager, WorktreeSetup};
