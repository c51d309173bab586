// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! autorun-core: Domain types and pure logic for the autonomous task run engine

pub mod activity;
pub mod agent;
pub mod clock;
pub mod config;
pub mod history;
pub mod id;
pub mod state;
pub mod task;
pub mod template;
pub mod time_fmt;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use activity::{ActivitySource, AlwaysActive, ManualActivity};
pub use agent::{AgentError, AgentErrorKind, UsageStats};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{
    AgentCommandConfig, ConfigError, DocumentRef, RunConfig, RunFile, WorktreeConfig,
};
pub use history::{
    HistoryEntry, HistoryKind, LoopAggregate, RunStatus, RunSummary, StalledDocument,
};
pub use id::{HistoryEntryId, IdGen, SequentialIdGen, SessionId, UuidIdGen};
pub use state::{
    reduce, BatchRunState, ProgressUpdate, RunAction, RunPhase, RunStart, TaskDelta,
    WorktreeContext,
};
pub use task::{count_tasks, reset_checkboxes, TaskCounts};
pub use template::{expand_template, TemplateContext};
pub use time_fmt::{format_duration_ms, format_elapsed_ms};
