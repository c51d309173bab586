// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O

pub mod agent;
pub mod document;
pub mod env;
pub mod keep_awake;
pub mod sink;
pub mod subprocess;
pub mod traced;
pub mod vcs;

pub use agent::{
    parse_agent_output, AgentAdapter, AgentAdapterError, AgentRequest, AgentResponse,
    CommandAgentAdapter,
};
pub use document::{DocumentError, DocumentStore, FsDocumentStore, RUNS_DIR};
pub use keep_awake::{CommandKeepAwake, KeepAwake, KeepAwakeError, NoOpKeepAwake};
pub use sink::{
    HistorySink, JsonlHistorySink, JsonlStatsSink, NoOpHistorySink, NoOpStatsSink, RunEndStat,
    RunStartStat, SinkError, StatsSink, TaskStat,
};
pub use traced::{TracedAgent, TracedVcs};
pub use vcs::{GitAdapter, PrRequest, VcsAdapter, VcsError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use agent::{AgentCall, FakeAgentAdapter};
#[cfg(any(test, feature = "test-support"))]
pub use document::{DocumentCall, FakeDocumentStore};
#[cfg(any(test, feature = "test-support"))]
pub use keep_awake::{FakeKeepAwake, KeepAwakeCall};
#[cfg(any(test, feature = "test-support"))]
pub use sink::{FakeHistorySink, FakeStatsSink};
#[cfg(any(test, feature = "test-support"))]
pub use vcs::{FakeVcsAdapter, VcsCall};
