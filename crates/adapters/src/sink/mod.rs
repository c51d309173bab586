// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fire-and-forget record sinks: run history and usage statistics
//!
//! Callers log and swallow sink errors; a failing sink never fails a run.

mod jsonl;
mod noop;

pub use jsonl::{JsonlHistorySink, JsonlStatsSink};
pub use noop::{NoOpHistorySink, NoOpStatsSink};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeHistorySink, FakeStatsSink};

use async_trait::async_trait;
use autorun_core::{HistoryEntry, RunStatus, SessionId, UsageStats};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from sink operations
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// Append-only store of human-readable run records
#[async_trait]
pub trait HistorySink: Clone + Send + Sync + 'static {
    async fn append(&self, entry: &HistoryEntry) -> Result<(), SinkError>;
}

/// Recorded at run start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStartStat {
    pub session_id: SessionId,
    pub timestamp_ms: u64,
    pub documents: usize,
    pub total_tasks: u32,
    pub loop_enabled: bool,
}

/// Recorded after each task invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStat {
    pub session_id: SessionId,
    pub timestamp_ms: u64,
    pub document: String,
    pub elapsed_ms: u64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageStats>,
}

/// Recorded at run end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEndStat {
    pub session_id: SessionId,
    pub timestamp_ms: u64,
    pub status: RunStatus,
    pub tasks_completed: u32,
    pub elapsed_ms: u64,
    pub usage: UsageStats,
}

/// Telemetry sink for run start, per-task, and run end records
#[async_trait]
pub trait StatsSink: Clone + Send + Sync + 'static {
    async fn record_run_start(&self, stat: &RunStartStat) -> Result<(), SinkError>;
    async fn record_task(&self, stat: &TaskStat) -> Result<(), SinkError>;
    async fn record_run_end(&self, stat: &RunEndStat) -> Result<(), SinkError>;
}
