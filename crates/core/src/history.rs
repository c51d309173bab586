// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable run records: per task, per loop, per run.

use crate::agent::UsageStats;
use crate::id::{HistoryEntryId, SessionId};
use crate::time_fmt::format_duration_ms;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which part of a run a history entry summarizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    Task,
    Loop,
    Run,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Stopped,
    Stalled,
    CompletedWithStalls,
}

impl RunStatus {
    /// Stop wins over stall, and a stall only counts when every document stalled.
    pub fn resolve(stopped: bool, stalled_documents: usize, total_documents: usize) -> Self {
        if stopped {
            RunStatus::Stopped
        } else if stalled_documents > 0 && stalled_documents >= total_documents {
            RunStatus::Stalled
        } else if stalled_documents > 0 {
            RunStatus::CompletedWithStalls
        } else {
            RunStatus::Completed
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Completed => "completed",
            RunStatus::Stopped => "stopped",
            RunStatus::Stalled => "stalled",
            RunStatus::CompletedWithStalls => "completed with stalls",
        };
        write!(f, "{}", s)
    }
}

/// One append-only history record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: HistoryEntryId,
    pub session_id: SessionId,
    pub kind: HistoryKind,
    pub timestamp_ms: u64,
    /// Short one-line summary
    pub summary: String,
    /// Longer body (agent response or rendered loop/run details)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub success: bool,
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    /// 1-based pass the entry belongs to
    pub loop_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RunStatus>,
}

/// Counters for a single pass; reset when the next pass begins
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoopAggregate {
    pub tasks_completed: u32,
    pub tasks_attempted: u32,
    pub usage: UsageStats,
    pub started_at_ms: u64,
}

impl LoopAggregate {
    pub fn new(started_at_ms: u64) -> Self {
        Self {
            started_at_ms,
            ..Default::default()
        }
    }

    pub fn record_task(&mut self, completed: u32, usage: Option<UsageStats>) {
        self.tasks_attempted += 1;
        self.tasks_completed += completed;
        if let Some(usage) = usage {
            self.usage += usage;
        }
    }
}

/// A document skipped because repeated task runs made no progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StalledDocument {
    pub document: String,
    pub reason: String,
}

/// End-of-run rollup, also written to history as a `Run` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub session_id: SessionId,
    pub status: RunStatus,
    pub tasks_completed: u32,
    pub tasks_attempted: u32,
    /// Number of passes actually executed
    pub loops_completed: u32,
    /// Visibility-gated elapsed wall time
    pub elapsed_ms: u64,
    /// Sum of per-task agent durations
    pub task_time_ms: u64,
    pub usage: UsageStats,
    pub stalled_documents: Vec<StalledDocument>,
    /// Non-fatal problems worth surfacing (agent errors, skipped documents, PR failures)
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
}

impl RunSummary {
    /// One-line headline, e.g. `Auto Run completed: 3 tasks in 1m 5s`
    pub fn headline(&self) -> String {
        let tasks = if self.tasks_completed == 1 {
            "1 task".to_string()
        } else {
            format!("{} tasks", self.tasks_completed)
        };
        format!(
            "Auto Run {}: {} in {}",
            self.status,
            tasks,
            format_duration_ms(self.elapsed_ms)
        )
    }

    /// Multi-line markdown body
    pub fn details(&self) -> String {
        let mut lines = vec![
            format!("**Status:** {}", self.status),
            format!(
                "**Tasks:** {} completed ({} attempted)",
                self.tasks_completed, self.tasks_attempted
            ),
            format!("**Loops:** {}", self.loops_completed),
            format!("**Elapsed:** {}", format_duration_ms(self.elapsed_ms)),
            format!("**Agent time:** {}", format_duration_ms(self.task_time_ms)),
        ];
        if !self.usage.is_empty() {
            lines.push(format!(
                "**Tokens:** {} in / {} out",
                self.usage.input_tokens, self.usage.output_tokens
            ));
            lines.push(format!("**Cost:** ${:.4}", self.usage.total_cost_usd));
        }
        if let Some(url) = &self.pr_url {
            lines.push(format!("**Pull request:** {}", url));
        }
        if !self.stalled_documents.is_empty() {
            lines.push(String::new());
            lines.push("**Stalled documents:**".to_string());
            for doc in &self.stalled_documents {
                lines.push(format!("- {}: {}", doc.document, doc.reason));
            }
        }
        if !self.notes.is_empty() {
            lines.push(String::new());
            lines.push("**Notes:**".to_string());
            for note in &self.notes {
                lines.push(format!("- {}", note));
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
