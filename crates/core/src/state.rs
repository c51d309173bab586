// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-session run state and its reducer.
//!
//! `BatchRunState` is the source of truth for one session's run. It only
//! changes through [`reduce`], a pure function of `(state, action)`, so the
//! orchestrator's copy and every published snapshot stay identical when the
//! same actions are applied in the same order.
//!
//! ```text
//! Idle ─START─▶ Initializing ─SET_RUNNING─▶ Running ⇄ ErrorPaused
//!                                              │           │
//!                                              └─SET_STOPPING─▶ Stopping
//! (any non-idle) ─COMPLETE─▶ Completed
//! ```

use crate::agent::AgentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Run lifecycle phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    Initializing,
    Running,
    ErrorPaused,
    Stopping,
    Completed,
}

impl RunPhase {
    /// A new run may start from this phase
    pub fn is_idle(&self) -> bool {
        matches!(self, RunPhase::Idle | RunPhase::Completed)
    }

    pub fn is_active(&self) -> bool {
        !self.is_idle()
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunPhase::Idle => "idle",
            RunPhase::Initializing => "initializing",
            RunPhase::Running => "running",
            RunPhase::ErrorPaused => "error_paused",
            RunPhase::Stopping => "stopping",
            RunPhase::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

/// Isolated working copy a run executes in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreeContext {
    pub path: PathBuf,
    pub branch: String,
    pub active: bool,
}

/// Authoritative per-session run state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchRunState {
    pub phase: RunPhase,
    pub documents: Vec<String>,
    pub current_document_index: usize,
    pub current_doc_tasks_total: u32,
    pub current_doc_tasks_completed: u32,
    pub total_tasks_across_all_docs: u32,
    pub completed_tasks_across_all_docs: u32,
    /// Zero-based count of finished passes
    pub loop_iteration: u32,
    pub loop_enabled: bool,
    pub max_loops: Option<u32>,
    pub worktree_active: bool,
    pub worktree_path: Option<PathBuf>,
    pub worktree_branch: Option<String>,
    /// Sum of real per-task agent durations
    pub cumulative_task_time_ms: u64,
    /// Visibility-gated wall time flushed so far
    pub accumulated_elapsed_ms: u64,
    pub last_active_timestamp: Option<u64>,
    pub started_at_ms: Option<u64>,
    pub error: Option<AgentError>,
    pub error_document_index: Option<usize>,
    pub agent_session_ids: Vec<String>,
}

/// Payload for `START`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStart {
    pub documents: Vec<String>,
    pub total_tasks: u32,
    pub loop_enabled: bool,
    pub max_loops: Option<u32>,
    pub worktree: Option<WorktreeContext>,
    pub started_at_ms: u64,
}

/// Net task delta produced by one task run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDelta {
    /// `max(0, new_checked - prev_checked)`
    pub completed: u32,
    /// `(new_unchecked + new_checked) - (prev_unchecked + prev_checked)`
    pub net_change: i64,
    pub task_time_ms: u64,
}

/// Partial update applied by `UPDATE_PROGRESS`; `None` leaves a field alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub current_document_index: Option<usize>,
    pub current_doc_tasks_total: Option<u32>,
    pub current_doc_tasks_completed: Option<u32>,
    pub total_tasks_across_all_docs: Option<u32>,
    pub loop_iteration: Option<u32>,
    pub accumulated_elapsed_ms: Option<u64>,
    pub last_active_timestamp: Option<u64>,
    pub task_delta: Option<TaskDelta>,
    pub agent_session_id: Option<String>,
}

/// Actions accepted by [`reduce`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunAction {
    Start(RunStart),
    SetRunning,
    UpdateProgress(ProgressUpdate),
    SetStopping,
    SetError {
        error: AgentError,
        document_index: usize,
    },
    ClearError,
    Complete,
}

impl RunAction {
    /// Transitions that must never sit in a debounce window
    pub fn is_critical(&self) -> bool {
        !matches!(self, RunAction::UpdateProgress(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            RunAction::Start(_) => "START",
            RunAction::SetRunning => "SET_RUNNING",
            RunAction::UpdateProgress(_) => "UPDATE_PROGRESS",
            RunAction::SetStopping => "SET_STOPPING",
            RunAction::SetError { .. } => "SET_ERROR",
            RunAction::ClearError => "CLEAR_ERROR",
            RunAction::Complete => "COMPLETE",
        }
    }
}

/// Apply one action. Invalid transitions return the state unchanged.
pub fn reduce(state: BatchRunState, action: RunAction) -> BatchRunState {
    match action {
        RunAction::Start(start) => {
            if !state.phase.is_idle() {
                return state;
            }
            let (worktree_active, worktree_path, worktree_branch) = match start.worktree {
                Some(wt) => (wt.active, Some(wt.path), Some(wt.branch)),
                None => (false, None, None),
            };
            BatchRunState {
                phase: RunPhase::Initializing,
                documents: start.documents,
                total_tasks_across_all_docs: start.total_tasks,
                loop_enabled: start.loop_enabled,
                max_loops: start.max_loops,
                worktree_active,
                worktree_path,
                worktree_branch,
                started_at_ms: Some(start.started_at_ms),
                last_active_timestamp: Some(start.started_at_ms),
                ..BatchRunState::default()
            }
        }

        RunAction::SetRunning => match state.phase {
            RunPhase::Initializing => BatchRunState {
                phase: RunPhase::Running,
                ..state
            },
            _ => state,
        },

        RunAction::UpdateProgress(update) => {
            if state.phase.is_idle() {
                return state;
            }
            apply_progress(state, update)
        }

        RunAction::SetStopping => match state.phase {
            RunPhase::Running | RunPhase::ErrorPaused => BatchRunState {
                phase: RunPhase::Stopping,
                ..state
            },
            _ => state,
        },

        RunAction::SetError {
            error,
            document_index,
        } => match state.phase {
            RunPhase::Running => BatchRunState {
                phase: RunPhase::ErrorPaused,
                error: Some(error),
                error_document_index: Some(document_index),
                ..state
            },
            _ => state,
        },

        RunAction::ClearError => match state.phase {
            RunPhase::ErrorPaused => BatchRunState {
                phase: RunPhase::Running,
                error: None,
                error_document_index: None,
                ..state
            },
            RunPhase::Stopping => BatchRunState {
                error: None,
                error_document_index: None,
                ..state
            },
            _ => state,
        },

        RunAction::Complete => BatchRunState {
            phase: RunPhase::Completed,
            ..BatchRunState::default()
        },
    }
}

fn apply_progress(mut state: BatchRunState, update: ProgressUpdate) -> BatchRunState {
    if let Some(v) = update.current_document_index {
        state.current_document_index = v;
    }
    if let Some(v) = update.current_doc_tasks_total {
        state.current_doc_tasks_total = v;
    }
    if let Some(v) = update.current_doc_tasks_completed {
        state.current_doc_tasks_completed = v;
    }
    if let Some(v) = update.total_tasks_across_all_docs {
        state.total_tasks_across_all_docs = v;
    }
    if let Some(v) = update.loop_iteration {
        state.loop_iteration = v;
    }
    if let Some(v) = update.accumulated_elapsed_ms {
        state.accumulated_elapsed_ms = v;
    }
    if let Some(v) = update.last_active_timestamp {
        state.last_active_timestamp = Some(v);
    }
    if let Some(id) = update.agent_session_id {
        if !state.agent_session_ids.contains(&id) {
            state.agent_session_ids.push(id);
        }
    }
    if let Some(delta) = update.task_delta {
        state.completed_tasks_across_all_docs =
            state.completed_tasks_across_all_docs.saturating_add(delta.completed);
        let total = i64::from(state.total_tasks_across_all_docs) + delta.net_change;
        state.total_tasks_across_all_docs = total.clamp(0, i64::from(u32::MAX)) as u32;
        state.cumulative_task_time_ms =
            state.cumulative_task_time_ms.saturating_add(delta.task_time_ms);
    }
    // Totals never drop below what is already completed.
    if state.completed_tasks_across_all_docs > state.total_tasks_across_all_docs {
        state.total_tasks_across_all_docs = state.completed_tasks_across_all_docs;
    }
    if state.current_doc_tasks_completed > state.current_doc_tasks_total {
        state.current_doc_tasks_total = state.current_doc_tasks_completed;
    }
    state
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
