// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent invocation adapters
//!
//! One call to [`AgentAdapter::spawn`] runs the external agent once, to
//! completion, against a single prompt. The call is slow, billed, and
//! opaque: the engine only sees the response text, the agent's own
//! session id, and usage.

mod command;

pub use command::{parse_agent_output, CommandAgentAdapter};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{AgentCall, FakeAgentAdapter};

use async_trait::async_trait;
use autorun_core::{SessionId, UsageStats};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from agent operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentAdapterError {
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("{0}")]
    TimedOut(String),
}

/// One agent invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRequest {
    pub session_id: SessionId,
    pub prompt: String,
    /// Working directory override (worktree path when one is active)
    pub cwd: Option<PathBuf>,
}

/// Result of a completed invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentResponse {
    pub success: bool,
    pub response: Option<String>,
    pub agent_session_id: Option<String>,
    pub usage: Option<UsageStats>,
}

impl AgentResponse {
    pub fn ok(response: impl Into<String>) -> Self {
        Self {
            success: true,
            response: Some(response.into()),
            ..Default::default()
        }
    }

    pub fn failed(response: impl Into<String>) -> Self {
        Self {
            success: false,
            response: Some(response.into()),
            ..Default::default()
        }
    }
}

/// Adapter for invoking the external agent
#[async_trait]
pub trait AgentAdapter: Clone + Send + Sync + 'static {
    /// Run the agent once and wait for it to finish.
    ///
    /// `Err` means the agent could not be run at all; an agent that ran and
    /// reported failure returns `Ok` with `success = false`.
    async fn spawn(&self, request: AgentRequest) -> Result<AgentResponse, AgentAdapterError>;
}
