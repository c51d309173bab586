// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent failure types and usage accounting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;

/// Categorized failure reasons for an agent invocation.
///
/// Carried in `BatchRunState::error` while a run is paused at the error gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentErrorKind {
    /// Invalid API key or authentication failure
    Unauthorized,
    /// Exceeded quota or billing issue
    OutOfCredits,
    /// Network connectivity issue
    NoInternet,
    /// Rate limited by API
    RateLimited,
    /// The agent did not answer within its timeout
    TimedOut,
    /// The agent process could not be started or exited abnormally
    ProcessFailed,
    /// Anything else
    Other,
}

/// A failed agent invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentError {
    pub kind: AgentErrorKind,
    pub message: String,
    /// Whether retrying the task may plausibly succeed
    pub recoverable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_session_id: Option<String>,
    pub timestamp_ms: u64,
}

impl AgentError {
    pub fn new(kind: AgentErrorKind, message: impl Into<String>, timestamp_ms: u64) -> Self {
        let recoverable = !matches!(
            kind,
            AgentErrorKind::Unauthorized | AgentErrorKind::OutOfCredits
        );
        Self {
            kind,
            message: message.into(),
            recoverable,
            agent_session_id: None,
            timestamp_ms,
        }
    }

    /// Categorize a failure from the agent's own error text
    pub fn classify(message: impl Into<String>, timestamp_ms: u64) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let kind = if contains_any(&lower, &["unauthorized", "invalid api key", "401", "authentication"]) {
            AgentErrorKind::Unauthorized
        } else if contains_any(&lower, &["credit balance", "quota", "billing", "insufficient"]) {
            AgentErrorKind::OutOfCredits
        } else if contains_any(&lower, &["rate limit", "429", "overloaded"]) {
            AgentErrorKind::RateLimited
        } else if contains_any(&lower, &["enotfound", "network", "connection refused", "offline"]) {
            AgentErrorKind::NoInternet
        } else if lower.contains("timed out") {
            AgentErrorKind::TimedOut
        } else {
            AgentErrorKind::Other
        };
        Self::new(kind, message, timestamp_ms)
    }

    pub fn with_agent_session_id(mut self, id: Option<String>) -> Self {
        self.agent_session_id = id;
        self
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

impl fmt::Display for AgentErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentErrorKind::Unauthorized => write!(f, "unauthorized"),
            AgentErrorKind::OutOfCredits => write!(f, "out of credits"),
            AgentErrorKind::NoInternet => write!(f, "no internet connection"),
            AgentErrorKind::RateLimited => write!(f, "rate limited"),
            AgentErrorKind::TimedOut => write!(f, "timed out"),
            AgentErrorKind::ProcessFailed => write!(f, "process failed"),
            AgentErrorKind::Other => write!(f, "error"),
        }
    }
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Token and cost usage reported by one or more agent invocations
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    pub input_tokens: u64,
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_read_input_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
    #[serde(default)]
    pub total_cost_usd: f64,
}

impl UsageStats {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens
            + self.output_tokens
            + self.cache_read_input_tokens
            + self.cache_creation_input_tokens
    }

    pub fn is_empty(&self) -> bool {
        self.total_tokens() == 0 && self.total_cost_usd == 0.0
    }
}

impl AddAssign for UsageStats {
    fn add_assign(&mut self, rhs: Self) {
        self.input_tokens += rhs.input_tokens;
        self.output_tokens += rhs.output_tokens;
        self.cache_read_input_tokens += rhs.cache_read_input_tokens;
        self.cache_creation_input_tokens += rhs.cache_creation_input_tokens;
        self.total_cost_usd += rhs.total_cost_usd;
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
