// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent adapter that shells out to a CLI agent

use super::{AgentAdapter, AgentAdapterError, AgentRequest, AgentResponse};
use crate::subprocess::{failure_text, run_with_input, SubprocessError};
use async_trait::async_trait;
use autorun_core::{AgentCommandConfig, UsageStats};
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

/// Runs a configured program with the prompt on stdin
#[derive(Clone, Debug)]
pub struct CommandAgentAdapter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    default_cwd: Option<PathBuf>,
}

impl CommandAgentAdapter {
    pub fn new(config: &AgentCommandConfig) -> Self {
        let timeout = config
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(crate::env::agent_timeout);
        Self {
            program: config.command.clone(),
            args: config.args.clone(),
            timeout,
            default_cwd: None,
        }
    }

    /// Directory used when a request carries no cwd override
    pub fn with_default_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.default_cwd = Some(cwd.into());
        self
    }
}

#[async_trait]
impl AgentAdapter for CommandAgentAdapter {
    async fn spawn(&self, request: AgentRequest) -> Result<AgentResponse, AgentAdapterError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .env("AUTORUN_SESSION_ID", request.session_id.as_str());
        if let Some(cwd) = request.cwd.as_ref().or(self.default_cwd.as_ref()) {
            cmd.current_dir(cwd);
        }

        let output = run_with_input(cmd, &request.prompt, self.timeout, &self.program)
            .await
            .map_err(|e| match e {
                SubprocessError::TimedOut { .. } => AgentAdapterError::TimedOut(e.to_string()),
                SubprocessError::Io { .. } => AgentAdapterError::SpawnFailed(e.to_string()),
            })?;

        if !output.status.success() {
            let text = failure_text(&output);
            tracing::warn!(
                program = %self.program,
                code = ?output.status.code(),
                "agent exited with failure"
            );
            let mut response = parse_agent_output(&String::from_utf8_lossy(&output.stdout));
            response.success = false;
            if response.response.as_deref().map_or(true, str::is_empty) {
                response.response = Some(text);
            }
            return Ok(response);
        }

        Ok(parse_agent_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Interpret agent stdout.
///
/// A JSON result object (`{"result": ..., "session_id": ..., "usage": {...},
/// "total_cost_usd": ..., "is_error": ...}`) is unpacked; anything else is
/// taken verbatim as the response text.
pub fn parse_agent_output(stdout: &str) -> AgentResponse {
    let trimmed = stdout.trim();
    let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return AgentResponse::ok(trimmed);
    };
    if !json.is_object() {
        return AgentResponse::ok(trimmed);
    }

    let response = json
        .get("result")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let agent_session_id = json
        .get("session_id")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let is_error = json
        .get("is_error")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    let count = |field: &str| -> u64 {
        json.get("usage")
            .and_then(|u| u.get(field))
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
    };
    let usage = UsageStats {
        input_tokens: count("input_tokens"),
        output_tokens: count("output_tokens"),
        cache_read_input_tokens: count("cache_read_input_tokens"),
        cache_creation_input_tokens: count("cache_creation_input_tokens"),
        total_cost_usd: json
            .get("total_cost_usd")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0),
    };

    AgentResponse {
        success: !is_error,
        response,
        agent_session_id,
        usage: (!usage.is_empty()).then_some(usage),
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
