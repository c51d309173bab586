// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keep-awake backed by a long-lived inhibitor process

use super::{KeepAwake, KeepAwakeError};
use async_trait::async_trait;
use autorun_core::SessionId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::{Child, Command};

/// Holds one inhibitor child per session; releasing kills it
#[derive(Clone)]
pub struct CommandKeepAwake {
    program: String,
    args: Vec<String>,
    holds: Arc<Mutex<HashMap<SessionId, Child>>>,
}

impl CommandKeepAwake {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            holds: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// `caffeinate -i` on macOS, `systemd-inhibit … sleep infinity` elsewhere
    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            Self::new("caffeinate", vec!["-i".to_string()])
        } else {
            Self::new(
                "systemd-inhibit",
                [
                    "--what=idle:sleep",
                    "--who=autorun",
                    "--why=Auto Run in progress",
                    "sleep",
                    "infinity",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            )
        }
    }

    pub fn held_count(&self) -> usize {
        self.holds.lock().len()
    }
}

#[async_trait]
impl KeepAwake for CommandKeepAwake {
    async fn acquire(&self, session: &SessionId) -> Result<(), KeepAwakeError> {
        if self.holds.lock().contains_key(session) {
            return Ok(());
        }
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| KeepAwakeError::AcquireFailed(format!("{}: {}", self.program, e)))?;
        tracing::debug!(session_id = %session, program = %self.program, "keep-awake acquired");
        self.holds.lock().insert(session.clone(), child);
        Ok(())
    }

    async fn release(&self, session: &SessionId) -> Result<(), KeepAwakeError> {
        let child = self.holds.lock().remove(session);
        if let Some(mut child) = child {
            if let Err(e) = child.kill().await {
                tracing::warn!(session_id = %session, error = %e, "keep-awake process already gone");
            }
            tracing::debug!(session_id = %session, "keep-awake released");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
