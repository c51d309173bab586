// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the run engine

use autorun_core::{ConfigError, SessionId};
use thiserror::Error;

/// Errors returned by [`crate::Engine`] operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid run config: {0}")]
    Config(#[from] ConfigError),
    #[error("session {0} already has an active run")]
    AlreadyRunning(SessionId),
    #[error("no unchecked tasks found in any document")]
    NoTasks,
    #[error("worktree setup failed: {0}")]
    Worktree(String),
    #[error("session {0} has no pending error")]
    NoPendingError(SessionId),
    #[error("session {0} has no active run")]
    NotRunning(SessionId),
    #[error("run task for session {session} ended abnormally: {message}")]
    RunAborted { session: SessionId, message: String },
}
