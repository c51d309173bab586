// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error-resolution rendezvous between a paused run and its operator.

use crate::error::EngineError;
use autorun_core::SessionId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::oneshot;

/// Operator decision for a paused run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorResolution {
    /// Retry the failed task
    Resume,
    /// Leave the current document and move to the next one
    SkipDocument,
    /// Stop the whole run
    Abort,
}

impl fmt::Display for ErrorResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorResolution::Resume => "resume",
            ErrorResolution::SkipDocument => "skip-document",
            ErrorResolution::Abort => "abort",
        };
        write!(f, "{}", s)
    }
}

/// One pending gate per session; resolving consumes it.
#[derive(Default)]
pub struct ErrorGate {
    pending: Mutex<HashMap<SessionId, oneshot::Sender<ErrorResolution>>>,
}

impl ErrorGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a gate for `session`, replacing (and dropping) any older one
    pub fn open(&self, session: &SessionId) -> oneshot::Receiver<ErrorResolution> {
        let (tx, rx) = oneshot::channel();
        if self.pending.lock().insert(session.clone(), tx).is_some() {
            tracing::debug!(session_id = %session, "replaced stale error gate");
        }
        rx
    }

    /// Resolve the pending gate exactly once
    pub fn resolve(
        &self,
        session: &SessionId,
        resolution: ErrorResolution,
    ) -> Result<(), EngineError> {
        let tx = self
            .pending
            .lock()
            .remove(session)
            .ok_or_else(|| EngineError::NoPendingError(session.clone()))?;
        // A dropped receiver means the run already ended; nothing left to resolve.
        tx.send(resolution)
            .map_err(|_| EngineError::NoPendingError(session.clone()))
    }

    pub fn is_pending(&self, session: &SessionId) -> bool {
        self.pending.lock().contains_key(session)
    }

    /// Drop any gate left for `session`
    pub fn close(&self, session: &SessionId) {
        self.pending.lock().remove(session);
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
