// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake agent adapter for deterministic testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{AgentAdapter, AgentAdapterError, AgentRequest, AgentResponse};
use async_trait::async_trait;
use autorun_core::SessionId;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Recorded call to FakeAgentAdapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCall {
    pub session_id: SessionId,
    pub prompt: String,
    pub cwd: Option<PathBuf>,
}

type Handler = Arc<dyn Fn(&AgentRequest) -> Result<AgentResponse, AgentAdapterError> + Send + Sync>;

/// Fake agent adapter for testing
///
/// Answers from a queue of scripted results first, then from the installed
/// handler, then with a generic success.
#[derive(Clone, Default)]
pub struct FakeAgentAdapter {
    inner: Arc<Mutex<FakeAgentState>>,
}

#[derive(Default)]
struct FakeAgentState {
    calls: Vec<AgentCall>,
    queued: VecDeque<Result<AgentResponse, AgentAdapterError>>,
    handler: Option<Handler>,
    delay: Option<Duration>,
}

impl FakeAgentAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute every unscripted response with `f`.
    ///
    /// The handler runs outside the adapter's lock, so it may touch other
    /// fakes (for example to check off a task in a fake document store).
    pub fn on_spawn<F>(&self, f: F)
    where
        F: Fn(&AgentRequest) -> Result<AgentResponse, AgentAdapterError> + Send + Sync + 'static,
    {
        self.inner.lock().handler = Some(Arc::new(f));
    }

    /// Queue a result for the next call
    pub fn push_result(&self, result: Result<AgentResponse, AgentAdapterError>) {
        self.inner.lock().queued.push_back(result);
    }

    /// Sleep this long (tokio time) inside every call
    pub fn set_delay(&self, delay: Duration) {
        self.inner.lock().delay = Some(delay);
    }

    pub fn calls(&self) -> Vec<AgentCall> {
        self.inner.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.lock().calls.len()
    }
}

#[async_trait]
impl AgentAdapter for FakeAgentAdapter {
    async fn spawn(&self, request: AgentRequest) -> Result<AgentResponse, AgentAdapterError> {
        let (queued, handler, delay) = {
            let mut inner = self.inner.lock();
            inner.calls.push(AgentCall {
                session_id: request.session_id.clone(),
                prompt: request.prompt.clone(),
                cwd: request.cwd.clone(),
            });
            (inner.queued.pop_front(), inner.handler.clone(), inner.delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match (queued, handler) {
            (Some(result), _) => result,
            (None, Some(handler)) => handler(&request),
            (None, None) => Ok(AgentResponse::ok("Done.")),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
