// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::agent::{AgentAdapter, AgentAdapterError, AgentRequest, AgentResponse};
use crate::vcs::{PrRequest, VcsAdapter, VcsError};
use async_trait::async_trait;
use std::path::Path;
use tracing::Instrument;

/// Wrapper that adds tracing to any AgentAdapter
#[derive(Clone)]
pub struct TracedAgent<A> {
    inner: A,
}

impl<A> TracedAgent<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<A: AgentAdapter> AgentAdapter for TracedAgent<A> {
    async fn spawn(&self, request: AgentRequest) -> Result<AgentResponse, AgentAdapterError> {
        let span = tracing::info_span!(
            "agent.spawn",
            session_id = %request.session_id,
            cwd = ?request.cwd,
        );
        async {
            tracing::info!(prompt_len = request.prompt.len(), "starting");
            let start = std::time::Instant::now();
            let result = self.inner.spawn(request).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(r) => tracing::info!(
                    elapsed_ms,
                    success = r.success,
                    agent_session_id = r.agent_session_id.as_deref().unwrap_or(""),
                    "agent finished"
                ),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "agent spawn failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any VcsAdapter
#[derive(Clone)]
pub struct TracedVcs<V> {
    inner: V,
}

impl<V> TracedVcs<V> {
    pub fn new(inner: V) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<V: VcsAdapter> VcsAdapter for TracedVcs<V> {
    async fn is_repo(&self, cwd: &Path) -> Result<bool, VcsError> {
        let result = self.inner.is_repo(cwd).await;
        tracing::debug!(cwd = %cwd.display(), is_repo = ?result.as_ref().ok(), "checked repo");
        result
    }

    async fn current_branch(&self, cwd: &Path) -> Result<String, VcsError> {
        let result = self.inner.current_branch(cwd).await;
        if let Err(ref e) = result {
            tracing::warn!(cwd = %cwd.display(), error = %e, "branch lookup failed");
        }
        result
    }

    async fn create_worktree(
        &self,
        repo: &Path,
        path: &Path,
        branch: &str,
    ) -> Result<(), VcsError> {
        async {
            let start = std::time::Instant::now();
            let result = self.inner.create_worktree(repo, path, branch).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "worktree ready"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "worktree setup failed"),
            }
            result
        }
        .instrument(tracing::info_span!("vcs.worktree_add", path = %path.display(), branch))
        .await
    }

    async fn remove_worktree(&self, repo: &Path, path: &Path) -> Result<(), VcsError> {
        let result = self.inner.remove_worktree(repo, path).await;
        tracing::info_span!("vcs.worktree_remove", path = %path.display()).in_scope(|| {
            match &result {
                Ok(()) => tracing::info!("removed"),
                Err(e) => tracing::warn!(error = %e, "remove failed"),
            }
        });
        result
    }

    async fn create_pr(&self, cwd: &Path, request: &PrRequest) -> Result<String, VcsError> {
        async {
            let start = std::time::Instant::now();
            let result = self.inner.create_pr(cwd, request).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(url) => tracing::info!(elapsed_ms, url = url.as_str(), "pull request created"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "pull request failed"),
            }
            result
        }
        .instrument(tracing::info_span!(
            "vcs.create_pr",
            head = request.head_branch.as_str(),
            base = request.base_branch.as_str()
        ))
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
