// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worktree isolation for a run, plus the optional pull request at the end.

use crate::error::EngineError;
use autorun_adapters::{PrRequest, VcsAdapter, VcsError};
use autorun_core::{WorktreeConfig, WorktreeContext};
use std::path::{Path, PathBuf};

/// Where a run executes, resolved once at start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeSetup {
    /// Directory the agent runs in
    pub effective_cwd: PathBuf,
    pub active: bool,
    /// Checkout the worktree was created from
    pub repo: PathBuf,
    pub path: Option<PathBuf>,
    pub branch: Option<String>,
    /// Branch checked out in `repo` when the run started
    pub base_branch: Option<String>,
}

impl WorktreeSetup {
    fn inactive(base_cwd: &Path, base_branch: Option<String>) -> Self {
        Self {
            effective_cwd: base_cwd.to_path_buf(),
            active: false,
            repo: base_cwd.to_path_buf(),
            path: None,
            branch: None,
            base_branch,
        }
    }

    pub fn context(&self) -> Option<WorktreeContext> {
        match (&self.path, &self.branch) {
            (Some(path), Some(branch)) if self.active => Some(WorktreeContext {
                path: path.clone(),
                branch: branch.clone(),
                active: true,
            }),
            _ => None,
        }
    }

    /// Branch the agent works on (worktree branch, else the base checkout's)
    pub fn git_branch(&self) -> Option<String> {
        self.branch.clone().or_else(|| self.base_branch.clone())
    }
}

/// Pull requests are only opened for active worktrees of finished runs that did something
pub fn should_create_pr(
    worktree_active: bool,
    create_pr: bool,
    stopped: bool,
    tasks_completed: u32,
) -> bool {
    worktree_active && create_pr && !stopped && tasks_completed > 0
}

#[derive(Clone)]
pub struct WorktreeManager<V> {
    vcs: V,
}

impl<V: VcsAdapter> WorktreeManager<V> {
    pub fn new(vcs: V) -> Self {
        Self { vcs }
    }

    /// Resolve the run's working directory, creating the worktree if configured.
    ///
    /// Any failure here is fatal to the run.
    pub async fn setup_worktree(
        &self,
        base_cwd: &Path,
        config: Option<&WorktreeConfig>,
    ) -> Result<WorktreeSetup, EngineError> {
        let Some(config) = config else {
            let base_branch = match self.vcs.is_repo(base_cwd).await {
                Ok(true) => self.vcs.current_branch(base_cwd).await.ok(),
                _ => None,
            };
            return Ok(WorktreeSetup::inactive(base_cwd, base_branch));
        };

        match self.vcs.is_repo(base_cwd).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(EngineError::Worktree(format!(
                    "{} is not a git repository",
                    base_cwd.display()
                )))
            }
            Err(e) => return Err(EngineError::Worktree(e.to_string())),
        }
        let base_branch = self
            .vcs
            .current_branch(base_cwd)
            .await
            .map_err(|e| EngineError::Worktree(e.to_string()))?;
        self.vcs
            .create_worktree(base_cwd, &config.path, &config.branch)
            .await
            .map_err(|e| EngineError::Worktree(e.to_string()))?;

        tracing::info!(
            path = %config.path.display(),
            branch = %config.branch,
            base_branch = %base_branch,
            "run isolated in worktree"
        );
        Ok(WorktreeSetup {
            effective_cwd: config.path.clone(),
            active: true,
            repo: base_cwd.to_path_buf(),
            path: Some(config.path.clone()),
            branch: Some(config.branch.clone()),
            base_branch: Some(base_branch),
        })
    }

    /// Open a pull request from the worktree branch; returns its URL
    pub async fn create_pr(
        &self,
        setup: &WorktreeSetup,
        config: &WorktreeConfig,
        title: &str,
        body: &str,
    ) -> Result<String, VcsError> {
        let base_branch = config
            .pr_target_branch
            .clone()
            .or_else(|| setup.base_branch.clone())
            .unwrap_or_else(|| "main".to_string());
        let request = PrRequest {
            head_branch: config.branch.clone(),
            base_branch,
            title: title.to_string(),
            body: body.to_string(),
        };
        self.vcs.create_pr(&setup.effective_cwd, &request).await
    }

    /// Remove the worktree when configured to; failures are logged only
    pub async fn cleanup(&self, setup: &WorktreeSetup, config: Option<&WorktreeConfig>) {
        let Some(config) = config else { return };
        if !setup.active || !config.remove_on_completion {
            return;
        }
        let Some(path) = &setup.path else { return };
        if let Err(e) = self.vcs.remove_worktree(&setup.repo, path).await {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove worktree");
        }
    }
}

#[cfg(test)]
#[path = "worktree_tests.rs"]
mod tests;
