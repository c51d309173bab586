// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git + GitHub CLI adapter

use super::{PrRequest, VcsAdapter, VcsError};
use crate::subprocess::{failure_text, run_with_timeout, PR_TIMEOUT};
use async_trait::async_trait;
use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Shells out to `git` and `gh`
#[derive(Clone, Debug)]
pub struct GitAdapter {
    timeout: Duration,
}

impl Default for GitAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl GitAdapter {
    pub fn new() -> Self {
        Self {
            timeout: crate::env::git_timeout(),
        }
    }

    fn git(dir: &Path) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(dir)
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE");
        cmd
    }

    async fn run(&self, cmd: Command, description: &str) -> Result<Output, VcsError> {
        run_with_timeout(cmd, self.timeout, description)
            .await
            .map_err(VcsError::CommandFailed)
    }

    async fn run_ok(&self, cmd: Command, description: &str) -> Result<String, VcsError> {
        let output = self.run(cmd, description).await?;
        if !output.status.success() {
            return Err(VcsError::CommandFailed(format!(
                "{}: {}",
                description,
                failure_text(&output)
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl VcsAdapter for GitAdapter {
    async fn is_repo(&self, cwd: &Path) -> Result<bool, VcsError> {
        let mut cmd = Self::git(cwd);
        cmd.args(["rev-parse", "--is-inside-work-tree"]);
        let output = self.run(cmd, "git rev-parse").await?;
        Ok(output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "true")
    }

    async fn current_branch(&self, cwd: &Path) -> Result<String, VcsError> {
        let mut cmd = Self::git(cwd);
        cmd.args(["rev-parse", "--abbrev-ref", "HEAD"]);
        let output = self.run(cmd, "git rev-parse --abbrev-ref").await?;
        if !output.status.success() {
            return Err(VcsError::NotARepo(cwd.display().to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn create_worktree(
        &self,
        repo: &Path,
        path: &Path,
        branch: &str,
    ) -> Result<(), VcsError> {
        // An existing checkout of the same branch is reused as-is
        if path.join(".git").exists() {
            let existing = self.current_branch(path).await?;
            if existing == branch {
                tracing::info!(path = %path.display(), branch, "reusing existing worktree");
                return Ok(());
            }
            return Err(VcsError::CommandFailed(format!(
                "{} already holds branch {}, expected {}",
                path.display(),
                existing,
                branch
            )));
        }

        let mut cmd = Self::git(repo);
        cmd.args(["worktree", "add", "-b", branch]).arg(path);
        let output = self.run(cmd, "git worktree add").await?;
        if output.status.success() {
            return Ok(());
        }

        // Branch already exists: check it out instead of creating it
        let mut cmd = Self::git(repo);
        cmd.args(["worktree", "add"]).arg(path).arg(branch);
        self.run_ok(cmd, "git worktree add").await.map(|_| ())
    }

    async fn remove_worktree(&self, repo: &Path, path: &Path) -> Result<(), VcsError> {
        let mut cmd = Self::git(repo);
        cmd.args(["worktree", "remove", "--force"]).arg(path);
        self.run_ok(cmd, "git worktree remove").await.map(|_| ())
    }

    async fn create_pr(&self, cwd: &Path, request: &PrRequest) -> Result<String, VcsError> {
        let mut push = Self::git(cwd);
        push.args(["push", "-u", "origin", &request.head_branch]);
        self.run_ok(push, "git push").await?;

        let mut gh = Command::new("gh");
        gh.current_dir(cwd).args([
            "pr",
            "create",
            "--head",
            &request.head_branch,
            "--base",
            &request.base_branch,
            "--title",
            &request.title,
            "--body",
            &request.body,
        ]);
        let output = run_with_timeout(gh, PR_TIMEOUT, "gh pr create")
            .await
            .map_err(VcsError::CommandFailed)?;
        if !output.status.success() {
            return Err(VcsError::CommandFailed(format!(
                "gh pr create: {}",
                failure_text(&output)
            )));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .rev()
            .find(|l| l.starts_with("http"))
            .unwrap_or_else(|| stdout.trim())
            .to_string())
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
