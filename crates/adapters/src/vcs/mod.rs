// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Version control adapters (repository queries, worktrees, pull requests)

mod git;

pub use git::GitAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeVcsAdapter, VcsCall};

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Errors from version control operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VcsError {
    #[error("not a git repository: {0}")]
    NotARepo(String),
    #[error("command failed: {0}")]
    CommandFailed(String),
}

/// Pull request to open from a worktree branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrRequest {
    pub head_branch: String,
    pub base_branch: String,
    pub title: String,
    pub body: String,
}

/// Adapter for version control operations
#[async_trait]
pub trait VcsAdapter: Clone + Send + Sync + 'static {
    /// Whether `cwd` is inside a repository
    async fn is_repo(&self, cwd: &Path) -> Result<bool, VcsError>;

    /// Branch checked out at `cwd`
    async fn current_branch(&self, cwd: &Path) -> Result<String, VcsError>;

    /// Create (or reuse) a worktree at `path` on `branch`
    async fn create_worktree(&self, repo: &Path, path: &Path, branch: &str)
        -> Result<(), VcsError>;

    /// Remove the worktree at `path`
    async fn remove_worktree(&self, repo: &Path, path: &Path) -> Result<(), VcsError>;

    /// Push the branch and open a pull request; returns its URL
    async fn create_pr(&self, cwd: &Path, request: &PrRequest) -> Result<String, VcsError>;
}
