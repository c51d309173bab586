// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake version control adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{PrRequest, VcsAdapter, VcsError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Recorded call to FakeVcsAdapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    IsRepo { cwd: PathBuf },
    CurrentBranch { cwd: PathBuf },
    CreateWorktree { path: PathBuf, branch: String },
    RemoveWorktree { path: PathBuf },
    CreatePr { request: PrRequest },
}

/// Fake VCS that pretends every directory is a repository on `main`
#[derive(Clone)]
pub struct FakeVcsAdapter {
    inner: Arc<Mutex<FakeVcsState>>,
}

struct FakeVcsState {
    calls: Vec<VcsCall>,
    is_repo: bool,
    branch: String,
    worktree_error: Option<VcsError>,
    pr_error: Option<VcsError>,
    pr_url: String,
}

impl Default for FakeVcsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeVcsAdapter {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeVcsState {
                calls: Vec::new(),
                is_repo: true,
                branch: "main".to_string(),
                worktree_error: None,
                pr_error: None,
                pr_url: "https://github.com/example/repo/pull/1".to_string(),
            })),
        }
    }

    pub fn set_is_repo(&self, is_repo: bool) {
        self.inner.lock().is_repo = is_repo;
    }

    pub fn set_branch(&self, branch: impl Into<String>) {
        self.inner.lock().branch = branch.into();
    }

    /// Fail the next `create_worktree`
    pub fn set_worktree_error(&self, error: VcsError) {
        self.inner.lock().worktree_error = Some(error);
    }

    /// Fail the next `create_pr`
    pub fn set_pr_error(&self, error: VcsError) {
        self.inner.lock().pr_error = Some(error);
    }

    pub fn calls(&self) -> Vec<VcsCall> {
        self.inner.lock().calls.clone()
    }

    pub fn pr_requests(&self) -> Vec<PrRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                VcsCall::CreatePr { request } => Some(request),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl VcsAdapter for FakeVcsAdapter {
    async fn is_repo(&self, cwd: &Path) -> Result<bool, VcsError> {
        let mut inner = self.inner.lock();
        inner.calls.push(VcsCall::IsRepo {
            cwd: cwd.to_path_buf(),
        });
        Ok(inner.is_repo)
    }

    async fn current_branch(&self, cwd: &Path) -> Result<String, VcsError> {
        let mut inner = self.inner.lock();
        inner.calls.push(VcsCall::CurrentBranch {
            cwd: cwd.to_path_buf(),
        });
        if !inner.is_repo {
            return Err(VcsError::NotARepo(cwd.display().to_string()));
        }
        Ok(inner.branch.clone())
    }

    async fn create_worktree(
        &self,
        _repo: &Path,
        path: &Path,
        branch: &str,
    ) -> Result<(), VcsError> {
        let mut inner = self.inner.lock();
        inner.calls.push(VcsCall::CreateWorktree {
            path: path.to_path_buf(),
            branch: branch.to_string(),
        });
        match inner.worktree_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn remove_worktree(&self, _repo: &Path, path: &Path) -> Result<(), VcsError> {
        self.inner.lock().calls.push(VcsCall::RemoveWorktree {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    async fn create_pr(&self, _cwd: &Path, request: &PrRequest) -> Result<String, VcsError> {
        let mut inner = self.inner.lock();
        inner.calls.push(VcsCall::CreatePr {
            request: request.clone(),
        });
        match inner.pr_error.take() {
            Some(e) => Err(e),
            None => Ok(inner.pr_url.clone()),
        }
    }
}
