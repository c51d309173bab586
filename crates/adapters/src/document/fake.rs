// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory document store for deterministic testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{validate_name, working_copy_stem, DocumentError, DocumentStore, RUNS_DIR};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Recorded call to FakeDocumentStore
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentCall {
    Read { name: String },
    Write { name: String, content: String },
    CreateWorkingCopy { name: String, loop_number: u32 },
    List,
}

/// Fake document store keyed by `(folder, name)`
///
/// Clones share state, so a test (or a fake agent) can edit documents
/// while the engine reads them.
#[derive(Clone, Default)]
pub struct FakeDocumentStore {
    inner: Arc<Mutex<FakeDocumentState>>,
}

#[derive(Default)]
struct FakeDocumentState {
    docs: BTreeMap<(PathBuf, String), String>,
    calls: Vec<DocumentCall>,
    read_errors: BTreeMap<String, u32>,
    write_errors: BTreeMap<String, u32>,
    copy_counter: u32,
}

impl FakeDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replace a document without recording a call
    pub fn set_doc(&self, folder: &Path, name: &str, content: impl Into<String>) {
        self.inner
            .lock()
            .docs
            .insert((folder.to_path_buf(), name.to_string()), content.into());
    }

    /// Current document text, if present
    pub fn doc(&self, folder: &Path, name: &str) -> Option<String> {
        self.inner
            .lock()
            .docs
            .get(&(folder.to_path_buf(), name.to_string()))
            .cloned()
    }

    /// Names of all working copies created under `folder`
    pub fn working_copies(&self, folder: &Path) -> Vec<String> {
        let prefix = format!("{}/", RUNS_DIR);
        self.inner
            .lock()
            .docs
            .keys()
            .filter(|(f, n)| f == folder && n.starts_with(&prefix))
            .map(|(_, n)| n.clone())
            .collect()
    }

    /// Fail the next `count` reads of `name`
    pub fn fail_reads(&self, name: &str, count: u32) {
        self.inner.lock().read_errors.insert(name.to_string(), count);
    }

    /// Fail the next `count` writes of `name`
    pub fn fail_writes(&self, name: &str, count: u32) {
        self.inner.lock().write_errors.insert(name.to_string(), count);
    }

    pub fn calls(&self) -> Vec<DocumentCall> {
        self.inner.lock().calls.clone()
    }

    /// Number of writes to `name`
    pub fn write_count(&self, name: &str) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, DocumentCall::Write { name: n, .. } if n == name))
            .count()
    }
}

#[async_trait]
impl DocumentStore for FakeDocumentStore {
    async fn read_doc(&self, folder: &Path, name: &str) -> Result<String, DocumentError> {
        validate_name(name)?;
        let mut inner = self.inner.lock();
        inner.calls.push(DocumentCall::Read {
            name: name.to_string(),
        });
        if let Some(remaining) = inner.read_errors.get_mut(name) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DocumentError::Io {
                    path: folder.join(name),
                    source: std::io::Error::other("scripted read failure"),
                });
            }
        }
        inner
            .docs
            .get(&(folder.to_path_buf(), name.to_string()))
            .cloned()
            .ok_or_else(|| DocumentError::NotFound(folder.join(format!("{}.md", name))))
    }

    async fn write_doc(
        &self,
        folder: &Path,
        name: &str,
        content: &str,
    ) -> Result<(), DocumentError> {
        validate_name(name)?;
        let mut inner = self.inner.lock();
        inner.calls.push(DocumentCall::Write {
            name: name.to_string(),
            content: content.to_string(),
        });
        if let Some(remaining) = inner.write_errors.get_mut(name) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DocumentError::Io {
                    path: folder.join(name),
                    source: std::io::Error::other("scripted write failure"),
                });
            }
        }
        inner
            .docs
            .insert((folder.to_path_buf(), name.to_string()), content.to_string());
        Ok(())
    }

    async fn create_working_copy(
        &self,
        folder: &Path,
        name: &str,
        loop_number: u32,
    ) -> Result<String, DocumentError> {
        validate_name(name)?;
        let mut inner = self.inner.lock();
        inner.calls.push(DocumentCall::CreateWorkingCopy {
            name: name.to_string(),
            loop_number,
        });
        let content = inner
            .docs
            .get(&(folder.to_path_buf(), name.to_string()))
            .cloned()
            .ok_or_else(|| DocumentError::NotFound(folder.join(format!("{}.md", name))))?;
        inner.copy_counter += 1;
        let stamp = format!("20260101-000000-{:03}", inner.copy_counter);
        let copy = format!(
            "{}/{}",
            RUNS_DIR,
            working_copy_stem(name, &stamp, loop_number)
        );
        inner.docs.insert((folder.to_path_buf(), copy.clone()), content);
        Ok(copy)
    }

    async fn list_docs(&self, folder: &Path) -> Result<Vec<String>, DocumentError> {
        let prefix = format!("{}/", RUNS_DIR);
        let mut inner = self.inner.lock();
        inner.calls.push(DocumentCall::List);
        Ok(inner
            .docs
            .keys()
            .filter(|(f, n)| f == folder && !n.starts_with(&prefix))
            .map(|(_, n)| n.clone())
            .collect())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
