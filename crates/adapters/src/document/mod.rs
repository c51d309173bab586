// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task document storage
//!
//! Documents are addressed by folder plus a name without the `.md`
//! extension. Working copies live under `<folder>/Runs/` and are
//! addressed the same way (`Runs/<copy-name>`).

mod fs;

pub use fs::FsDocumentStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{DocumentCall, FakeDocumentStore};

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Subdirectory holding working copies
pub const RUNS_DIR: &str = "Runs";

/// Errors from document operations
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document not found: {0}")]
    NotFound(PathBuf),
    #[error("invalid document name: {0}")]
    InvalidName(String),
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Adapter for reading and writing task documents
#[async_trait]
pub trait DocumentStore: Clone + Send + Sync + 'static {
    /// Full text of `<folder>/<name>.md`
    async fn read_doc(&self, folder: &Path, name: &str) -> Result<String, DocumentError>;

    /// Replace the full text of `<folder>/<name>.md`
    async fn write_doc(&self, folder: &Path, name: &str, content: &str)
        -> Result<(), DocumentError>;

    /// Copy a document into `Runs/` and return the copy's folder-relative name.
    ///
    /// Every call yields a distinct copy.
    async fn create_working_copy(
        &self,
        folder: &Path,
        name: &str,
        loop_number: u32,
    ) -> Result<String, DocumentError>;

    /// Document names in `folder`, sorted, excluding working copies
    async fn list_docs(&self, folder: &Path) -> Result<Vec<String>, DocumentError>;
}

/// Reject names that would escape the folder
pub(crate) fn validate_name(name: &str) -> Result<(), DocumentError> {
    let bad = name.is_empty()
        || name.starts_with('/')
        || name.split('/').any(|part| part.is_empty() || part == "..");
    if bad {
        return Err(DocumentError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Base name for a working copy: `<stem>-<YYYYMMDD-HHMMSS-mmm>-loop-<n>`
pub(crate) fn working_copy_stem(name: &str, stamp: &str, loop_number: u32) -> String {
    let stem = name.rsplit('/').next().unwrap_or(name);
    format!("{}-{}-loop-{}", stem, stamp, loop_number)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
