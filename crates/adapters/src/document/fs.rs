// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem document store

use super::{validate_name, working_copy_stem, DocumentError, DocumentStore, RUNS_DIR};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Stores documents as markdown files on disk
#[derive(Clone, Debug, Default)]
pub struct FsDocumentStore;

impl FsDocumentStore {
    pub fn new() -> Self {
        Self
    }

    fn doc_path(folder: &Path, name: &str) -> Result<PathBuf, DocumentError> {
        validate_name(name)?;
        Ok(folder.join(format!("{}.md", name)))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> DocumentError {
    if source.kind() == std::io::ErrorKind::NotFound {
        DocumentError::NotFound(path.to_path_buf())
    } else {
        DocumentError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn read_doc(&self, folder: &Path, name: &str) -> Result<String, DocumentError> {
        let path = Self::doc_path(folder, name)?;
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| io_error(&path, e))
    }

    async fn write_doc(
        &self,
        folder: &Path,
        name: &str,
        content: &str,
    ) -> Result<(), DocumentError> {
        let path = Self::doc_path(folder, name)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| io_error(&path, e))
    }

    async fn create_working_copy(
        &self,
        folder: &Path,
        name: &str,
        loop_number: u32,
    ) -> Result<String, DocumentError> {
        let content = self.read_doc(folder, name).await?;

        let runs = folder.join(RUNS_DIR);
        tokio::fs::create_dir_all(&runs)
            .await
            .map_err(|e| io_error(&runs, e))?;

        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S-%3f").to_string();
        let base = working_copy_stem(name, &stamp, loop_number);

        // create_new makes the name claim atomic; bump a suffix on collision
        let mut attempt = 0u32;
        loop {
            let stem = if attempt == 0 {
                base.clone()
            } else {
                format!("{}-{}", base, attempt)
            };
            let path = runs.join(format!("{}.md", stem));
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;
            match opened {
                Ok(mut file) => {
                    use tokio::io::AsyncWriteExt;
                    file.write_all(content.as_bytes())
                        .await
                        .map_err(|e| io_error(&path, e))?;
                    file.flush().await.map_err(|e| io_error(&path, e))?;
                    tracing::debug!(document = name, copy = %path.display(), "created working copy");
                    return Ok(format!("{}/{}", RUNS_DIR, stem));
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(io_error(&path, e)),
            }
        }
    }

    async fn list_docs(&self, folder: &Path) -> Result<Vec<String>, DocumentError> {
        let mut names = Vec::new();
        collect_docs(folder, folder, &mut names).await?;
        names.sort();
        Ok(names)
    }
}

/// Walk `dir` recursively, skipping the top-level `Runs` directory
async fn collect_docs(
    root: &Path,
    dir: &Path,
    names: &mut Vec<String>,
) -> Result<(), DocumentError> {
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&current)
            .await
            .map_err(|e| io_error(&current, e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(&current, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| io_error(&path, e))?;
            if file_type.is_dir() {
                let is_runs = current == root && entry.file_name() == RUNS_DIR;
                if !is_runs {
                    pending.push(path);
                }
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let Ok(relative) = path.with_extension("").strip_prefix(root).map(Path::to_path_buf)
            else {
                continue;
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            names.push(name);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
