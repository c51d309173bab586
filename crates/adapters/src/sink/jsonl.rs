// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-lines file sinks

use super::{HistorySink, RunEndStat, RunStartStat, SinkError, StatsSink, TaskStat};
use async_trait::async_trait;
use autorun_core::HistoryEntry;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Append one serialized record as a line, creating parent directories
async fn append_line<T: Serialize>(path: &Path, record: &T) -> Result<(), SinkError> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');
    let io_err = |source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(io_err)?;
    file.write_all(line.as_bytes()).await.map_err(io_err)?;
    file.flush().await.map_err(io_err)
}

/// History at `<dir>/history/<session>.jsonl`
#[derive(Clone, Debug)]
pub struct JsonlHistorySink {
    dir: PathBuf,
}

impl JsonlHistorySink {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: state_dir.into().join("history"),
        }
    }

    pub fn path_for(&self, session: &str) -> PathBuf {
        let safe: String = session
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => c,
                _ => '_',
            })
            .collect();
        self.dir.join(format!("{}.jsonl", safe))
    }
}

#[async_trait]
impl HistorySink for JsonlHistorySink {
    async fn append(&self, entry: &HistoryEntry) -> Result<(), SinkError> {
        append_line(&self.path_for(entry.session_id.as_str()), entry).await
    }
}

/// Tagged line written to the stats file
#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum StatsLine<'a> {
    RunStart(&'a RunStartStat),
    Task(&'a TaskStat),
    RunEnd(&'a RunEndStat),
}

/// Stats at `<dir>/stats.jsonl`
#[derive(Clone, Debug)]
pub struct JsonlStatsSink {
    path: PathBuf,
}

impl JsonlStatsSink {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: state_dir.into().join("stats.jsonl"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StatsSink for JsonlStatsSink {
    async fn record_run_start(&self, stat: &RunStartStat) -> Result<(), SinkError> {
        append_line(&self.path, &StatsLine::RunStart(stat)).await
    }

    async fn record_task(&self, stat: &TaskStat) -> Result<(), SinkError> {
        append_line(&self.path, &StatsLine::Task(stat)).await
    }

    async fn record_run_end(&self, stat: &RunEndStat) -> Result<(), SinkError> {
        append_line(&self.path, &StatsLine::RunEnd(stat)).await
    }
}

#[cfg(test)]
#[path = "jsonl_tests.rs"]
mod tests;
