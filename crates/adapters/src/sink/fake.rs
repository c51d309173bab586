// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory sinks for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{HistorySink, RunEndStat, RunStartStat, SinkError, StatsSink, TaskStat};
use async_trait::async_trait;
use autorun_core::{HistoryEntry, HistoryKind};
use parking_lot::Mutex;
use std::sync::Arc;

/// Collects history entries; can be made to fail every append
#[derive(Clone, Default)]
pub struct FakeHistorySink {
    inner: Arc<Mutex<(Vec<HistoryEntry>, bool)>>,
}

impl FakeHistorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().1 = failing;
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.inner.lock().0.clone()
    }

    pub fn entries_of(&self, kind: HistoryKind) -> Vec<HistoryEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.kind == kind)
            .collect()
    }
}

#[async_trait]
impl HistorySink for FakeHistorySink {
    async fn append(&self, entry: &HistoryEntry) -> Result<(), SinkError> {
        let mut inner = self.inner.lock();
        if inner.1 {
            return Err(SinkError::Unavailable("scripted".to_string()));
        }
        inner.0.push(entry.clone());
        Ok(())
    }
}

#[derive(Default)]
struct FakeStatsState {
    run_starts: Vec<RunStartStat>,
    tasks: Vec<TaskStat>,
    run_ends: Vec<RunEndStat>,
    failing: bool,
}

/// Collects stats records; can be made to fail every call
#[derive(Clone, Default)]
pub struct FakeStatsSink {
    inner: Arc<Mutex<FakeStatsState>>,
}

impl FakeStatsSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().failing = failing;
    }

    pub fn run_starts(&self) -> Vec<RunStartStat> {
        self.inner.lock().run_starts.clone()
    }

    pub fn tasks(&self) -> Vec<TaskStat> {
        self.inner.lock().tasks.clone()
    }

    pub fn run_ends(&self) -> Vec<RunEndStat> {
        self.inner.lock().run_ends.clone()
    }
}

fn check(failing: bool) -> Result<(), SinkError> {
    if failing {
        Err(SinkError::Unavailable("scripted".to_string()))
    } else {
        Ok(())
    }
}

#[async_trait]
impl StatsSink for FakeStatsSink {
    async fn record_run_start(&self, stat: &RunStartStat) -> Result<(), SinkError> {
        let mut inner = self.inner.lock();
        check(inner.failing)?;
        inner.run_starts.push(stat.clone());
        Ok(())
    }

    async fn record_task(&self, stat: &TaskStat) -> Result<(), SinkError> {
        let mut inner = self.inner.lock();
        check(inner.failing)?;
        inner.tasks.push(stat.clone());
        Ok(())
    }

    async fn record_run_end(&self, stat: &RunEndStat) -> Result<(), SinkError> {
        let mut inner = self.inner.lock();
        check(inner.failing)?;
        inner.run_ends.push(stat.clone());
        Ok(())
    }
}
