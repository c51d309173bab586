// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sinks that discard everything.

use super::{HistorySink, RunEndStat, RunStartStat, SinkError, StatsSink, TaskStat};
use async_trait::async_trait;
use autorun_core::HistoryEntry;

#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpHistorySink;

#[async_trait]
impl HistorySink for NoOpHistorySink {
    async fn append(&self, _entry: &HistoryEntry) -> Result<(), SinkError> {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpStatsSink;

#[async_trait]
impl StatsSink for NoOpStatsSink {
    async fn record_run_start(&self, _stat: &RunStartStat) -> Result<(), SinkError> {
        Ok(())
    }

    async fn record_task(&self, _stat: &TaskStat) -> Result<(), SinkError> {
        Ok(())
    }

    async fn record_run_end(&self, _stat: &RunEndStat) -> Result<(), SinkError> {
        Ok(())
    }
}
