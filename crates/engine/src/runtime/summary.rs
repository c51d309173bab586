// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! History records for tasks, loops and whole runs

use crate::processor::TaskResult;
use autorun_core::{
    format_duration_ms, HistoryEntry, HistoryEntryId, HistoryKind, LoopAggregate, RunStatus,
    RunSummary, SessionId, StalledDocument,
};

pub(super) fn task_entry(
    id: HistoryEntryId,
    session: &SessionId,
    document: &str,
    loop_number: u32,
    result: &TaskResult,
    timestamp_ms: u64,
) -> HistoryEntry {
    HistoryEntry {
        id,
        session_id: session.clone(),
        kind: HistoryKind::Task,
        timestamp_ms,
        summary: result.summary.clone(),
        details: result.response.clone(),
        success: result.success,
        elapsed_ms: result.elapsed_ms,
        usage: result.usage,
        document: Some(document.to_string()),
        loop_number,
        agent_session_id: result.agent_session_id.clone(),
        status: None,
    }
}

/// Markdown body for one finished pass
pub(super) fn loop_details(
    aggregate: &LoopAggregate,
    elapsed_ms: u64,
    stalled: &[StalledDocument],
    notes: &[String],
) -> String {
    let mut lines = vec![
        format!(
            "**Tasks:** {} completed ({} attempted)",
            aggregate.tasks_completed, aggregate.tasks_attempted
        ),
        format!("**Elapsed:** {}", format_duration_ms(elapsed_ms)),
    ];
    if !aggregate.usage.is_empty() {
        lines.push(format!(
            "**Tokens:** {} in / {} out",
            aggregate.usage.input_tokens, aggregate.usage.output_tokens
        ));
        lines.push(format!("**Cost:** ${:.4}", aggregate.usage.total_cost_usd));
    }
    if !stalled.is_empty() {
        lines.push(String::new());
        lines.push("**Stalled documents:**".to_string());
        lines.extend(stalled.iter().map(|s| format!("- {}: {}", s.document, s.reason)));
    }
    if !notes.is_empty() {
        lines.push(String::new());
        lines.push("**Notes:**".to_string());
        lines.extend(notes.iter().map(|n| format!("- {}", n)));
    }
    lines.join("\n")
}

pub(super) struct LoopRecord<'a> {
    pub loop_number: u32,
    pub aggregate: &'a LoopAggregate,
    pub elapsed_ms: u64,
    pub stalled: &'a [StalledDocument],
    pub notes: &'a [String],
}

pub(super) fn loop_entry(
    id: HistoryEntryId,
    session: &SessionId,
    record: LoopRecord<'_>,
    timestamp_ms: u64,
) -> HistoryEntry {
    let tasks = record.aggregate.tasks_completed;
    HistoryEntry {
        id,
        session_id: session.clone(),
        kind: HistoryKind::Loop,
        timestamp_ms,
        summary: format!(
            "Loop {} completed: {} task{} in {}",
            record.loop_number,
            tasks,
            if tasks == 1 { "" } else { "s" },
            format_duration_ms(record.elapsed_ms)
        ),
        details: Some(loop_details(
            record.aggregate,
            record.elapsed_ms,
            record.stalled,
            record.notes,
        )),
        success: true,
        elapsed_ms: record.elapsed_ms,
        usage: Some(record.aggregate.usage),
        document: None,
        loop_number: record.loop_number,
        agent_session_id: None,
        status: None,
    }
}

pub(super) fn run_entry(id: HistoryEntryId, summary: &RunSummary, timestamp_ms: u64) -> HistoryEntry {
    HistoryEntry {
        id,
        session_id: summary.session_id.clone(),
        kind: HistoryKind::Run,
        timestamp_ms,
        summary: summary.headline(),
        details: Some(summary.details()),
        success: matches!(
            summary.status,
            RunStatus::Completed | RunStatus::CompletedWithStalls
        ),
        elapsed_ms: summary.elapsed_ms,
        usage: Some(summary.usage),
        document: None,
        loop_number: summary.loops_completed,
        agent_session_id: None,
        status: Some(summary.status),
    }
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod tests;
