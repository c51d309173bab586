// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One task run against one document.
//!
//! The processor expands templates, invokes the agent, re-reads the
//! document and reports the task delta. It never retries: a failed agent
//! call is reported back to the run loop, which decides what happens next.

use autorun_adapters::{AgentAdapter, AgentAdapterError, AgentRequest, DocumentStore};
use autorun_core::{
    count_tasks, expand_template, AgentError, AgentErrorKind, Clock, SessionId, TaskCounts,
    TaskDelta, UsageStats,
};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

/// Longest task summary kept for history records
pub const MAX_SUMMARY_CHARS: usize = 200;

/// Document text and its task counts at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocSnapshot {
    pub content: String,
    pub counts: TaskCounts,
}

impl DocSnapshot {
    pub fn new(content: String) -> Self {
        let counts = count_tasks(&content);
        Self { content, counts }
    }
}

/// Inputs for a single task run
pub struct TaskRequest<'a> {
    pub session: &'a SessionId,
    pub prompt_template: &'a str,
    pub folder: &'a Path,
    pub document: &'a str,
    /// Document state before this task
    pub prev: &'a DocSnapshot,
    /// Template variables for this task
    pub vars: &'a HashMap<String, String>,
    pub cwd: &'a Path,
}

#[derive(Debug, Clone)]
pub struct TaskResult {
    pub success: bool,
    pub response: Option<String>,
    pub error: Option<AgentError>,
    pub agent_session_id: Option<String>,
    pub usage: Option<UsageStats>,
    pub elapsed_ms: u64,
    /// `max(0, new_checked - prev_checked)`
    pub tasks_completed: u32,
    /// Newly appeared tasks, for display only
    pub tasks_added: u32,
    /// `(new_unchecked + new_checked) - (prev_unchecked + prev_checked)`
    pub net_change: i64,
    pub document_changed: bool,
    pub summary: String,
    pub after: DocSnapshot,
}

impl TaskResult {
    pub fn delta(&self) -> TaskDelta {
        TaskDelta {
            completed: self.tasks_completed,
            net_change: self.net_change,
            task_time_ms: self.elapsed_ms,
        }
    }
}

#[derive(Clone)]
pub struct DocumentProcessor<D, A, C> {
    docs: D,
    agent: A,
    clock: C,
}

impl<D, A, C> DocumentProcessor<D, A, C>
where
    D: DocumentStore,
    A: AgentAdapter,
    C: Clock,
{
    pub fn new(docs: D, agent: A, clock: C) -> Self {
        Self { docs, agent, clock }
    }

    /// Read a document and count its tasks; unreadable documents count as empty
    pub async fn read_and_count(&self, folder: &Path, document: &str) -> DocSnapshot {
        match self.docs.read_doc(folder, document).await {
            Ok(content) => DocSnapshot::new(content),
            Err(e) => {
                tracing::warn!(document, error = %e, "document unreadable, treating as empty");
                DocSnapshot::default()
            }
        }
    }

    /// Run the agent for one task and measure what changed
    pub async fn process_task(&self, req: TaskRequest<'_>) -> TaskResult {
        let prompt = expand_template(req.prompt_template, req.vars);
        // What the document holds on disk when the agent starts
        let mut baseline = req.prev.content.clone();
        let expanded = expand_template(&req.prev.content, req.vars);
        if expanded != req.prev.content {
            match self.docs.write_doc(req.folder, req.document, &expanded).await {
                Ok(()) => baseline = expanded,
                Err(e) => {
                    tracing::warn!(document = req.document, error = %e, "failed to persist expanded document");
                }
            }
        }

        let started = self.clock.now();
        let outcome = self
            .agent
            .spawn(AgentRequest {
                session_id: req.session.clone(),
                prompt,
                cwd: Some(req.cwd.to_path_buf()),
            })
            .await;
        let elapsed_ms = self.clock.now().saturating_duration_since(started).as_millis() as u64;

        let after = self.read_and_count(req.folder, req.document).await;
        let tasks_completed = after.counts.checked.saturating_sub(req.prev.counts.checked);
        let net_change = i64::from(after.counts.total()) - i64::from(req.prev.counts.total());
        let tasks_added = (i64::from(after.counts.unchecked) - i64::from(req.prev.counts.unchecked)
            + i64::from(tasks_completed))
        .clamp(0, i64::from(u32::MAX)) as u32;
        let document_changed = after.content != baseline;

        let now_ms = self.clock.epoch_ms();
        let (success, response, agent_session_id, usage, error) = match outcome {
            Ok(resp) => {
                let error = (!resp.success).then(|| {
                    let message = resp
                        .response
                        .clone()
                        .filter(|r| !r.trim().is_empty())
                        .unwrap_or_else(|| "agent reported failure".to_string());
                    AgentError::classify(message, now_ms)
                        .with_agent_session_id(resp.agent_session_id.clone())
                });
                (resp.success, resp.response, resp.agent_session_id, resp.usage, error)
            }
            Err(e) => {
                let kind = match e {
                    AgentAdapterError::TimedOut(_) => AgentErrorKind::TimedOut,
                    AgentAdapterError::SpawnFailed(_) => AgentErrorKind::ProcessFailed,
                };
                (false, None, None, None, Some(AgentError::new(kind, e.to_string(), now_ms)))
            }
        };

        let summary = extract_summary(response.as_deref(), success);
        TaskResult {
            success,
            response,
            error,
            agent_session_id,
            usage,
            elapsed_ms,
            tasks_completed,
            tasks_added,
            net_change,
            document_changed,
            summary,
            after,
        }
    }
}

#[allow(clippy::expect_used)]
static LINE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:>\s*)*(?:[-*+]\s+(?:\[[ xX]\]\s*)?|\d+[.)]\s+)?")
        .expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*|__|~~|`+|\*").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static SENTENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?[.!?])(?:\s|$)").expect("constant regex pattern is valid")
});

/// Short human summary of an agent response.
///
/// Uses the first sentence of the first prose paragraph, with markdown
/// markers removed, capped at [`MAX_SUMMARY_CHARS`].
pub fn extract_summary(response: Option<&str>, success: bool) -> String {
    response
        .and_then(first_prose_paragraph)
        .map(|para| {
            let sentence = SENTENCE
                .captures(&para)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or(para);
            truncate_chars(&sentence, MAX_SUMMARY_CHARS)
        })
        .unwrap_or_else(|| fallback_summary(success))
}

fn fallback_summary(success: bool) -> String {
    if success {
        "Task completed".to_string()
    } else {
        "Task failed".to_string()
    }
}

fn first_prose_paragraph(text: &str) -> Option<String> {
    let mut in_fence = false;
    let mut paragraph: Vec<String> = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }
        if in_fence || trimmed.starts_with('#') || trimmed.starts_with('|') {
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }
        if trimmed.is_empty() {
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }
        let plain = strip_markdown(trimmed);
        if plain.chars().any(char::is_alphanumeric) {
            paragraph.push(plain);
        }
    }
    (!paragraph.is_empty()).then(|| paragraph.join(" "))
}

fn strip_markdown(line: &str) -> String {
    let line = LINE_MARKER.replace(line, "");
    let line = LINK.replace_all(&line, "$1");
    EMPHASIS.replace_all(&line, "").trim().to_string()
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.truncate(out.trim_end().len());
    out.push_str("...");
    out
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
