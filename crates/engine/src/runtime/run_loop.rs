// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The run actor: passes over documents, tasks within a document, and the
//! exit sequence.

use super::summary::{loop_entry, run_entry, task_entry, LoopRecord};
use super::{Engine, RunOutcome, RunRequest};
use crate::gate::ErrorResolution;
use crate::processor::{DocSnapshot, DocumentProcessor, TaskRequest, TaskResult};
use crate::stall::{StallDetector, STALL_THRESHOLD};
use crate::worktree::{should_create_pr, WorktreeManager, WorktreeSetup};
use autorun_adapters::{
    AgentAdapter, DocumentStore, HistorySink, KeepAwake, RunEndStat, StatsSink, TaskStat,
    VcsAdapter,
};
use autorun_core::{
    reduce, reset_checkboxes, AgentError, BatchRunState, Clock, DocumentRef, HistoryEntry,
    HistoryEntryId, IdGen, LoopAggregate, ProgressUpdate, RunAction, RunStatus, RunSummary,
    SessionId, StalledDocument, TaskCounts, TemplateContext, UsageStats, UuidIdGen,
};
use std::collections::HashMap;
use tokio::sync::watch;

/// Tasks a document contributes to the upcoming pass.
///
/// Reset documents with nothing left open are replayed from a fresh copy in
/// loop mode, so their checked tasks count again.
pub(crate) fn pass_tasks(doc: &DocumentRef, counts: &TaskCounts, loop_enabled: bool) -> u32 {
    if counts.unchecked > 0 {
        counts.unchecked
    } else if doc.reset_on_completion && loop_enabled {
        counts.checked
    } else {
        0
    }
}

async fn stop_signal(rx: &mut watch::Receiver<bool>) -> bool {
    rx.wait_for(|stop| *stop).await.is_ok()
}

/// Lengths of the run-wide stall and note lists when a pass begins
#[derive(Debug, Clone, Copy)]
struct PassMarks {
    stalled: usize,
    notes: usize,
}

pub(crate) struct RunActor<D, A, V, K, H, S, C: Clock> {
    engine: Engine<D, A, V, K, H, S, C>,
    session: SessionId,
    request: RunRequest,
    setup: WorktreeSetup,
    worktrees: WorktreeManager<V>,
    processor: DocumentProcessor<D, A, C>,
    /// Local copy of the session state; every change is mirrored to the publisher
    state: BatchRunState,
    stop_rx: watch::Receiver<bool>,
    stopping: bool,
    stall: StallDetector,
    stalled: Vec<StalledDocument>,
    notes: Vec<String>,
    usage: UsageStats,
    tasks_attempted: u32,
    loops_completed: u32,
    ids: UuidIdGen,
}

impl<D, A, V, K, H, S, C> RunActor<D, A, V, K, H, S, C>
where
    D: DocumentStore,
    A: AgentAdapter,
    V: VcsAdapter,
    K: KeepAwake,
    H: HistorySink,
    S: StatsSink,
    C: Clock,
{
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        engine: Engine<D, A, V, K, H, S, C>,
        session: SessionId,
        request: RunRequest,
        setup: WorktreeSetup,
        worktrees: WorktreeManager<V>,
        processor: DocumentProcessor<D, A, C>,
        state: BatchRunState,
        stop_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            engine,
            session,
            request,
            setup,
            worktrees,
            processor,
            state,
            stop_rx,
            stopping: false,
            stall: StallDetector::new(),
            stalled: Vec::new(),
            notes: Vec::new(),
            usage: UsageStats::default(),
            tasks_attempted: 0,
            loops_completed: 0,
            ids: UuidIdGen,
        }
    }

    pub(super) async fn run(mut self) -> RunOutcome {
        loop {
            let mut aggregate = LoopAggregate::new(self.engine.clock.epoch_ms());
            let marks = PassMarks {
                stalled: self.stalled.len(),
                notes: self.notes.len(),
            };
            let attempted = self.run_pass(&mut aggregate).await;
            self.loops_completed += 1;
            if self.request.config.loop_enabled {
                self.record_loop(&aggregate, marks).await;
            }
            if !self.should_start_next_pass(attempted).await {
                break;
            }
            let total = self.next_pass_total().await;
            let loop_iteration = self.state.loop_iteration + 1;
            tracing::info!(loop_number = loop_iteration + 1, total, "starting next pass");
            self.apply(RunAction::UpdateProgress(ProgressUpdate {
                loop_iteration: Some(loop_iteration),
                total_tasks_across_all_docs: Some(total),
                ..Default::default()
            }));
        }
        self.finish().await
    }

    fn apply(&mut self, action: RunAction) {
        self.state = reduce(std::mem::take(&mut self.state), action.clone());
        self.engine.publisher.dispatch(&self.session, action);
    }

    fn begin_stopping(&mut self) {
        if !self.stopping {
            self.stopping = true;
            self.apply(RunAction::SetStopping);
        }
    }

    /// Observe a pending stop request; true once the run is stopping
    fn check_stop(&mut self) -> bool {
        let requested = *self.stop_rx.borrow();
        if requested {
            self.begin_stopping();
        }
        self.stopping
    }

    fn loop_number(&self) -> u32 {
        self.state.loop_iteration + 1
    }

    /// One pass over every document in order; returns task runs attempted
    async fn run_pass(&mut self, aggregate: &mut LoopAggregate) -> u32 {
        let documents = self.request.config.documents.clone();
        let mut attempted = 0;
        for (index, doc) in documents.iter().enumerate() {
            if self.check_stop() {
                break;
            }
            if self.stall.is_stalled(&doc.filename) {
                tracing::debug!(document = %doc.filename, "skipping stalled document");
                continue;
            }
            let Some(target) = self.prepare_target(doc).await else {
                continue;
            };
            attempted += self.process_document(index, doc, &target, aggregate).await;
        }
        attempted
    }

    /// Name of the document to work on this pass, or `None` to skip it
    async fn prepare_target(&mut self, doc: &DocumentRef) -> Option<String> {
        let folder = self.request.folder.clone();
        let original = self.processor.read_and_count(&folder, &doc.filename).await;
        if pass_tasks(doc, &original.counts, self.request.config.loop_enabled) == 0 {
            tracing::debug!(document = %doc.filename, "no unchecked tasks, skipping");
            return None;
        }
        if !doc.reset_on_completion {
            return Some(doc.filename.clone());
        }

        let copy = match self
            .engine
            .deps
            .docs
            .create_working_copy(&folder, &doc.filename, self.loop_number())
            .await
        {
            Ok(copy) => copy,
            Err(e) => {
                tracing::warn!(document = %doc.filename, error = %e, "failed to create working copy");
                self.notes
                    .push(format!("skipped {}: working copy failed: {}", doc.filename, e));
                return None;
            }
        };
        if !original.counts.has_pending() {
            let reset = reset_checkboxes(&original.content);
            if let Err(e) = self.engine.deps.docs.write_doc(&folder, &copy, &reset).await {
                tracing::warn!(document = %copy, error = %e, "failed to reset working copy");
                self.notes
                    .push(format!("skipped {}: reset failed: {}", doc.filename, e));
                return None;
            }
        }
        tracing::info!(document = %doc.filename, working_copy = %copy, "using working copy");
        Some(copy)
    }

    /// Inner loop over one document's tasks; returns task runs attempted
    async fn process_document(
        &mut self,
        index: usize,
        doc: &DocumentRef,
        target: &str,
        aggregate: &mut LoopAggregate,
    ) -> u32 {
        let folder = self.request.folder.clone();
        let prompt_template = self.request.config.prompt.clone();
        let mut snap = self.processor.read_and_count(&folder, target).await;
        self.apply(RunAction::UpdateProgress(ProgressUpdate {
            current_document_index: Some(index),
            current_doc_tasks_total: Some(snap.counts.total()),
            current_doc_tasks_completed: Some(snap.counts.checked),
            ..Default::default()
        }));

        let mut attempted = 0;
        let mut remaining = snap.counts.unchecked;
        while snap.counts.has_pending() && remaining > 0 {
            if self.check_stop() {
                break;
            }
            let vars = self.template_vars(target);
            let cwd = self.setup.effective_cwd.clone();
            let result = self
                .processor
                .process_task(TaskRequest {
                    session: &self.session,
                    prompt_template: &prompt_template,
                    folder: &folder,
                    document: target,
                    prev: &snap,
                    vars: &vars,
                    cwd: &cwd,
                })
                .await;
            attempted += 1;
            self.record_task(&doc.filename, &result, aggregate).await;
            snap = result.after.clone();

            if result.success {
                remaining = snap.counts.unchecked;
            } else {
                let error = result.error.clone().unwrap_or_else(|| {
                    AgentError::classify("agent reported failure", self.engine.clock.epoch_ms())
                });
                self.notes
                    .push(format!("agent error on {}: {}", doc.filename, error));
                if self.request.config.pause_on_error {
                    match self.await_resolution(index, error).await {
                        ErrorResolution::Resume => {
                            snap = self.processor.read_and_count(&folder, target).await;
                            remaining = snap.counts.unchecked;
                            continue;
                        }
                        ErrorResolution::SkipDocument => {
                            self.notes.push(format!("skipped {} after error", doc.filename));
                            break;
                        }
                        ErrorResolution::Abort => break,
                    }
                }
                remaining = remaining.saturating_sub(1);
            }

            if self
                .stall
                .record(&doc.filename, result.document_changed, result.tasks_completed)
            {
                self.mark_stalled(doc);
                break;
            }
        }
        attempted
    }

    fn mark_stalled(&mut self, doc: &DocumentRef) {
        let reason = format!(
            "no progress after {} consecutive attempts",
            STALL_THRESHOLD
        );
        tracing::warn!(document = %doc.filename, %reason, "document stalled");
        self.stalled.push(StalledDocument {
            document: doc.filename.clone(),
            reason,
        });
    }

    /// Pause on the error gate until the operator (or a stop) decides
    async fn await_resolution(&mut self, index: usize, error: AgentError) -> ErrorResolution {
        if self.check_stop() {
            return ErrorResolution::Abort;
        }
        tracing::warn!(document_index = index, error = %error, "run paused on agent error");
        // Open before publishing so anyone who sees ErrorPaused can resolve it
        let gate = self.engine.gate.open(&self.session);
        self.apply(RunAction::SetError {
            error,
            document_index: index,
        });

        let resolution = tokio::select! {
            resolved = gate => resolved.unwrap_or(ErrorResolution::Abort),
            true = stop_signal(&mut self.stop_rx) => ErrorResolution::Abort,
        };
        self.engine.gate.close(&self.session);
        tracing::info!(%resolution, "error gate resolved");

        if resolution == ErrorResolution::Abort {
            self.begin_stopping();
        }
        self.apply(RunAction::ClearError);
        resolution
    }

    fn template_vars(&self, document: &str) -> HashMap<String, String> {
        TemplateContext {
            session_id: self.session.to_string(),
            session_name: self
                .request
                .session_name
                .clone()
                .unwrap_or_else(|| self.session.to_string()),
            group: self.request.group.clone(),
            cwd: self.setup.effective_cwd.display().to_string(),
            git_branch: self.setup.git_branch(),
            folder_path: self.request.folder.display().to_string(),
            document_name: document.to_string(),
            loop_number: self.loop_number(),
            epoch_ms: self.engine.clock.epoch_ms(),
        }
        .vars()
    }

    fn next_id(&self) -> HistoryEntryId {
        HistoryEntryId::new(self.ids.next())
    }

    async fn append_history(&self, entry: HistoryEntry) {
        if let Err(e) = self.engine.deps.history.append(&entry).await {
            tracing::warn!(kind = ?entry.kind, error = %e, "failed to append history");
        }
    }

    /// Fold one task run into counters, history and stats
    async fn record_task(
        &mut self,
        document: &str,
        result: &TaskResult,
        aggregate: &mut LoopAggregate,
    ) {
        let now_ms = self.engine.clock.epoch_ms();
        let elapsed = self.engine.tracker.get_elapsed_time(&self.session);
        self.apply(RunAction::UpdateProgress(ProgressUpdate {
            current_doc_tasks_total: Some(result.after.counts.total()),
            current_doc_tasks_completed: Some(result.after.counts.checked),
            accumulated_elapsed_ms: Some(elapsed.as_millis() as u64),
            last_active_timestamp: Some(now_ms),
            task_delta: Some(result.delta()),
            agent_session_id: result.agent_session_id.clone(),
            ..Default::default()
        }));
        self.tasks_attempted += 1;
        if let Some(usage) = result.usage {
            self.usage += usage;
        }
        aggregate.record_task(result.tasks_completed, result.usage);

        tracing::info!(
            document,
            loop_number = self.loop_number(),
            success = result.success,
            tasks_completed = result.tasks_completed,
            net_change = result.net_change,
            elapsed_ms = result.elapsed_ms,
            "task finished"
        );

        let entry = task_entry(
            self.next_id(),
            &self.session,
            document,
            self.loop_number(),
            result,
            now_ms,
        );
        self.append_history(entry).await;

        let stat = TaskStat {
            session_id: self.session.clone(),
            timestamp_ms: now_ms,
            document: document.to_string(),
            elapsed_ms: result.elapsed_ms,
            success: result.success,
            usage: result.usage,
        };
        if let Err(e) = self.engine.deps.stats.record_task(&stat).await {
            tracing::warn!(error = %e, "failed to record task stat");
        }
    }

    /// Loop history covers only the stalls and notes raised during this pass
    async fn record_loop(&self, aggregate: &LoopAggregate, marks: PassMarks) {
        let now_ms = self.engine.clock.epoch_ms();
        let entry = loop_entry(
            self.next_id(),
            &self.session,
            LoopRecord {
                loop_number: self.loop_number(),
                aggregate,
                elapsed_ms: now_ms.saturating_sub(aggregate.started_at_ms),
                stalled: self.stalled.get(marks.stalled..).unwrap_or_default(),
                notes: self.notes.get(marks.notes..).unwrap_or_default(),
            },
            now_ms,
        );
        self.append_history(entry).await;
    }

    async fn should_start_next_pass(&mut self, attempted: u32) -> bool {
        if !self.request.config.loop_enabled || self.check_stop() {
            return false;
        }
        if attempted == 0 {
            tracing::info!("no task ran this pass, ending loop");
            return false;
        }
        if let Some(max) = self.request.config.max_loops {
            if self.state.loop_iteration + 1 >= max {
                tracing::info!(max_loops = max, "loop limit reached");
                return false;
            }
        }
        // Runs made only of reset documents are bounded by max_loops instead.
        if self.request.config.has_non_reset_documents() {
            let mut any_pending = false;
            for doc in self
                .request
                .config
                .documents
                .iter()
                .filter(|d| !d.reset_on_completion)
            {
                if self.stall.is_stalled(&doc.filename) {
                    continue;
                }
                let snap = self
                    .processor
                    .read_and_count(&self.request.folder, &doc.filename)
                    .await;
                any_pending |= snap.counts.has_pending();
            }
            if !any_pending {
                tracing::info!("all documents complete, ending loop");
                return false;
            }
        }
        true
    }

    /// Total for the next pass: what is done plus what the next pass will see
    async fn next_pass_total(&self) -> u32 {
        let config = &self.request.config;
        let mut remaining = 0u32;
        for doc in &config.documents {
            if self.stall.is_stalled(&doc.filename) {
                continue;
            }
            let snap: DocSnapshot = self
                .processor
                .read_and_count(&self.request.folder, &doc.filename)
                .await;
            remaining += pass_tasks(doc, &snap.counts, config.loop_enabled);
        }
        self.state.completed_tasks_across_all_docs + remaining
    }

    /// Exit sequence, run on every path out of the loop
    async fn finish(mut self) -> RunOutcome {
        let stopped = self.check_stop();
        let status = RunStatus::resolve(
            stopped,
            self.stalled.len(),
            self.request.config.documents.len(),
        );

        let mut summary = RunSummary {
            session_id: self.session.clone(),
            status,
            tasks_completed: self.state.completed_tasks_across_all_docs,
            tasks_attempted: self.tasks_attempted,
            loops_completed: self.loops_completed,
            elapsed_ms: self.engine.tracker.get_elapsed_time(&self.session).as_millis() as u64,
            task_time_ms: self.state.cumulative_task_time_ms,
            usage: self.usage,
            stalled_documents: self.stalled.clone(),
            notes: self.notes.clone(),
            pr_url: None,
        };

        if let Some(worktree) = self.request.config.worktree.clone() {
            if should_create_pr(
                self.setup.active,
                worktree.create_pr,
                stopped,
                summary.tasks_completed,
            ) {
                match self
                    .worktrees
                    .create_pr(&self.setup, &worktree, &summary.headline(), &summary.details())
                    .await
                {
                    Ok(url) => {
                        tracing::info!(url = %url, "pull request created");
                        summary.pr_url = Some(url);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "pull request failed");
                        summary.notes.push(format!("pull request failed: {}", e));
                    }
                }
            }
        }
        self.worktrees
            .cleanup(&self.setup, self.request.config.worktree.as_ref())
            .await;

        let elapsed = self.engine.tracker.stop_tracking(&self.session);
        summary.elapsed_ms = elapsed.as_millis() as u64;
        self.apply(RunAction::UpdateProgress(ProgressUpdate {
            accumulated_elapsed_ms: Some(summary.elapsed_ms),
            ..Default::default()
        }));

        let now_ms = self.engine.clock.epoch_ms();
        self.append_history(run_entry(self.next_id(), &summary, now_ms))
            .await;
        let stat = RunEndStat {
            session_id: self.session.clone(),
            timestamp_ms: now_ms,
            status,
            tasks_completed: summary.tasks_completed,
            elapsed_ms: summary.elapsed_ms,
            usage: summary.usage,
        };
        if let Err(e) = self.engine.deps.stats.record_run_end(&stat).await {
            tracing::warn!(error = %e, "failed to record run end");
        }

        let final_state = self.state.clone();
        self.engine.publisher.flush(&self.session);
        self.state = reduce(std::mem::take(&mut self.state), RunAction::Complete);
        self.engine
            .publisher
            .dispatch_immediate(&self.session, RunAction::Complete);

        if let Err(e) = self.engine.deps.keep_awake.release(&self.session).await {
            tracing::warn!(error = %e, "failed to release keep-awake");
        }
        self.engine.gate.close(&self.session);
        self.engine.runs.lock().remove(&self.session);

        tracing::info!(
            %status,
            tasks_completed = summary.tasks_completed,
            loops = summary.loops_completed,
            elapsed_ms = summary.elapsed_ms,
            "run finished"
        );
        RunOutcome {
            summary,
            final_state,
        }
    }
}
