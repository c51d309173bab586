// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-session run engine.
//!
//! Each run is an actor: one tokio task owns the session's `BatchRunState`
//! and mirrors every action to the [`StatePublisher`]. The engine itself
//! only holds the registry of active runs (for stop requests), the shared
//! error gate and the time tracker.

mod run_loop;
mod summary;

use crate::env;
use crate::error::EngineError;
use crate::gate::{ErrorGate, ErrorResolution};
use crate::processor::DocumentProcessor;
use crate::publisher::StatePublisher;
use crate::time_tracker::TimeTracker;
use crate::worktree::WorktreeManager;
use autorun_adapters::{
    AgentAdapter, DocumentStore, HistorySink, KeepAwake, RunStartStat, StatsSink, VcsAdapter,
};
use autorun_core::{
    reduce, ActivitySource, BatchRunState, Clock, ProgressUpdate, RunAction, RunConfig, RunStart,
    RunSummary, SessionId,
};
use parking_lot::Mutex;
use run_loop::RunActor;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;

pub(crate) use run_loop::pass_tasks;

/// External collaborators used by every run
#[derive(Clone)]
pub struct EngineDeps<D, A, V, K, H, S> {
    pub docs: D,
    pub agent: A,
    pub vcs: V,
    pub keep_awake: K,
    pub history: H,
    pub stats: S,
}

/// Engine tuning
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Coalescing window for published progress updates
    pub debounce: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce: env::debounce_window(),
        }
    }
}

/// Everything needed to start one run
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub config: RunConfig,
    /// Folder holding the task documents
    pub folder: PathBuf,
    /// Working directory for the agent when no worktree is configured
    pub cwd: PathBuf,
    pub session_name: Option<String>,
    pub group: Option<String>,
}

/// Result of a finished run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub summary: RunSummary,
    /// State just before `COMPLETE` reset it
    pub final_state: BatchRunState,
}

/// Handle to a spawned run
#[derive(Debug)]
pub struct RunHandle {
    session: SessionId,
    join: JoinHandle<RunOutcome>,
}

impl RunHandle {
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the run to end
    pub async fn wait(self) -> Result<RunOutcome, EngineError> {
        self.join.await.map_err(|e| EngineError::RunAborted {
            session: self.session,
            message: e.to_string(),
        })
    }
}

/// Drives autonomous runs, at most one per session
pub struct Engine<D, A, V, K, H, S, C: Clock> {
    pub(crate) deps: EngineDeps<D, A, V, K, H, S>,
    pub(crate) clock: C,
    pub(crate) publisher: StatePublisher,
    pub(crate) tracker: Arc<TimeTracker<C>>,
    pub(crate) gate: Arc<ErrorGate>,
    pub(crate) runs: Arc<Mutex<HashMap<SessionId, watch::Sender<bool>>>>,
}

impl<D, A, V, K, H, S, C> Clone for Engine<D, A, V, K, H, S, C>
where
    D: Clone,
    A: Clone,
    V: Clone,
    K: Clone,
    H: Clone,
    S: Clone,
    C: Clock,
{
    fn clone(&self) -> Self {
        Self {
            deps: self.deps.clone(),
            clock: self.clock.clone(),
            publisher: self.publisher.clone(),
            tracker: Arc::clone(&self.tracker),
            gate: Arc::clone(&self.gate),
            runs: Arc::clone(&self.runs),
        }
    }
}

impl<D, A, V, K, H, S, C> Engine<D, A, V, K, H, S, C>
where
    D: DocumentStore,
    A: AgentAdapter,
    V: VcsAdapter,
    K: KeepAwake,
    H: HistorySink,
    S: StatsSink,
    C: Clock,
{
    pub fn new(deps: EngineDeps<D, A, V, K, H, S>, clock: C, config: EngineConfig) -> Self {
        Self {
            deps,
            tracker: Arc::new(TimeTracker::new(clock.clone(), true)),
            clock,
            publisher: StatePublisher::new(config.debounce),
            gate: Arc::new(ErrorGate::new()),
            runs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Validate, check preconditions, set up isolation and spawn the run actor.
    ///
    /// Fails without creating any run state when the config is invalid, the
    /// session already has an active run, no document has an unchecked task,
    /// or the worktree cannot be set up.
    pub async fn start_run(
        &self,
        session: SessionId,
        request: RunRequest,
    ) -> Result<RunHandle, EngineError> {
        request.config.validate()?;

        let (stop_tx, stop_rx) = watch::channel(false);
        {
            let mut runs = self.runs.lock();
            if runs.contains_key(&session) || self.publisher.snapshot(&session).phase.is_active()
            {
                return Err(EngineError::AlreadyRunning(session));
            }
            runs.insert(session.clone(), stop_tx);
        }

        match self.prepare(&session, request, stop_rx).await {
            Ok(actor) => {
                let span = tracing::info_span!("run", session_id = %session);
                let join = tokio::spawn(actor.run().instrument(span));
                Ok(RunHandle { session, join })
            }
            Err(e) => {
                self.runs.lock().remove(&session);
                Err(e)
            }
        }
    }

    async fn prepare(
        &self,
        session: &SessionId,
        request: RunRequest,
        stop_rx: watch::Receiver<bool>,
    ) -> Result<RunActor<D, A, V, K, H, S, C>, EngineError> {
        let config = &request.config;
        let processor = DocumentProcessor::new(
            self.deps.docs.clone(),
            self.deps.agent.clone(),
            self.clock.clone(),
        );

        let mut has_pending = false;
        let mut total_tasks = 0u32;
        for doc in &config.documents {
            let snap = processor.read_and_count(&request.folder, &doc.filename).await;
            has_pending |= snap.counts.has_pending();
            total_tasks += pass_tasks(doc, &snap.counts, config.loop_enabled);
        }
        if !has_pending {
            tracing::info!(session_id = %session, "no unchecked tasks, nothing to run");
            return Err(EngineError::NoTasks);
        }

        let worktrees = WorktreeManager::new(self.deps.vcs.clone());
        let setup = worktrees
            .setup_worktree(&request.cwd, config.worktree.as_ref())
            .await?;

        let started_at_ms = self.clock.epoch_ms();
        let start = RunAction::Start(RunStart {
            documents: config.documents.iter().map(|d| d.filename.clone()).collect(),
            total_tasks,
            loop_enabled: config.loop_enabled,
            max_loops: config.max_loops,
            worktree: setup.context(),
            started_at_ms,
        });
        let mut state = BatchRunState::default();
        for action in [start, RunAction::SetRunning] {
            state = reduce(state, action.clone());
            self.publisher.dispatch_immediate(session, action);
        }

        self.tracker.start_tracking(session);
        if let Err(e) = self.deps.keep_awake.acquire(session).await {
            tracing::warn!(session_id = %session, error = %e, "keep-awake unavailable");
        }
        let stat = RunStartStat {
            session_id: session.clone(),
            timestamp_ms: started_at_ms,
            documents: config.documents.len(),
            total_tasks,
            loop_enabled: config.loop_enabled,
        };
        if let Err(e) = self.deps.stats.record_run_start(&stat).await {
            tracing::warn!(session_id = %session, error = %e, "failed to record run start");
        }

        tracing::info!(
            session_id = %session,
            documents = config.documents.len(),
            total_tasks,
            loop_enabled = config.loop_enabled,
            cwd = %setup.effective_cwd.display(),
            "run started"
        );
        Ok(RunActor::new(
            self.clone(),
            session.clone(),
            request,
            setup,
            worktrees,
            processor,
            state,
            stop_rx,
        ))
    }

    /// Request a cooperative stop; a pending error gate resolves as abort
    pub fn stop(&self, session: &SessionId) -> Result<(), EngineError> {
        {
            let runs = self.runs.lock();
            let tx = runs
                .get(session)
                .ok_or_else(|| EngineError::NotRunning(session.clone()))?;
            tx.send_replace(true);
        }
        tracing::info!(session_id = %session, "stop requested");
        if self.gate.resolve(session, ErrorResolution::Abort).is_ok() {
            tracing::debug!(session_id = %session, "pending error gate aborted");
        }
        Ok(())
    }

    /// Answer a paused run's error gate
    pub fn resolve_error(
        &self,
        session: &SessionId,
        resolution: ErrorResolution,
    ) -> Result<(), EngineError> {
        self.gate.resolve(session, resolution)?;
        tracing::info!(session_id = %session, %resolution, "error resolved");
        Ok(())
    }

    pub fn has_pending_error(&self, session: &SessionId) -> bool {
        self.gate.is_pending(session)
    }

    /// Published snapshot (may trail the run by one debounce window)
    pub fn state(&self, session: &SessionId) -> BatchRunState {
        self.publisher.snapshot(session)
    }

    pub fn subscribe(&self, session: &SessionId) -> watch::Receiver<BatchRunState> {
        self.publisher.subscribe(session)
    }

    pub fn is_running(&self, session: &SessionId) -> bool {
        self.runs.lock().contains_key(session)
    }

    /// Visibility-gated elapsed time of an active run
    pub fn elapsed(&self, session: &SessionId) -> Duration {
        self.tracker.get_elapsed_time(session)
    }

    pub fn set_host_active(&self, active: bool) {
        apply_host_activity(&self.tracker, &self.publisher, &self.runs, active);
    }

    /// Poll `source` and forward activity changes to the time tracker
    pub fn watch_activity<Src: ActivitySource>(
        &self,
        source: Src,
        poll_interval: Duration,
    ) -> JoinHandle<()> {
        let tracker = Arc::clone(&self.tracker);
        let publisher = self.publisher.clone();
        let runs = Arc::clone(&self.runs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let active = source.is_active();
                if active != tracker.is_host_active() {
                    apply_host_activity(&tracker, &publisher, &runs, active);
                }
            }
        })
    }
}

/// Feed a visibility transition to the tracker, then publish the flushed
/// elapsed time of every running session
fn apply_host_activity<C: Clock>(
    tracker: &TimeTracker<C>,
    publisher: &StatePublisher,
    runs: &Mutex<HashMap<SessionId, watch::Sender<bool>>>,
    active: bool,
) {
    if !tracker.set_host_active(active) {
        return;
    }
    let now_ms = tracker.epoch_ms();
    let sessions: Vec<SessionId> = runs.lock().keys().cloned().collect();
    for session in sessions {
        let elapsed_ms = tracker.get_elapsed_time(&session).as_millis() as u64;
        publisher.dispatch_immediate(
            &session,
            RunAction::UpdateProgress(ProgressUpdate {
                accumulated_elapsed_ms: Some(elapsed_ms),
                last_active_timestamp: Some(now_ms),
                ..Default::default()
            }),
        );
    }
}

#[cfg(test)]
#[path = "../runtime_tests/mod.rs"]
mod tests;
