// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `autorun run <file>` - drive a run described by a run file

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use autorun_adapters::{
    CommandAgentAdapter, CommandKeepAwake, FsDocumentStore, GitAdapter, JsonlHistorySink,
    JsonlStatsSink, TracedAgent, TracedVcs,
};
use autorun_core::{
    BatchRunState, IdGen, ManualActivity, RunConfig, RunFile, RunPhase, RunStatus, SessionId,
    SystemClock, UuidIdGen,
};
use autorun_engine::{
    Engine, EngineConfig, EngineDeps, ErrorResolution, RunHandle, RunOutcome, RunRequest,
};
use clap::{Args, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use crate::color;
use crate::exit_error::ExitError;
use crate::output::{print_summary, OutputFormat};

/// How often host activity is polled
const ACTIVITY_POLL: Duration = Duration::from_secs(1);

type CliEngine = Engine<
    FsDocumentStore,
    TracedAgent<CommandAgentAdapter>,
    TracedVcs<GitAdapter>,
    CommandKeepAwake,
    JsonlHistorySink,
    JsonlStatsSink,
    SystemClock,
>;

#[derive(Args)]
pub struct RunArgs {
    /// Run file (TOML) describing the folder, documents and prompt
    pub file: PathBuf,

    /// Session id (defaults to a fresh id)
    #[arg(long)]
    pub session: Option<String>,

    /// Repeat passes until no work remains
    #[arg(long = "loop")]
    pub loop_mode: bool,

    /// Loop with at most this many passes
    #[arg(long)]
    pub max_loops: Option<u32>,

    /// What to do when a task fails and the run pauses
    #[arg(long, value_enum, default_value_t)]
    pub on_error: OnError,
}

/// Answer to a paused run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OnError {
    /// Ask on the terminal (abort when stdin is closed)
    #[default]
    Ask,
    Resume,
    Skip,
    Abort,
}

/// Apply command-line loop overrides on top of the run file
pub fn apply_overrides(config: RunConfig, args: &RunArgs) -> Result<RunConfig> {
    let config = if args.max_loops.is_some() {
        config.with_loop(args.max_loops)
    } else if args.loop_mode {
        let max = config.max_loops;
        config.with_loop(max)
    } else {
        config
    };
    config.validate()?;
    Ok(config)
}

/// Process exit code for a finished run
pub fn exit_code(status: RunStatus) -> i32 {
    match status {
        RunStatus::Completed | RunStatus::CompletedWithStalls => 0,
        RunStatus::Stopped => 2,
        RunStatus::Stalled => 3,
    }
}

/// Parse an operator answer; `None` when unrecognized
pub fn parse_resolution(input: &str) -> Option<ErrorResolution> {
    match input.trim().to_ascii_lowercase().as_str() {
        "r" | "resume" => Some(ErrorResolution::Resume),
        "s" | "skip" => Some(ErrorResolution::SkipDocument),
        "a" | "abort" => Some(ErrorResolution::Abort),
        _ => None,
    }
}

pub async fn handle(args: RunArgs, format: OutputFormat) -> Result<()> {
    let file = RunFile::load(&args.file)?;
    let config = apply_overrides(file.to_run_config()?, &args)?;
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let session = match &args.session {
        Some(id) => SessionId::new(id.clone()),
        None => SessionId::new(UuidIdGen.next()),
    };

    let state_dir = autorun_adapters::env::state_dir();
    let deps = EngineDeps {
        docs: FsDocumentStore::new(),
        agent: TracedAgent::new(CommandAgentAdapter::new(&file.agent).with_default_cwd(&cwd)),
        vcs: TracedVcs::new(GitAdapter::new()),
        keep_awake: CommandKeepAwake::platform_default(),
        history: JsonlHistorySink::new(&state_dir),
        stats: JsonlStatsSink::new(&state_dir),
    };
    let engine: CliEngine = Engine::new(deps, SystemClock, EngineConfig::default());

    let activity = ManualActivity::new(true);
    let watcher = engine.watch_activity(activity.clone(), ACTIVITY_POLL);
    let toggler = spawn_activity_toggle(activity);

    tracing::info!(
        session_id = %session,
        documents = config.documents.len(),
        folder = %file.folder.display(),
        "starting run"
    );
    let request = RunRequest {
        config,
        folder: file.folder.clone(),
        cwd,
        session_name: file.session_name.clone(),
        group: file.group.clone(),
    };
    let outcome = match engine.start_run(session.clone(), request).await {
        Ok(handle) => drive(&engine, &session, handle, args.on_error).await,
        Err(e) => Err(e.into()),
    };
    watcher.abort();
    if let Some(toggler) = toggler {
        toggler.abort();
    }

    let outcome = outcome?;
    print_summary(&outcome.summary, format)?;
    match exit_code(outcome.summary.status) {
        0 => Ok(()),
        code => Err(ExitError::silent(code).into()),
    }
}

/// Wait for the run while answering Ctrl-C and error pauses
async fn drive(
    engine: &CliEngine,
    session: &SessionId,
    handle: RunHandle,
    policy: OnError,
) -> Result<RunOutcome> {
    let mut states = engine.subscribe(session);
    let wait = handle.wait();
    tokio::pin!(wait);
    let mut stop_requested = false;
    let mut watching = true;

    let initial = states.borrow_and_update().clone();
    answer_pause(engine, session, &initial, policy).await;

    loop {
        tokio::select! {
            outcome = &mut wait => return Ok(outcome?),
            signal = tokio::signal::ctrl_c(), if !stop_requested => {
                signal.context("failed to listen for ctrl-c")?;
                stop_requested = true;
                eprintln!("{}", color::muted("Stopping after the current task..."));
                if let Err(e) = engine.stop(session) {
                    tracing::debug!(error = %e, "stop raced with run exit");
                }
            }
            changed = states.changed(), if watching => {
                if changed.is_err() {
                    watching = false;
                    continue;
                }
                let state = states.borrow_and_update().clone();
                answer_pause(engine, session, &state, policy).await;
            }
        }
    }
}

async fn answer_pause(
    engine: &CliEngine,
    session: &SessionId,
    state: &BatchRunState,
    policy: OnError,
) {
    if state.phase != RunPhase::ErrorPaused || !engine.has_pending_error(session) {
        return;
    }
    let resolution = decide(policy, state).await;
    if let Err(e) = engine.resolve_error(session, resolution) {
        tracing::debug!(error = %e, "error gate already resolved");
    }
}

async fn decide(policy: OnError, state: &BatchRunState) -> ErrorResolution {
    let document = state
        .error_document_index
        .and_then(|i| state.documents.get(i))
        .map(String::as_str)
        .unwrap_or("unknown document");
    let message = state
        .error
        .as_ref()
        .map(|e| e.to_string())
        .unwrap_or_default();
    eprintln!("Agent error on {}: {}", document, message);

    match policy {
        OnError::Resume => ErrorResolution::Resume,
        OnError::Skip => ErrorResolution::SkipDocument,
        OnError::Abort => ErrorResolution::Abort,
        OnError::Ask => ask().await,
    }
}

async fn ask() -> ErrorResolution {
    let mut stdin = BufReader::new(tokio::io::stdin());
    loop {
        eprint!("[r]esume, [s]kip document, or [a]bort? ");
        let mut line = String::new();
        match stdin.read_line(&mut line).await {
            Ok(0) | Err(_) => return ErrorResolution::Abort,
            Ok(_) => {
                if let Some(resolution) = parse_resolution(&line) {
                    return resolution;
                }
            }
        }
    }
}

/// SIGUSR1 toggles host activity, pausing or resuming the elapsed clock
#[cfg(unix)]
fn spawn_activity_toggle(activity: ManualActivity) -> Option<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::user_defined1()) {
        Ok(mut sig) => Some(tokio::spawn(async move {
            let mut active = true;
            while sig.recv().await.is_some() {
                active = !active;
                activity.set_active(active);
                tracing::info!(active, "host activity toggled");
            }
        })),
        Err(e) => {
            tracing::warn!(error = %e, "activity signal unavailable");
            None
        }
    }
}

#[cfg(not(unix))]
fn spawn_activity_toggle(_activity: ManualActivity) -> Option<JoinHandle<()>> {
    None
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
