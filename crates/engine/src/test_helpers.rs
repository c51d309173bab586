// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for the engine crate.

use crate::{Engine, EngineConfig, EngineDeps, RunRequest};
use autorun_adapters::{
    AgentResponse, FakeAgentAdapter, FakeDocumentStore, FakeHistorySink, FakeKeepAwake,
    FakeStatsSink, FakeVcsAdapter,
};
use autorun_core::{FakeClock, RunConfig, SessionId};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Convenience alias for the fully-faked engine.
pub(crate) type TestEngine = Engine<
    FakeDocumentStore,
    FakeAgentAdapter,
    FakeVcsAdapter,
    FakeKeepAwake,
    FakeHistorySink,
    FakeStatsSink,
    FakeClock,
>;

/// Prompt whose expansion is exactly the document the agent should work on
pub(crate) const TARGET_PROMPT: &str = "{{DOCUMENT_NAME}}";

/// Test context holding the engine and every fake it talks to.
pub(crate) struct TestContext {
    pub engine: TestEngine,
    pub clock: FakeClock,
    pub folder: PathBuf,
    pub docs: FakeDocumentStore,
    pub agent: FakeAgentAdapter,
    pub vcs: FakeVcsAdapter,
    pub keep_awake: FakeKeepAwake,
    pub history: FakeHistorySink,
    pub stats: FakeStatsSink,
    pub session: SessionId,
}

pub(crate) fn setup() -> TestContext {
    setup_with_debounce(Duration::ZERO)
}

pub(crate) fn setup_with_debounce(debounce: Duration) -> TestContext {
    let docs = FakeDocumentStore::new();
    let agent = FakeAgentAdapter::new();
    let vcs = FakeVcsAdapter::new();
    let keep_awake = FakeKeepAwake::new();
    let history = FakeHistorySink::new();
    let stats = FakeStatsSink::new();
    let clock = FakeClock::new();
    let engine = Engine::new(
        EngineDeps {
            docs: docs.clone(),
            agent: agent.clone(),
            vcs: vcs.clone(),
            keep_awake: keep_awake.clone(),
            history: history.clone(),
            stats: stats.clone(),
        },
        clock.clone(),
        EngineConfig { debounce },
    );
    TestContext {
        engine,
        clock,
        folder: PathBuf::from("/docs"),
        docs,
        agent,
        vcs,
        keep_awake,
        history,
        stats,
        session: SessionId::new("session-1"),
    }
}

impl TestContext {
    pub fn add_doc(&self, name: &str, content: impl Into<String>) {
        self.docs.set_doc(&self.folder, name, content);
    }

    pub fn doc(&self, name: &str) -> String {
        self.docs.doc(&self.folder, name).unwrap_or_default()
    }

    pub fn request(&self, config: RunConfig) -> RunRequest {
        RunRequest {
            config,
            folder: self.folder.clone(),
            cwd: PathBuf::from("/repo"),
            session_name: Some("Test Agent".to_string()),
            group: None,
        }
    }

    /// Agent that checks off the first open task in the document named by the prompt
    pub fn agent_checks_one_task(&self) {
        let docs = self.docs.clone();
        let folder = self.folder.clone();
        self.agent.on_spawn(move |req| {
            let name = req.prompt.trim();
            if let Some(content) = docs.doc(&folder, name) {
                docs.set_doc(&folder, name, content.replacen("- [ ]", "- [x]", 1));
            }
            Ok(AgentResponse::ok(format!("Checked off a task in {}.", name)))
        });
    }

    /// Agent that never touches any document
    pub fn agent_does_nothing(&self) {
        self.agent
            .on_spawn(|_| Ok(AgentResponse::ok("I looked but changed nothing.")));
    }

    pub fn prompts(&self) -> Vec<String> {
        self.agent.calls().into_iter().map(|c| c.prompt).collect()
    }

    pub fn working_copies(&self) -> Vec<String> {
        self.docs.working_copies(Path::new(&self.folder))
    }
}

/// Poll until `f` holds, yielding to other tasks in between
pub(crate) async fn wait_until(mut f: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if f() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
