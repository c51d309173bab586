// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use autorun_adapters::{AgentResponse, DocumentCall, FakeAgentAdapter, FakeDocumentStore};
use autorun_core::test_support::task_doc;
use autorun_core::FakeClock;
use std::path::PathBuf;

struct Fixture {
    docs: FakeDocumentStore,
    agent: FakeAgentAdapter,
    processor: DocumentProcessor<FakeDocumentStore, FakeAgentAdapter, FakeClock>,
    folder: PathBuf,
    session: SessionId,
}

fn fixture(content: &str) -> Fixture {
    let docs = FakeDocumentStore::new();
    let agent = FakeAgentAdapter::new();
    let folder = PathBuf::from("/docs");
    docs.set_doc(&folder, "Phase-1", content);
    Fixture {
        processor: DocumentProcessor::new(docs.clone(), agent.clone(), FakeClock::new()),
        docs,
        agent,
        folder,
        session: SessionId::new("s"),
    }
}

/// Agent handler that rewrites the document to `next`
fn agent_writes(f: &Fixture, next: &str, response: &str) {
    let docs = f.docs.clone();
    let folder = f.folder.clone();
    let next = next.to_string();
    let response = response.to_string();
    f.agent.on_spawn(move |_| {
        docs.set_doc(&folder, "Phase-1", next.clone());
        Ok(AgentResponse::ok(response.clone()))
    });
}

async fn run(f: &Fixture, vars: &HashMap<String, String>) -> TaskResult {
    let prev = f.processor.read_and_count(&f.folder, "Phase-1").await;
    f.processor
        .process_task(TaskRequest {
            session: &f.session,
            prompt_template: "Work on {{DOCUMENT_NAME}}",
            folder: &f.folder,
            document: "Phase-1",
            prev: &prev,
            vars,
            cwd: Path::new("/repo"),
        })
        .await
}

fn vars() -> HashMap<String, String> {
    HashMap::from([
        ("DOCUMENT_NAME".to_string(), "Phase-1".to_string()),
        ("LOOP_NUMBER".to_string(), "1".to_string()),
    ])
}

#[tokio::test]
async fn read_and_count_soft_fails() {
    let f = fixture(&task_doc(2, 1));
    let snap = f.processor.read_and_count(&f.folder, "Phase-1").await;
    assert_eq!(snap.counts, TaskCounts { unchecked: 2, checked: 1 });

    let missing = f.processor.read_and_count(&f.folder, "Nope").await;
    assert_eq!(missing, DocSnapshot::default());
}

#[tokio::test]
async fn completing_one_task() {
    let f = fixture(&task_doc(2, 0));
    agent_writes(&f, "# Tasks\n\n- [x] open task 1\n- [ ] open task 2\n", "Checked off task one. More detail here.");
    let result = run(&f, &vars()).await;

    assert!(result.success);
    assert_eq!(result.tasks_completed, 1);
    assert_eq!(result.net_change, 0);
    assert_eq!(result.tasks_added, 0);
    assert!(result.document_changed);
    assert_eq!(result.summary, "Checked off task one.");
    assert_eq!(result.after.counts, TaskCounts { unchecked: 1, checked: 1 });

    let call = &f.agent.calls()[0];
    assert_eq!(call.prompt, "Work on Phase-1");
    assert_eq!(call.cwd.as_deref(), Some(Path::new("/repo")));
}

#[tokio::test]
async fn net_change_counts_added_and_removed_tasks() {
    let f = fixture(&task_doc(2, 0));
    // One closed, two appended
    agent_writes(
        &f,
        "- [x] a\n- [ ] b\n- [ ] c\n- [ ] d\n",
        "ok",
    );
    let result = run(&f, &vars()).await;
    assert_eq!(result.tasks_completed, 1);
    assert_eq!(result.net_change, 2);
    assert_eq!(result.tasks_added, 2);

    let f = fixture(&task_doc(3, 0));
    agent_writes(&f, "- [ ] a\n", "ok");
    let result = run(&f, &vars()).await;
    assert_eq!(result.tasks_completed, 0);
    assert_eq!(result.net_change, -2);
    assert_eq!(result.tasks_added, 0);
}

#[tokio::test]
async fn unchanged_document_is_reported() {
    let f = fixture(&task_doc(1, 0));
    let result = run(&f, &vars()).await;
    assert!(result.success);
    assert!(!result.document_changed);
    assert_eq!(result.tasks_completed, 0);
    assert_eq!(result.summary, "Done.");
}

#[tokio::test]
async fn expands_document_only_when_needed() {
    let f = fixture("- [ ] note loop {{LOOP_NUMBER}}\n");
    let _ = run(&f, &vars()).await;
    assert_eq!(f.docs.write_count("Phase-1"), 1);
    assert_eq!(f.docs.doc(&f.folder, "Phase-1").unwrap(), "- [ ] note loop 1\n");

    let f = fixture(&task_doc(1, 0));
    let _ = run(&f, &vars()).await;
    assert!(!f
        .docs
        .calls()
        .iter()
        .any(|c| matches!(c, DocumentCall::Write { .. })));
}

#[tokio::test]
async fn expansion_alone_is_not_a_change() {
    let f = fixture("- [ ] note loop {{LOOP_NUMBER}}\n");
    let result = run(&f, &vars()).await;
    assert!(!result.document_changed);
}

#[tokio::test]
async fn failed_expansion_write_is_not_a_change() {
    let f = fixture("- [ ] note loop {{LOOP_NUMBER}}\n");
    f.docs.fail_writes("Phase-1", 1);
    let result = run(&f, &vars()).await;
    assert!(!result.document_changed);
    assert_eq!(
        f.docs.doc(&f.folder, "Phase-1").unwrap(),
        "- [ ] note loop {{LOOP_NUMBER}}\n"
    );
}

#[tokio::test]
async fn agent_failure_becomes_classified_error() {
    let f = fixture(&task_doc(1, 0));
    f.agent
        .push_result(Ok(AgentResponse::failed("429 rate limit exceeded")));
    let result = run(&f, &vars()).await;
    assert!(!result.success);
    let error = result.error.unwrap();
    assert_eq!(error.kind, AgentErrorKind::RateLimited);
    assert_eq!(result.summary, "429 rate limit exceeded");
}

#[yare::parameterized(
    spawn   = { AgentAdapterError::SpawnFailed("no such file".into()), AgentErrorKind::ProcessFailed },
    timeout = { AgentAdapterError::TimedOut("agent timed out".into()), AgentErrorKind::TimedOut },
)]
fn adapter_errors_map_to_kinds(err: AgentAdapterError, kind: AgentErrorKind) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    rt.block_on(async {
        let f = fixture(&task_doc(1, 0));
        f.agent.push_result(Err(err));
        let result = run(&f, &vars()).await;
        assert!(!result.success);
        assert_eq!(result.error.unwrap().kind, kind);
        assert_eq!(result.summary, "Task failed");
    });
}

#[yare::parameterized(
    first_sentence = { Some("Fixed the parser. Also refactored."), true, "Fixed the parser." },
    heading_skipped = { Some("## Summary\n\nUpdated **parser** module"), true, "Updated parser module" },
    bullet          = { Some("- [x] Added `retry` logic"), true, "Added retry logic" },
    link            = { Some("See [the docs](http://x) for more!"), true, "See the docs for more!" },
    wrapped_lines   = { Some("Renamed the\nconfig loader.\n\nSecond para."), true, "Renamed the config loader." },
    code_only       = { Some("```\nfn main() {}\n```"), true, "Task completed" },
    empty           = { Some("   "), true, "Task completed" },
    none_ok         = { None, true, "Task completed" },
    none_failed     = { None, false, "Task failed" },
    symbols_only    = { Some("---\n***"), false, "Task failed" },
)]
fn summaries(response: Option<&str>, success: bool, expected: &str) {
    assert_eq!(extract_summary(response, success), expected);
}

#[test]
fn summary_is_capped() {
    let long = "word ".repeat(100);
    let summary = extract_summary(Some(&long), true);
    assert!(summary.chars().count() <= MAX_SUMMARY_CHARS);
    assert!(summary.ends_with("..."));
}
