//! Agent failures: the error pause and how it is answered.

use crate::prelude::*;

/// Fails on its first call, then checks off tasks like the checking agent
const FLAKY_AGENT: &str = r#"doc="$(cat)"
if [ ! -f failed.once ]; then
  touch failed.once
  echo "connection reset by peer" >&2
  exit 1
fi
awk 'done == 0 && /- \[ \]/ { sub(/- \[ \]/, "- [x]"); done = 1 } { print }' "$doc" > "$doc.tmp"
mv "$doc.tmp" "$doc"
"#;

#[test]
fn closed_stdin_aborts_the_paused_run() {
    let temp = Project::empty();
    temp.doc("Phase-1", "- [ ] a\n");
    temp.run_file(FAILING_AGENT, &[("Phase-1", false)], "");

    temp.autorun()
        .args(&["run", "autorun.toml"])
        .exits_with(2)
        .stderr_has("Agent error on Phase-1")
        .stdout_has("Auto Run stopped");

    assert_eq!(temp.read_doc("Phase-1"), "- [ ] a\n");
}

#[test]
fn resume_retries_the_failed_task() {
    let temp = Project::empty();
    temp.doc("Phase-1", "- [ ] a\n");
    temp.run_file(FLAKY_AGENT, &[("Phase-1", false)], "");

    temp.autorun()
        .args(&["run", "autorun.toml", "--on-error", "resume"])
        .passes()
        .stdout_has("Auto Run completed: 1 task");

    assert_eq!(temp.read_doc("Phase-1"), "- [x] a\n");
}

#[test]
fn skip_moves_to_the_next_document() {
    let temp = Project::empty();
    temp.doc("Phase-1", "- [ ] a\n");
    temp.doc("Phase-2", "- [ ] b\n");
    temp.run_file(FLAKY_AGENT, &[("Phase-1", false), ("Phase-2", false)], "");

    temp.autorun()
        .args(&["run", "autorun.toml", "--on-error", "skip"])
        .passes()
        .stdout_has("Auto Run completed: 1 task")
        .stdout_has("skipped Phase-1 after error");

    assert_eq!(temp.read_doc("Phase-1"), "- [ ] a\n");
    assert_eq!(temp.read_doc("Phase-2"), "- [x] b\n");
}

#[test]
fn abort_stops_the_run() {
    let temp = Project::empty();
    temp.doc("Phase-1", "- [ ] a\n");
    temp.doc("Phase-2", "- [ ] b\n");
    temp.run_file(FAILING_AGENT, &[("Phase-1", false), ("Phase-2", false)], "");

    temp.autorun()
        .args(&["run", "autorun.toml", "--on-error", "abort"])
        .exits_with(2)
        .stdout_has("Auto Run stopped: 0 tasks");

    assert_eq!(temp.read_doc("Phase-2"), "- [ ] b\n");
}

#[test]
fn without_pause_failures_become_notes() {
    let temp = Project::empty();
    temp.doc("Phase-1", "- [ ] a\n- [ ] b\n- [ ] c\n");
    temp.run_file(FAILING_AGENT, &[("Phase-1", false)], "pause_on_error = false\n");

    temp.autorun()
        .args(&["run", "autorun.toml", "--session", "no-pause"])
        .exits_with(3)
        .stdout_has("agent error on Phase-1");

    let history = temp.history("no-pause");
    let tasks: Vec<_> = history.iter().filter(|e| e["kind"] == "task").collect();
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|t| t["success"] == false));
}
