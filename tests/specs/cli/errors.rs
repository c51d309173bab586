//! Failures surfaced before a run starts.

use crate::prelude::*;

#[test]
fn no_command_prints_help() {
    cli().passes().stdout_has("Usage: autorun");
}

#[test]
fn missing_run_file_fails() {
    let temp = Project::empty();

    temp.autorun()
        .args(&["run", "missing.toml"])
        .exits_with(1)
        .stderr_has("failed to read");
}

#[test]
fn malformed_run_file_fails() {
    let temp = Project::empty();
    temp.file("autorun.toml", "folder = \"docs\"\nprompt = \n");

    temp.autorun()
        .args(&["run", "autorun.toml"])
        .exits_with(1)
        .stderr_has("failed to parse");
}

#[test]
fn run_without_documents_fails() {
    let temp = Project::empty();
    temp.run_file(IDLE_AGENT, &[], "documents = []\n");

    temp.autorun()
        .args(&["run", "autorun.toml"])
        .exits_with(1)
        .stderr_has("run has no documents");
}

#[test]
fn zero_max_loops_is_rejected() {
    let temp = Project::empty();
    temp.doc("Phase-1", "- [ ] a\n");
    temp.run_file(IDLE_AGENT, &[("Phase-1", false)], "");

    temp.autorun()
        .args(&["run", "autorun.toml", "--max-loops", "0"])
        .exits_with(1)
        .stderr_has("max_loops must be at least 1");
}

#[test]
fn nothing_to_do_fails() {
    let temp = Project::empty();
    temp.doc("Phase-1", "- [x] already done\n");
    temp.run_file(IDLE_AGENT, &[("Phase-1", false)], "");

    temp.autorun()
        .args(&["run", "autorun.toml"])
        .exits_with(1)
        .stderr_has("no unchecked tasks found in any document");
}
