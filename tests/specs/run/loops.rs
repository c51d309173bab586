//! Looping runs and reset-on-completion documents.

use crate::prelude::*;

#[test]
fn reset_document_runs_on_fresh_copies() {
    let temp = Project::empty();
    temp.doc("Daily", "# Daily\n\n- [ ] water plants\n");
    temp.run_file(
        CHECKING_AGENT,
        &[("Daily", true)],
        "loop_enabled = true\nmax_loops = 2\n",
    );

    temp.autorun()
        .args(&["run", "autorun.toml", "--session", "daily"])
        .passes()
        .stdout_has("Auto Run completed: 2 tasks")
        .stdout_has("**Loops:** 2");

    assert_eq!(temp.read_doc("Daily"), "# Daily\n\n- [ ] water plants\n");
    let copies = temp.working_copies();
    assert_eq!(copies.len(), 2);
    assert!(copies[0].starts_with("Daily-") && copies[0].ends_with("-loop-1.md"));
    assert!(copies[1].ends_with("-loop-2.md"));
    for copy in &copies {
        assert_eq!(
            temp.read(format!("docs/Runs/{}", copy)),
            "# Daily\n\n- [x] water plants\n"
        );
    }

    let loops = temp
        .history("daily")
        .iter()
        .filter(|e| e["kind"] == "loop")
        .count();
    assert_eq!(loops, 2);
}

#[test]
fn max_loops_flag_turns_on_looping() {
    let temp = Project::empty();
    temp.doc("Daily", "- [ ] water plants\n");
    temp.run_file(CHECKING_AGENT, &[("Daily", true)], "");

    temp.autorun()
        .args(&["run", "autorun.toml", "--max-loops", "3"])
        .passes()
        .stdout_has("Auto Run completed: 3 tasks");

    assert_eq!(temp.working_copies().len(), 3);
}

#[test]
fn without_looping_a_reset_document_runs_once() {
    let temp = Project::empty();
    temp.doc("Daily", "- [ ] water plants\n");
    temp.run_file(CHECKING_AGENT, &[("Daily", true)], "");

    temp.autorun()
        .args(&["run", "autorun.toml"])
        .passes()
        .stdout_has("Auto Run completed: 1 task");

    assert_eq!(temp.read_doc("Daily"), "- [ ] water plants\n");
    assert_eq!(temp.working_copies().len(), 1);
}
