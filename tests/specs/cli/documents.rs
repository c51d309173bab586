//! Document inspection commands: `count` and `docs`.

use crate::prelude::*;

fn two_phases() -> Project {
    let temp = Project::empty();
    temp.doc("Phase-1", "# Phase 1\n\n- [ ] a\n- [x] b\n");
    temp.doc("Phase-2", "# Phase 2\n\n- [x] c\n");
    temp
}

#[test]
fn count_shows_open_and_done_per_document() {
    let temp = two_phases();

    temp.autorun().args(&["count", "docs"]).passes().stdout_eq(
        "\
DOCUMENT  OPEN  DONE  STATUS
Phase-1      1     1  pending
Phase-2      0     1  done

1 open, 2 done across 2 documents
",
    );
}

#[test]
fn count_json_reports_each_document() {
    let temp = two_phases();

    let out = temp
        .autorun()
        .args(&["-o", "json", "count", "docs"])
        .passes();
    let parsed: serde_json::Value = serde_json::from_str(&out.stdout()).unwrap();
    let docs = parsed.as_array().unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["document"], "Phase-1");
    assert_eq!(docs[0]["unchecked"], 1);
    assert_eq!(docs[1]["checked"], 1);
}

#[test]
fn count_empty_folder() {
    let temp = Project::empty();
    temp.file("docs/notes.txt", "not a task document");

    temp.autorun()
        .args(&["count", "docs"])
        .passes()
        .stdout_has("No documents in docs");
}

#[test]
fn count_missing_folder_fails() {
    let temp = Project::empty();

    temp.autorun()
        .args(&["count", "nowhere"])
        .fails()
        .stderr_has("failed to list documents");
}

#[test]
fn docs_lists_names_in_order() {
    let temp = two_phases();

    temp.autorun()
        .args(&["docs", "docs"])
        .passes()
        .stdout_eq("Phase-1\nPhase-2\n");
}
