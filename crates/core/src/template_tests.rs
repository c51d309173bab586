// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn context() -> TemplateContext {
    TemplateContext {
        session_id: "sess-1".to_string(),
        session_name: "builder".to_string(),
        group: Some("backend".to_string()),
        cwd: "/work/project".to_string(),
        git_branch: Some("autorun/feature".to_string()),
        folder_path: "/work/project/tasks/".to_string(),
        document_name: "Phase-1".to_string(),
        loop_number: 2,
        epoch_ms: 1_767_225_600_000,
    }
}

#[yare::parameterized(
    branch        = { "on {{GIT_BRANCH}}", "on autorun/feature" },
    group_alias   = { "{{AGENT_GROUP}}/{{GROUP}}", "backend/backend" },
    loop_number   = { "pass {{LOOP_NUMBER}}", "pass 2" },
    document_path = { "{{DOCUMENT_PATH}}", "/work/project/tasks/Phase-1.md" },
    lower_case    = { "{{document_name}}", "Phase-1" },
    padded        = { "{{ SESSION_NAME }}", "builder" },
    unknown_kept  = { "{{NOT_A_VAR}} stays", "{{NOT_A_VAR}} stays" },
    no_vars       = { "plain text", "plain text" },
)]
fn expands(template: &str, expected: &str) {
    assert_eq!(expand_template(template, &context().vars()), expected);
}

#[test]
fn missing_optional_values_expand_to_empty() {
    let ctx = TemplateContext {
        group: None,
        git_branch: None,
        ..context()
    };
    assert_eq!(
        expand_template("[{{GIT_BRANCH}}][{{GROUP}}]", &ctx.vars()),
        "[][]"
    );
}

#[test]
fn document_path_without_folder() {
    let ctx = TemplateContext {
        folder_path: String::new(),
        ..context()
    };
    assert_eq!(ctx.document_path(), "Phase-1.md");
}

#[test]
fn date_vars_are_present() {
    let vars = context().vars();
    let date = vars.get("DATE").cloned().unwrap_or_default();
    assert_eq!(date.len(), 10, "unexpected date: {}", date);
    assert!(vars.contains_key("TIME"));
    assert!(vars.contains_key("DATETIME"));
    assert_eq!(vars.get("TIMESTAMP").map(String::as_str), Some("1767225600000"));
}
