// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template variable expansion for prompts and task documents.
//!
//! Placeholders use `{{NAME}}`. Names are matched case-insensitively and
//! unknown names are left as-is, so documents may safely contain other
//! double-brace syntax.

use chrono::{DateTime, Local, TimeZone};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Regex pattern for {{VARIABLE_NAME}}
#[allow(clippy::expect_used)]
pub static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("constant regex pattern is valid")
});

/// Values available to a template at expansion time
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    pub session_id: String,
    pub session_name: String,
    pub group: Option<String>,
    pub cwd: String,
    pub git_branch: Option<String>,
    pub folder_path: String,
    pub document_name: String,
    /// 1-based pass number
    pub loop_number: u32,
    pub epoch_ms: u64,
}

impl TemplateContext {
    /// Full path of the current document (`<folder>/<name>.md`)
    pub fn document_path(&self) -> String {
        let folder = self.folder_path.trim_end_matches('/');
        if folder.is_empty() {
            format!("{}.md", self.document_name)
        } else {
            format!("{}/{}.md", folder, self.document_name)
        }
    }

    /// Variable map keyed by upper-case name
    pub fn vars(&self) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        let mut set = |names: &[&str], value: String| {
            for name in names {
                vars.insert((*name).to_string(), value.clone());
            }
        };

        set(&["SESSION_ID", "AGENT_ID"], self.session_id.clone());
        set(&["SESSION_NAME", "AGENT_NAME"], self.session_name.clone());
        set(
            &["GROUP", "AGENT_GROUP"],
            self.group.clone().unwrap_or_default(),
        );
        set(&["CWD", "AGENT_PATH"], self.cwd.clone());
        set(&["GIT_BRANCH"], self.git_branch.clone().unwrap_or_default());
        set(&["FOLDER_PATH", "AUTORUN_FOLDER"], self.folder_path.clone());
        set(&["DOCUMENT_NAME"], self.document_name.clone());
        set(&["DOCUMENT_PATH"], self.document_path());
        set(&["LOOP_NUMBER"], self.loop_number.to_string());
        set(&["TIMESTAMP"], self.epoch_ms.to_string());

        if let Some(local) = local_time(self.epoch_ms) {
            set(&["DATE"], local.format("%Y-%m-%d").to_string());
            set(&["TIME"], local.format("%H:%M:%S").to_string());
            set(&["DATETIME"], local.format("%Y-%m-%d %H:%M:%S").to_string());
        }

        vars
    }
}

fn local_time(epoch_ms: u64) -> Option<DateTime<Local>> {
    Local.timestamp_millis_opt(epoch_ms as i64).single()
}

/// Replace `{{NAME}}` placeholders with values from `vars`.
///
/// Lookup upper-cases the placeholder name; keys in `vars` are expected to be
/// upper-case already (as produced by [`TemplateContext::vars`]).
pub fn expand_template(template: &str, vars: &HashMap<String, String>) -> String {
    VAR_PATTERN
        .replace_all(template, |caps: &regex::Captures| {
            let name = caps[1].to_ascii_uppercase();
            match vars.get(&name) {
                Some(val) => val.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
