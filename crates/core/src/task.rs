// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checklist task scanning.
//!
//! A task document is free-form markdown; only list items carrying a
//! checkbox count as tasks:
//!
//! ```text
//! - [ ] unchecked task
//! * [x] checked task
//!   - [✓] nested checked task
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// Allow expect here as the patterns are compile-time verified to be valid
#[allow(clippy::expect_used)]
static UNCHECKED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*[-*][ \t]*\[[ \t]*\][ \t]*\S.*$").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static CHECKED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*[-*][ \t]*\[[xX✓✔]\][ \t]*\S.*$").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static CHECKED_BOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*[-*][ \t]*)\[[xX✓✔]\]([ \t]*\S)").expect("constant regex pattern is valid")
});

/// Checked/unchecked task counts for one document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounts {
    pub unchecked: u32,
    pub checked: u32,
}

impl TaskCounts {
    pub fn total(&self) -> u32 {
        self.unchecked + self.checked
    }

    pub fn has_pending(&self) -> bool {
        self.unchecked > 0
    }
}

/// Count checked and unchecked tasks in document text
pub fn count_tasks(content: &str) -> TaskCounts {
    TaskCounts {
        unchecked: UNCHECKED_PATTERN.find_iter(content).count() as u32,
        checked: CHECKED_PATTERN.find_iter(content).count() as u32,
    }
}

/// Uncheck every checked task, leaving indentation, bullets and text intact
pub fn reset_checkboxes(content: &str) -> String {
    CHECKED_BOX.replace_all(content, "$1[ ]$2").into_owned()
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
