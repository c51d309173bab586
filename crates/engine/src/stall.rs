// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-document no-progress detection

use std::collections::{HashMap, HashSet};

/// Consecutive no-progress task runs before a document is stalled
pub const STALL_THRESHOLD: u32 = 2;

#[derive(Debug, Default)]
pub struct StallDetector {
    threshold: u32,
    misses: HashMap<String, u32>,
    stalled: HashSet<String>,
}

impl StallDetector {
    pub fn new() -> Self {
        Self::with_threshold(STALL_THRESHOLD)
    }

    pub fn with_threshold(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            ..Default::default()
        }
    }

    /// Record one task run. Returns true when this run stalls the document.
    pub fn record(&mut self, document: &str, document_changed: bool, completed: u32) -> bool {
        if self.stalled.contains(document) {
            return false;
        }
        if document_changed || completed > 0 {
            self.misses.remove(document);
            return false;
        }
        let misses = self.misses.entry(document.to_string()).or_insert(0);
        *misses += 1;
        if *misses >= self.threshold {
            self.misses.remove(document);
            self.stalled.insert(document.to_string());
            return true;
        }
        false
    }

    pub fn is_stalled(&self, document: &str) -> bool {
        self.stalled.contains(document)
    }

    pub fn consecutive_misses(&self, document: &str) -> u32 {
        self.misses.get(document).copied().unwrap_or(0)
    }

    pub fn stalled_count(&self) -> usize {
        self.stalled.len()
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

#[cfg(test)]
#[path = "stall_tests.rs"]
mod tests;
