// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run configuration and the TOML run file it is loaded from.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading or validating run configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("run has no documents")]
    NoDocuments,
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("max_loops must be at least 1")]
    ZeroMaxLoops,
    #[error("duplicate document: {0}")]
    DuplicateDocument(String),
    #[error("worktree branch is empty")]
    EmptyWorktreeBranch,
    #[error("specify either prompt or prompt_file, not both")]
    AmbiguousPrompt,
}

/// One task document in a run, in declared order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Document name relative to the run folder, without `.md`
    pub filename: String,
    /// Process a disposable working copy each pass; the original is never written
    #[serde(default)]
    pub reset_on_completion: bool,
}

impl DocumentRef {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            reset_on_completion: false,
        }
    }

    pub fn resetting(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            reset_on_completion: true,
        }
    }
}

/// Isolated working copy settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreeConfig {
    /// Where the worktree is created
    pub path: PathBuf,
    /// Branch created (or checked out) for the worktree
    pub branch: String,
    /// Open a pull request when the run finishes with completed tasks
    #[serde(default)]
    pub create_pr: bool,
    /// Base branch for the pull request (defaults to the main checkout's branch)
    #[serde(default)]
    pub pr_target_branch: Option<String>,
    /// Remove the worktree after the run instead of retaining it
    #[serde(default)]
    pub remove_on_completion: bool,
}

/// Immutable per-run input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub documents: Vec<DocumentRef>,
    pub prompt: String,
    #[serde(default)]
    pub loop_enabled: bool,
    #[serde(default)]
    pub max_loops: Option<u32>,
    #[serde(default)]
    pub worktree: Option<WorktreeConfig>,
    /// Pause at an error gate on agent failure; otherwise skip the task and continue
    #[serde(default = "default_true")]
    pub pause_on_error: bool,
}

fn default_true() -> bool {
    true
}

impl RunConfig {
    pub fn new(documents: Vec<DocumentRef>, prompt: impl Into<String>) -> Self {
        Self {
            documents,
            prompt: prompt.into(),
            loop_enabled: false,
            max_loops: None,
            worktree: None,
            pause_on_error: true,
        }
    }

    pub fn with_loop(mut self, max_loops: Option<u32>) -> Self {
        self.loop_enabled = true;
        self.max_loops = max_loops;
        self
    }

    pub fn with_worktree(mut self, worktree: WorktreeConfig) -> Self {
        self.worktree = Some(worktree);
        self
    }

    pub fn with_pause_on_error(mut self, pause: bool) -> Self {
        self.pause_on_error = pause;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.documents.is_empty() {
            return Err(ConfigError::NoDocuments);
        }
        if self.prompt.trim().is_empty() {
            return Err(ConfigError::EmptyPrompt);
        }
        if self.max_loops == Some(0) {
            return Err(ConfigError::ZeroMaxLoops);
        }
        let mut seen = HashSet::new();
        for doc in &self.documents {
            if !seen.insert(doc.filename.as_str()) {
                return Err(ConfigError::DuplicateDocument(doc.filename.clone()));
            }
        }
        if let Some(wt) = &self.worktree {
            if wt.branch.trim().is_empty() {
                return Err(ConfigError::EmptyWorktreeBranch);
            }
        }
        Ok(())
    }

    /// Whether any document is processed in place (not reset on completion)
    pub fn has_non_reset_documents(&self) -> bool {
        self.documents.iter().any(|d| !d.reset_on_completion)
    }
}

/// External agent command settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCommandConfig {
    #[serde(default = "default_agent_command")]
    pub command: String,
    #[serde(default = "default_agent_args")]
    pub args: Vec<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_agent_command() -> String {
    "claude".to_string()
}

fn default_agent_args() -> Vec<String> {
    vec![
        "--print".to_string(),
        "--output-format".to_string(),
        "json".to_string(),
    ]
}

impl Default for AgentCommandConfig {
    fn default() -> Self {
        Self {
            command: default_agent_command(),
            args: default_agent_args(),
            timeout_secs: None,
        }
    }
}

/// On-disk run description (`autorun.toml`)
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunFile {
    /// Folder holding the task documents, relative to the run file
    pub folder: PathBuf,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub prompt_file: Option<PathBuf>,
    pub documents: Vec<DocumentRef>,
    #[serde(default)]
    pub loop_enabled: bool,
    #[serde(default)]
    pub max_loops: Option<u32>,
    #[serde(default = "default_true")]
    pub pause_on_error: bool,
    #[serde(default)]
    pub worktree: Option<WorktreeConfig>,
    #[serde(default)]
    pub agent: AgentCommandConfig,
    #[serde(default)]
    pub session_name: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

impl RunFile {
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut file = Self::parse(&content, path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        file.resolve_relative_to(base);
        Ok(file)
    }

    /// Make relative folder, prompt and worktree paths relative to `base`
    pub fn resolve_relative_to(&mut self, base: &Path) {
        if self.folder.is_relative() {
            self.folder = base.join(&self.folder);
        }
        if let Some(prompt_file) = &self.prompt_file {
            if prompt_file.is_relative() {
                self.prompt_file = Some(base.join(prompt_file));
            }
        }
        if let Some(wt) = &mut self.worktree {
            if wt.path.is_relative() {
                wt.path = base.join(&wt.path);
            }
        }
    }

    /// Resolve the prompt text and build a validated run config
    pub fn to_run_config(&self) -> Result<RunConfig, ConfigError> {
        let prompt = match (&self.prompt, &self.prompt_file) {
            (Some(_), Some(_)) => return Err(ConfigError::AmbiguousPrompt),
            (Some(prompt), None) => prompt.clone(),
            (None, Some(path)) => {
                std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?
            }
            (None, None) => return Err(ConfigError::EmptyPrompt),
        };
        let config = RunConfig {
            documents: self.documents.clone(),
            prompt,
            loop_enabled: self.loop_enabled,
            max_loops: self.max_loops,
            worktree: self.worktree.clone(),
            pause_on_error: self.pause_on_error,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
