//! Test helpers for behavioral specifications.
//!
//! Provides a small DSL for driving the autorun binary against a scratch
//! folder of task documents and a scripted shell agent.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use assert_cmd::Command as AssertCommand;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Returns the path to a binary, checking the llvm-cov target directory first
/// and otherwise resolving it next to the test binary.
#[allow(deprecated)]
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }
    assert_cmd::cargo::cargo_bin(name)
}

pub fn autorun_cmd() -> Command {
    Command::new(binary_path("autorun"))
}

/// Create a CLI builder for autorun commands
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// High-level CLI builder for fluent test assertions
pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            dir: None,
            envs: vec![
                ("NO_COLOR".into(), "1".into()),
                ("RUST_LOG".into(), "warn".into()),
                ("AUTORUN_DEBOUNCE_MS".into(), "0".into()),
                ("AUTORUN_AGENT_TIMEOUT_MS".into(), "10000".into()),
                ("AUTORUN_GIT_TIMEOUT_MS".into(), "5000".into()),
            ],
        }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((
            key.to_string(),
            value.as_ref().to_string_lossy().to_string(),
        ));
        self
    }

    /// Build the command without running it
    pub fn command(self) -> Command {
        let mut cmd = autorun_cmd();
        cmd.args(&self.args);
        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }
        cmd.env_remove("COLOR");
        for (key, value) in self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    /// Run and expect success (exit code 0)
    pub fn passes(self) -> RunAssert {
        self.exits_with(0)
    }

    /// Run and expect failure (non-zero exit code)
    pub fn fails(self) -> RunAssert {
        let assert = AssertCommand::from_std(self.command()).assert().failure();
        RunAssert {
            output: assert.get_output().clone(),
        }
    }

    /// Run and expect a specific exit code
    pub fn exits_with(self, code: i32) -> RunAssert {
        let assert = AssertCommand::from_std(self.command()).assert().code(code);
        RunAssert {
            output: assert.get_output().clone(),
        }
    }
}

/// Result of a CLI run for chaining assertions
pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    /// Assert stdout equals expected exactly (with diff on failure).
    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout does not contain '{}'\nstdout: {}",
            expected,
            stdout
        );
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr does not contain '{}'\nstderr: {}",
            expected,
            stderr
        );
        self
    }
}

// =============================================================================
// Agents
// =============================================================================

/// Checks off the first open task in the document whose path is the prompt
pub const CHECKING_AGENT: &str = r#"doc="$(cat)"
awk 'done == 0 && /- \[ \]/ { sub(/- \[ \]/, "- [x]"); done = 1 } { print }' "$doc" > "$doc.tmp"
mv "$doc.tmp" "$doc"
echo "Checked off the next task."
"#;

/// Reads the prompt and changes nothing
pub const IDLE_AGENT: &str = r#"cat > /dev/null
echo "Nothing to do here."
"#;

/// Always exits non-zero
pub const FAILING_AGENT: &str = r#"cat > /dev/null
echo "429 rate limit exceeded" >&2
exit 1
"#;

// =============================================================================
// Project
// =============================================================================

/// Scratch directory holding task documents, a run file and an agent script
pub struct Project {
    dir: tempfile::TempDir,
    /// Isolated AUTORUN_STATE_DIR for this test
    state_dir: tempfile::TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            state_dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn state_path(&self) -> &Path {
        self.state_dir.path()
    }

    /// Write a file at the given path (parent directories created automatically)
    pub fn file(&self, path: impl AsRef<Path>, content: &str) {
        let full_path = self.dir.path().join(path.as_ref());
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full_path, content).unwrap();
    }

    pub fn read(&self, path: impl AsRef<Path>) -> String {
        std::fs::read_to_string(self.dir.path().join(path.as_ref())).unwrap()
    }

    /// Task document `docs/<name>.md`
    pub fn doc(&self, name: &str, content: &str) {
        self.file(format!("docs/{}.md", name), content);
    }

    pub fn read_doc(&self, name: &str) -> String {
        self.read(format!("docs/{}.md", name))
    }

    /// Files under `docs/Runs`, sorted
    pub fn working_copies(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.path().join("docs/Runs")) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Write `agent.sh` and an `autorun.toml` that runs it over `documents`
    /// (name, reset_on_completion); `extra` holds additional top-level keys
    pub fn run_file(&self, agent: &str, documents: &[(&str, bool)], extra: &str) {
        self.file("agent.sh", agent);
        let mut toml = String::from("folder = \"docs\"\nprompt = \"{{DOCUMENT_PATH}}\"\n");
        toml.push_str(extra);
        toml.push_str(&format!(
            "\n[agent]\ncommand = \"sh\"\nargs = [\"{}\"]\n",
            self.path().join("agent.sh").display()
        ));
        for (name, reset) in documents {
            toml.push_str(&format!(
                "\n[[documents]]\nfilename = \"{}\"\nreset_on_completion = {}\n",
                name, reset
            ));
        }
        self.file("autorun.toml", &toml);
    }

    /// Run autorun in this project's context
    pub fn autorun(&self) -> CliBuilder {
        cli()
            .pwd(self.path())
            .env("AUTORUN_STATE_DIR", self.state_path())
    }

    /// History records written for `session`
    pub fn history(&self, session: &str) -> Vec<serde_json::Value> {
        let path = self
            .state_path()
            .join("history")
            .join(format!("{}.jsonl", session));
        std::fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }
}
