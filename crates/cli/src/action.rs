//! The action fired once a burst of changes settles.
//!
//! [`ShellAction`] is the production runner: it executes an external command
//! with all three standard streams inherited so build output lands on the
//! operator's terminal live. The [`ActionRunner`] trait exists so the watch
//! loop can be tested with a recording fake instead of real processes.

use std::process::{Command, Stdio};

/// Command line used when the operator does not supply one.
pub const DEFAULT_COMMAND: &[&str] = &["bash", "./run.sh"];

/// Result of one action invocation.
///
/// Observed by the loop for logging and never escalated: the watch must
/// outlive a broken build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The command ran and exited zero.
    Success,
    /// The command exited nonzero or could not be started.
    Failed(String),
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Success)
    }
}

/// A runnable action. Implementations block until the action completes.
pub trait ActionRunner {
    fn run(&mut self) -> ActionOutcome;
}

/// Runs an external command in the current working directory.
pub struct ShellAction {
    program: String,
    args: Vec<String>,
}

impl ShellAction {
    /// Build from an argv-style command line. An empty line falls back to
    /// [`DEFAULT_COMMAND`].
    pub fn new(command: Vec<String>) -> Self {
        let mut parts = command;
        if parts.is_empty() {
            parts = DEFAULT_COMMAND.iter().map(|s| s.to_string()).collect();
        }
        let program = parts.remove(0);
        Self {
            program,
            args: parts,
        }
    }

    /// The command line as the operator would type it, for banners.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl ActionRunner for ShellAction {
    fn run(&mut self) -> ActionOutcome {
        let status = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status();

        match status {
            Ok(status) if status.success() => ActionOutcome::Success,
            Ok(status) => ActionOutcome::Failed(format!("`{}` failed: {status}", self.program)),
            Err(err) => ActionOutcome::Failed(format!("failed to start {}: {err}", self.program)),
        }
    }
}
