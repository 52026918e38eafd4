//! External command execution
//!
//! `CommandRunner` is the seam every provisioning step goes through to run a
//! program. `SystemRunner` is the real implementation:
//!
//! - Spawns the child in a new process group and registers its PID with
//!   `ChildRegistry::global()` so an interrupted run cleans up after itself
//! - Writes the command's stdin (e.g. the sudo password) and closes it
//! - Captures stdout/stderr and reports the exit code
//!
//! A non-zero exit code is NOT an `Err`: the caller's success predicate
//! decides what counts as success. `Err` means the program could not be run.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::command_traits::ShellCommand;
use crate::error::Result;
use crate::process_guard::{ChildRegistry, CommandProcessGroup};

/// Output from a command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    /// Whether the command exited successfully (exit code 0).
    pub success: bool,
}

impl CommandOutput {
    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
            success: true,
        }
    }

    /// Failed output with the given exit code and stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code: Some(exit_code),
            success: false,
        }
    }
}

/// Runs external commands.
pub trait CommandRunner {
    fn run(&self, command: &ShellCommand) -> Result<CommandOutput>;
}

/// Runs commands on the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ShellCommand) -> Result<CommandOutput> {
        tracing::info!(command = %command, "running command");

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(command.env.iter().map(|(k, v)| (k, v)))
            .stdin(if command.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .in_new_process_group();

        let mut child = cmd.spawn()?;
        let pid = child.id();
        if let Ok(mut registry) = ChildRegistry::global().lock() {
            registry.register(pid);
        }

        if let (Some(input), Some(mut stdin)) = (command.stdin.as_deref(), child.stdin.take()) {
            // A child that exits before reading stdin closes the pipe; its
            // exit code carries the real failure.
            if let Err(e) = stdin.write_all(input.as_bytes()) {
                tracing::debug!("stdin write to {} failed: {}", command.program, e);
            }
        }

        let waited = child.wait_with_output();

        if let Ok(mut registry) = ChildRegistry::global().lock() {
            registry.unregister(pid);
        }

        let output = waited?;
        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
            success: output.status.success(),
        };

        if result.success {
            tracing::info!(program = %command.program, "command succeeded");
        } else {
            tracing::warn!(
                program = %command.program,
                exit_code = result.exit_code.unwrap_or(-1),
                stderr = %result.stderr.trim(),
                "command failed"
            );
        }

        Ok(result)
    }
}
