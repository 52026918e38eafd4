//! Type-safe command argument contracts.
//!
//! This module provides the `CommandArgs` trait for building the external
//! commands a provisioning step runs. Instead of concatenating shell strings,
//! Rust structs implement this trait to produce the program, its argument
//! vector, environment and stdin. Nothing goes through a shell, so values such
//! as passwords are never subject to shell quoting.

use std::fmt;

/// Trait for typed command arguments.
///
/// # Contract
///
/// - `program()`: the executable to spawn (e.g. `sudo`, `net`, a path to `initdb.exe`).
/// - `to_cli_args()`: arguments exactly as the program expects them.
/// - `get_env_vars()`: extra environment variables for the child.
/// - `stdin()`: bytes written to the child's stdin, if any.
/// - `secrets()`: values that must never be logged. An argument equal to a
///   secret prints as `***`, and stdin is hidden entirely.
/// - `redacted_cli_args()`: printable arguments for commands that embed a
///   secret inside a larger argument (an SQL statement, say).
pub trait CommandArgs {
    /// The program to execute.
    fn program(&self) -> String;

    /// Convert struct fields to CLI arguments.
    fn to_cli_args(&self) -> Vec<String>;

    /// Get required environment variables.
    fn get_env_vars(&self) -> Vec<(String, String)> {
        vec![]
    }

    /// Data piped into the child's stdin.
    fn stdin(&self) -> Option<String> {
        None
    }

    /// Secret values carried in args or stdin.
    fn secrets(&self) -> Vec<String> {
        vec![]
    }

    /// Arguments as they should be printed, when that differs from
    /// `to_cli_args()`.
    fn redacted_cli_args(&self) -> Option<Vec<String>> {
        None
    }

    /// Build the concrete command.
    fn to_command(&self) -> ShellCommand {
        ShellCommand {
            program: self.program(),
            args: self.to_cli_args(),
            env: self.get_env_vars(),
            stdin: self.stdin(),
            secrets: self.secrets(),
            redacted_args: self.redacted_cli_args(),
        }
    }
}

/// A fully built external command, ready for a `CommandRunner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub stdin: Option<String>,
    pub secrets: Vec<String>,
    /// Printable replacement for `args`
    pub redacted_args: Option<Vec<String>>,
}

impl ShellCommand {
    /// Command with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            stdin: None,
            secrets: Vec::new(),
            redacted_args: None,
        }
    }

    /// Append arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Printable form used in logs, plans and failure messages.
///
/// Arguments with whitespace are double-quoted. An argument equal to a secret
/// is shown as `***`; substrings are left alone, so a short secret cannot
/// mangle the rest of the command. Stdin is shown as `<stdin redacted>` when
/// the command has secrets.
impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote_arg(self.mask(&self.program)))?;
        for arg in self.redacted_args.as_ref().unwrap_or(&self.args) {
            write!(f, " {}", quote_arg(self.mask(arg)))?;
        }
        if self.stdin.is_some() {
            if !self.secrets.is_empty() {
                write!(f, " < <stdin redacted>")?;
            } else {
                write!(f, " < <stdin>")?;
            }
        }
        Ok(())
    }
}

impl ShellCommand {
    fn mask<'s>(&self, arg: &'s str) -> &'s str {
        if self.secrets.iter().any(|s| !s.is_empty() && s == arg) {
            "***"
        } else {
            arg
        }
    }
}

fn quote_arg(arg: &str) -> String {
    if arg.is_empty() || arg.chars().any(char::is_whitespace) {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}
