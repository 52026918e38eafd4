//! Interactive prompts for the values a mode needs.
//!
//! An empty answer keeps the value already in the configuration, which is the
//! built-in default unless a config file changed it.

use std::io::{self, BufRead, Write};

use strum::Display;

use crate::config::ProvisionConfig;

/// Asks the user a question and returns the raw answer line.
pub trait Prompter {
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

/// Prompts on stdout, reads answers from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", question)?;
        stdout.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    }
}

/// A value that can be asked for interactively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PromptField {
    Version,
    Password,
}

impl PromptField {
    pub fn question(self, config: &ProvisionConfig) -> String {
        match self {
            Self::Version => format!(
                "PostgreSQL version to install [{}]: ",
                config.version
            ),
            Self::Password => "Password for sudo and the new role [Enter for default]: ".to_string(),
        }
    }
}

/// Answer with its line ending stripped, or `fallback` if nothing was typed.
///
/// Passwords keep inner and surrounding spaces; only the line ending goes.
pub fn resolve_input(answer: &str, fallback: &str) -> String {
    let answer = answer.trim_end_matches(['\r', '\n']);
    if answer.is_empty() {
        fallback.to_string()
    } else {
        answer.to_string()
    }
}

/// Ask for each field in `fields` and store the answers in `config`.
pub fn apply_prompts(
    config: &mut ProvisionConfig,
    fields: &[PromptField],
    prompter: &mut dyn Prompter,
) -> io::Result<()> {
    for field in fields {
        let answer = prompter.ask(&field.question(config))?;
        match field {
            PromptField::Version => {
                config.version = resolve_input(answer.trim(), &config.version);
            }
            PromptField::Password => {
                config.password = resolve_input(&answer, &config.password);
            }
        }
        tracing::debug!(field = %field, "prompt answered");
    }
    Ok(())
}
