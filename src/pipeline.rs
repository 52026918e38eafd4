//! Provisioning pipeline
//!
//! A pipeline is an ordered list of `Step`s. Each step has a name, a printable
//! description of what it does, an action and a success predicate over the
//! action's `Outcome`. `run` executes the steps strictly in order and stops at
//! the first step whose predicate fails (or whose action could not be carried
//! out at all). There are no retries and no rollback.

use crate::command_runner::{CommandOutput, CommandRunner};
use crate::command_traits::CommandArgs;
use crate::error::{CommandFailure, Result};
use crate::report::RunObserver;
use crate::run_state::PipelineRun;

/// What a step's action produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// An external command finished
    Command(CommandOutput),
    /// A value read back from a collaborator
    Value(String),
    /// A plain yes/no check
    Check(bool),
}

impl Outcome {
    /// Short human-readable form, used as failure detail.
    pub fn describe(&self) -> String {
        match self {
            Self::Command(output) => {
                let code = output
                    .exit_code
                    .map(|c| format!("exit code {}", c))
                    .unwrap_or_else(|| "terminated by signal".to_string());
                match output.stderr.trim().lines().last() {
                    Some(line) if !line.is_empty() => format!("{}: {}", code, line),
                    _ => code,
                }
            }
            Self::Value(value) => format!("read back \"{}\"", value),
            Self::Check(passed) => {
                if *passed {
                    "check passed".to_string()
                } else {
                    "check failed".to_string()
                }
            }
        }
    }
}

/// Step action: runs once, no arguments.
pub type Action<'a> = Box<dyn FnMut() -> Result<Outcome> + 'a>;

/// Success predicate over an action's outcome.
pub type Predicate<'a> = Box<dyn Fn(&Outcome) -> bool + 'a>;

/// One provisioning action with a success predicate.
pub struct Step<'a> {
    name: String,
    description: String,
    action: Action<'a>,
    predicate: Predicate<'a>,
}

impl<'a> Step<'a> {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        action: impl FnMut() -> Result<Outcome> + 'a,
        predicate: impl Fn(&Outcome) -> bool + 'a,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            action: Box::new(action),
            predicate: Box::new(predicate),
        }
    }

    /// A step that runs one external command and succeeds on exit code 0.
    pub fn command<A: CommandArgs>(
        name: impl Into<String>,
        runner: &'a dyn CommandRunner,
        args: &A,
    ) -> Self {
        let command = args.to_command();
        let description = command.to_string();
        Self::new(
            name,
            description,
            move || runner.run(&command).map(Outcome::Command),
            exit_success,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl std::fmt::Debug for Step<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Predicate: the command exited with code 0.
pub fn exit_success(outcome: &Outcome) -> bool {
    matches!(outcome, Outcome::Command(output) if output.success)
}

/// Predicate: the read-back value contains `expected`.
pub fn value_contains(expected: impl Into<String>) -> impl Fn(&Outcome) -> bool {
    let expected = expected.into();
    move |outcome: &Outcome| matches!(outcome, Outcome::Value(value) if value.contains(expected.as_str()))
}

/// Predicate: the check passed.
pub fn check_passed(outcome: &Outcome) -> bool {
    matches!(outcome, Outcome::Check(true))
}

/// Execute `steps` in order, stopping at the first failure.
pub fn run(steps: Vec<Step<'_>>, observer: &mut dyn RunObserver) -> PipelineRun {
    let mut state = PipelineRun::new(steps.iter().map(|s| s.name.clone()).collect());
    let total = steps.len();

    if let Err(e) = state.start() {
        tracing::error!("run state rejected start: {}", e);
        return state;
    }

    for (index, mut step) in steps.into_iter().enumerate() {
        observer.step_started(index, total, &step);
        if let Err(e) = state.begin_step() {
            tracing::error!("run state rejected step '{}': {}", step.name, e);
            break;
        }
        tracing::info!(step = %step.name, "starting step");

        let failure_detail = match (step.action)() {
            Ok(outcome) if (step.predicate)(&outcome) => {
                observer.step_succeeded(index, &step, &outcome);
                None
            }
            Ok(outcome) => Some(outcome.describe()),
            Err(e) => Some(e.to_string()),
        };

        match failure_detail {
            None => {
                if let Err(e) = state.advance() {
                    tracing::error!("run state rejected advance past '{}': {}", step.name, e);
                    break;
                }
            }
            Some(detail) => {
                let failure = CommandFailure {
                    step: step.name.clone(),
                    action: step.description.clone(),
                    detail,
                };
                tracing::error!(step = %failure.step, action = %failure.action, "{}", failure.detail);
                observer.step_failed(index, &failure);
                if let Err(e) = state.fail(failure) {
                    tracing::error!("run state rejected failure of '{}': {}", step.name, e);
                }
                break;
            }
        }
    }

    observer.run_finished(&state);
    state
}

/// Name and description of each step, without executing anything.
pub fn plan(steps: &[Step<'_>]) -> Vec<(String, String)> {
    steps
        .iter()
        .map(|s| (s.name.clone(), s.description.clone()))
        .collect()
}
