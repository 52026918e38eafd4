//! Pipeline run state machine
//!
//! `PipelineRun` is the authoritative record of one invocation: the ordered
//! step names, the index of the step in flight, a per-step history and the
//! terminal status. Transitions are validated so a step can never start before
//! its predecessor succeeded, and nothing moves once the run is terminal.
//!
//! ```text
//! NotStarted ──start──▶ Running ──advance (last step)──▶ Succeeded
//!                          │
//!                          └──fail──▶ FailedAt(step)
//! ```

use std::fmt;
use thiserror::Error;

use crate::error::CommandFailure;

/// Status of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    NotStarted,
    Running,
    Succeeded,
    /// Name of the first step whose predicate failed
    FailedAt(String),
}

impl RunStatus {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::FailedAt(_))
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::Running => write!(f, "running"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::FailedAt(step) => write!(f, "failed at {}", step),
        }
    }
}

/// Errors that can occur during state transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunTransitionError {
    #[error("Cannot transition from terminal status '{status}'")]
    FromTerminalState { status: RunStatus },

    #[error("Run has not been started")]
    NotStarted,

    #[error("Run was already started")]
    AlreadyStarted,

    #[error("Step '{step}' has not begun")]
    StepNotBegun { step: String },
}

/// One executed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub name: String,
    /// Seconds since UNIX_EPOCH when the step began
    pub started_at: u64,
    /// None while in flight
    pub succeeded: Option<bool>,
}

/// One execution of an ordered step sequence.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    steps: Vec<String>,
    current: usize,
    status: RunStatus,
    history: Vec<StepRecord>,
    failure: Option<CommandFailure>,
}

impl PipelineRun {
    pub fn new(steps: Vec<String>) -> Self {
        let capacity = steps.len();
        Self {
            steps,
            current: 0,
            status: RunStatus::NotStarted,
            history: Vec::with_capacity(capacity),
            failure: None,
        }
    }

    #[inline]
    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.steps.len()
    }

    pub fn step_names(&self) -> &[String] {
        &self.steps
    }

    /// Name of the step at the current index, if the run is still going.
    pub fn current_step(&self) -> Option<&str> {
        if self.status == RunStatus::Running {
            self.steps.get(self.current).map(String::as_str)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_succeeded(&self) -> bool {
        self.status == RunStatus::Succeeded
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self.status, RunStatus::FailedAt(_))
    }

    pub fn failed_at(&self) -> Option<&str> {
        match &self.status {
            RunStatus::FailedAt(step) => Some(step),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&CommandFailure> {
        self.failure.as_ref()
    }

    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    /// Names of every step whose action ran, in execution order.
    pub fn executed_steps(&self) -> Vec<&str> {
        self.history.iter().map(|r| r.name.as_str()).collect()
    }

    /// NotStarted -> Running. An empty run succeeds immediately.
    pub fn start(&mut self) -> Result<(), RunTransitionError> {
        match self.status {
            RunStatus::NotStarted => {}
            RunStatus::Running => return Err(RunTransitionError::AlreadyStarted),
            _ => {
                return Err(RunTransitionError::FromTerminalState {
                    status: self.status.clone(),
                })
            }
        }

        self.status = if self.steps.is_empty() {
            RunStatus::Succeeded
        } else {
            RunStatus::Running
        };
        Ok(())
    }

    /// Record that the current step's action is about to run.
    pub fn begin_step(&mut self) -> Result<&str, RunTransitionError> {
        self.ensure_running()?;

        let name = self.steps[self.current].clone();
        self.history.push(StepRecord {
            name,
            started_at: unix_now(),
            succeeded: None,
        });
        Ok(&self.steps[self.current])
    }

    /// The current step passed its predicate; move to the next one.
    pub fn advance(&mut self) -> Result<(), RunTransitionError> {
        self.finish_current(true)?;
        self.current += 1;
        if self.current == self.steps.len() {
            self.status = RunStatus::Succeeded;
        }
        Ok(())
    }

    /// The current step failed; the run becomes `FailedAt(step)`.
    pub fn fail(&mut self, failure: CommandFailure) -> Result<(), RunTransitionError> {
        self.finish_current(false)?;
        self.status = RunStatus::FailedAt(self.steps[self.current].clone());
        self.failure = Some(failure);
        Ok(())
    }

    fn ensure_running(&self) -> Result<(), RunTransitionError> {
        match self.status {
            RunStatus::Running => Ok(()),
            RunStatus::NotStarted => Err(RunTransitionError::NotStarted),
            _ => Err(RunTransitionError::FromTerminalState {
                status: self.status.clone(),
            }),
        }
    }

    fn finish_current(&mut self, succeeded: bool) -> Result<(), RunTransitionError> {
        self.ensure_running()?;

        let step = &self.steps[self.current];
        match self.history.last_mut() {
            Some(record) if record.name == *step && record.succeeded.is_none() => {
                record.succeeded = Some(succeeded);
                Ok(())
            }
            _ => Err(RunTransitionError::StepNotBegun { step: step.clone() }),
        }
    }
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn failure(step: &str) -> CommandFailure {
        CommandFailure {
            step: step.to_string(),
            action: "false".to_string(),
            detail: "exit code 1".to_string(),
        }
    }

    #[test]
    fn test_run_starts_not_started() {
        let run = PipelineRun::new(names(&["a", "b"]));
        assert_eq!(run.status(), &RunStatus::NotStarted);
        assert!(run.current_step().is_none());
        assert!(run.history().is_empty());
    }

    #[test]
    fn test_advance_through_all_steps() {
        let mut run = PipelineRun::new(names(&["a", "b", "c"]));
        run.start().expect("start");

        for expected in ["a", "b", "c"] {
            assert_eq!(run.begin_step().expect("begin"), expected);
            run.advance().expect("advance");
        }

        assert!(run.is_succeeded());
        assert_eq!(run.executed_steps(), vec!["a", "b", "c"]);
        assert!(run.history().iter().all(|r| r.succeeded == Some(true)));
    }

    #[test]
    fn test_empty_run_succeeds_on_start() {
        let mut run = PipelineRun::new(Vec::new());
        run.start().expect("start");
        assert!(run.is_succeeded());
    }

    #[test]
    fn test_fail_records_failed_at() {
        let mut run = PipelineRun::new(names(&["update", "install"]));
        run.start().expect("start");
        run.begin_step().expect("begin");
        run.advance().expect("advance");
        run.begin_step().expect("begin");
        run.fail(failure("install")).expect("fail");

        assert!(run.is_failed());
        assert_eq!(run.failed_at(), Some("install"));
        assert_eq!(run.status().to_string(), "failed at install");
        assert_eq!(run.failure().map(|f| f.step.as_str()), Some("install"));
        assert_eq!(run.history()[1].succeeded, Some(false));
    }

    #[test]
    fn test_cannot_advance_from_terminal_state() {
        let mut run = PipelineRun::new(names(&["a"]));
        run.start().expect("start");
        run.begin_step().expect("begin");
        run.fail(failure("a")).expect("fail");

        assert!(matches!(
            run.begin_step().unwrap_err(),
            RunTransitionError::FromTerminalState { .. }
        ));
        assert!(matches!(
            run.advance().unwrap_err(),
            RunTransitionError::FromTerminalState { .. }
        ));
    }

    #[test]
    fn test_cannot_advance_before_start() {
        let mut run = PipelineRun::new(names(&["a"]));
        assert_eq!(run.advance().unwrap_err(), RunTransitionError::NotStarted);
    }

    #[test]
    fn test_cannot_start_twice() {
        let mut run = PipelineRun::new(names(&["a"]));
        run.start().expect("start");
        assert_eq!(run.start().unwrap_err(), RunTransitionError::AlreadyStarted);
    }

    #[test]
    fn test_advance_requires_begun_step() {
        let mut run = PipelineRun::new(names(&["a", "b"]));
        run.start().expect("start");
        assert!(matches!(
            run.advance().unwrap_err(),
            RunTransitionError::StepNotBegun { .. }
        ));
    }
}
