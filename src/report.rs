//! Progress reporting for pipeline runs.
//!
//! The pipeline never prints. It calls a `RunObserver`, and `ConsoleReporter`
//! turns those calls into the sequential progress lines users see on stdout.

use std::io::{self, Write};

use crate::error::CommandFailure;
use crate::pipeline::{Outcome, Step};
use crate::run_state::{PipelineRun, RunStatus};

/// Receives pipeline progress. Every method defaults to doing nothing.
pub trait RunObserver {
    fn step_started(&mut self, _index: usize, _total: usize, _step: &Step<'_>) {}

    fn step_succeeded(&mut self, _index: usize, _step: &Step<'_>, _outcome: &Outcome) {}

    fn step_failed(&mut self, _index: usize, _failure: &CommandFailure) {}

    fn run_finished(&mut self, _run: &PipelineRun) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl RunObserver for NullObserver {}

/// Prints one line per step.
///
/// ```text
/// [1/4] update ... ok
/// [2/4] install-package ... FAILED
///   ✗ command: sudo -S env DEBIAN_FRONTEND=noninteractive apt-get -y install postgresql postgresql-contrib < <stdin redacted>
///   ✗ reason:  exit code 100: E: Unable to locate package
/// ```
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    // Progress output is best effort; a closed stdout must not abort the run.
    fn emit(&mut self, line: std::fmt::Arguments<'_>) {
        let _ = self.out.write_fmt(line);
        let _ = self.out.flush();
    }
}

impl<W: Write> RunObserver for ConsoleReporter<W> {
    fn step_started(&mut self, index: usize, total: usize, step: &Step<'_>) {
        self.emit(format_args!("[{}/{}] {} ... ", index + 1, total, step.name()));
    }

    fn step_succeeded(&mut self, _index: usize, _step: &Step<'_>, _outcome: &Outcome) {
        self.emit(format_args!("ok\n"));
    }

    fn step_failed(&mut self, _index: usize, failure: &CommandFailure) {
        self.emit(format_args!(
            "FAILED\n  ✗ command: {}\n  ✗ reason:  {}\n",
            failure.action, failure.detail
        ));
    }

    fn run_finished(&mut self, run: &PipelineRun) {
        match run.status() {
            RunStatus::Succeeded => {
                self.emit(format_args!("✓ Completed {} step(s) successfully\n", run.total()))
            }
            RunStatus::FailedAt(step) => self.emit(format_args!(
                "✗ Stopped at step '{}' ({} of {} step(s) completed)\n",
                step,
                run.current_index(),
                run.total()
            )),
            _ => {}
        }
    }
}

/// Print a dry-run plan.
pub fn write_plan<W: Write>(out: &mut W, plan: &[(String, String)]) -> io::Result<()> {
    if plan.is_empty() {
        writeln!(out, "Nothing to do")?;
        return Ok(());
    }
    for (i, (name, description)) in plan.iter().enumerate() {
        writeln!(out, "[{}/{}] {}", i + 1, plan.len(), name)?;
        writeln!(out, "      {}", description)?;
    }
    Ok(())
}
