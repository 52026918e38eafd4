//! Pre-flight checks for `test` mode
//!
//! Verifies that every binary a profile shells out to resolves on `PATH`
//! (`which` on Unix, `where` on Windows). Each binary becomes one
//! `check-<binary>` step, so the checks run and report through the same
//! pipeline as setup and uninstall. Nothing here changes the system.

use crate::command_runner::CommandRunner;
use crate::command_traits::CommandArgs;
use crate::pipeline::{check_passed, Outcome, Step};

/// `which <binary>` / `where <binary>`
#[derive(Debug, Clone)]
pub struct LocateArgs {
    pub binary: String,
}

impl CommandArgs for LocateArgs {
    fn program(&self) -> String {
        if cfg!(windows) {
            "where".to_string()
        } else {
            "which".to_string()
        }
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![self.binary.clone()]
    }
}

/// Check if a binary is available in PATH
pub fn binary_exists(runner: &dyn CommandRunner, name: &str) -> bool {
    let command = LocateArgs {
        binary: name.to_string(),
    }
    .to_command();
    runner
        .run(&command)
        .map(|output| output.success)
        .unwrap_or(false)
}

/// One `check-<binary>` step per binary.
pub fn preflight_steps<'a>(binaries: &[&str], runner: &'a dyn CommandRunner) -> Vec<Step<'a>> {
    binaries
        .iter()
        .map(|binary| {
            let description = LocateArgs {
                binary: binary.to_string(),
            }
            .to_command()
            .to_string();
            let name = binary.to_string();
            Step::new(
                format!("check-{}", binary),
                description,
                move || {
                    let found = binary_exists(runner, &name);
                    if !found {
                        tracing::warn!("Required binary not found: {}", name);
                    }
                    Ok(Outcome::Check(found))
                },
                check_passed,
            )
        })
        .collect()
}

/// Package that provides `binary`, for the hint printed after a failed check.
pub fn package_for_binary(binary: &str) -> Option<&'static str> {
    match binary {
        "sudo" => Some("sudo"),
        "apt-get" => Some("apt"),
        "which" => Some("debianutils"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_runner::{CommandOutput, SystemRunner};
    use crate::command_traits::ShellCommand;
    use crate::error::Result;
    use crate::pipeline;
    use crate::report::NullObserver;

    /// Knows a fixed set of binaries.
    struct FakePath(&'static [&'static str]);

    impl CommandRunner for FakePath {
        fn run(&self, command: &ShellCommand) -> Result<CommandOutput> {
            if self.0.contains(&command.args[0].as_str()) {
                Ok(CommandOutput::ok(format!("/usr/bin/{}", command.args[0])))
            } else {
                Ok(CommandOutput::failed(1, ""))
            }
        }
    }

    #[test]
    fn test_preflight_all_present() {
        let runner = FakePath(&["sudo", "apt-get"]);
        let steps = preflight_steps(&["sudo", "apt-get"], &runner);

        let run = pipeline::run(steps, &mut NullObserver);

        assert!(run.is_succeeded());
        assert_eq!(run.executed_steps(), vec!["check-sudo", "check-apt-get"]);
    }

    #[test]
    fn test_preflight_stops_at_missing_binary() {
        let runner = FakePath(&["sudo"]);
        let steps = preflight_steps(&["apt-get", "sudo"], &runner);

        let run = pipeline::run(steps, &mut NullObserver);

        assert_eq!(run.failed_at(), Some("check-apt-get"));
        assert_eq!(run.failure().unwrap().detail, "check failed");
    }

    #[test]
    fn test_binary_exists_with_fake() {
        let runner = FakePath(&["reg"]);
        assert!(binary_exists(&runner, "reg"));
        assert!(!binary_exists(&runner, "sc"));
    }

    #[cfg(unix)]
    #[test]
    fn test_binary_exists_nonexistent() {
        assert!(!binary_exists(
            &SystemRunner::new(),
            "this_binary_definitely_does_not_exist_12345"
        ));
    }

    #[test]
    fn test_package_mapping() {
        assert_eq!(package_for_binary("apt-get"), Some("apt"));
        assert_eq!(package_for_binary("net"), None);
    }
}
