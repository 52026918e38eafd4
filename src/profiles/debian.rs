//! Debian/Ubuntu profile: apt packages, then a superuser role and a database
//! created through `psql` as the `postgres` account.

use crate::commands::apt::{AptInstallArgs, AptPurgeArgs, AptUpdateArgs, RemoveDirsArgs};
use crate::commands::psql::{CreateDatabaseArgs, CreateRoleArgs};
use crate::config::ProvisionConfig;
use crate::error::{ProvisionError, Result};
use crate::pipeline::Step;
use crate::prompt::PromptField;
use crate::types::{Mode, PlatformKind};

use super::{PlatformProfile, Toolbox};

#[derive(Debug, Default, Clone, Copy)]
pub struct DebianProfile;

impl PlatformProfile for DebianProfile {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Debian
    }

    fn prompts(&self, mode: Mode) -> Vec<PromptField> {
        match mode {
            Mode::Setup | Mode::Uninstall => vec![PromptField::Password],
            Mode::Test => Vec::new(),
        }
    }

    fn required_binaries(&self) -> &'static [&'static str] {
        &["sudo", "apt-get"]
    }

    fn setup_steps<'a>(&self, config: &ProvisionConfig, tools: Toolbox<'a>) -> Result<Vec<Step<'a>>> {
        let role = config
            .role_name()
            .map_err(|e| ProvisionError::config(e.to_string()))?;
        let password = config.password.clone();

        Ok(vec![
            Step::command(
                "update",
                tools.runner,
                &AptUpdateArgs {
                    sudo_password: password.clone(),
                },
            ),
            Step::command(
                "install-package",
                tools.runner,
                &AptInstallArgs {
                    packages: config.packages.clone(),
                    sudo_password: password.clone(),
                },
            ),
            Step::command(
                "create-role",
                tools.runner,
                &CreateRoleArgs {
                    role: role.clone(),
                    role_password: password.clone(),
                    sudo_password: password.clone(),
                },
            ),
            Step::command(
                "create-database",
                tools.runner,
                &CreateDatabaseArgs {
                    name: config.db_name.clone(),
                    owner: role,
                    sudo_password: password,
                },
            ),
        ])
    }

    fn uninstall_steps<'a>(
        &self,
        config: &ProvisionConfig,
        tools: Toolbox<'a>,
    ) -> Result<Vec<Step<'a>>> {
        let password = config.password.clone();
        Ok(vec![
            Step::command(
                "purge-packages",
                tools.runner,
                &AptPurgeArgs {
                    pattern: config.purge_pattern.clone(),
                    sudo_password: password.clone(),
                },
            ),
            Step::command(
                "remove-data-dirs",
                tools.runner,
                &RemoveDirsArgs {
                    dirs: config.data_dirs.clone(),
                    sudo_password: password,
                },
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::env_store::MemoryStore;
    use crate::pipeline;
    use crate::report::NullObserver;

    fn config() -> ProvisionConfig {
        ProvisionConfig {
            superuser: Some("alice".to_string()),
            password: "hunter2".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_setup_commands() {
        let runner = RecordingRunner::default();
        let store = MemoryStore::new();
        let tools = Toolbox {
            runner: &runner,
            fetcher: &NoFetch,
            extractor: &NoExtract,
            store: &store,
        };

        let steps = DebianProfile.steps(Mode::Setup, &config(), tools).unwrap();
        let names: Vec<&str> = steps.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["update", "install-package", "create-role", "create-database"]
        );
        for step in &steps {
            assert!(!step.description().contains("hunter2"), "{}", step.description());
        }

        let run = pipeline::run(steps, &mut NullObserver);
        assert!(run.is_succeeded());

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 4);
        assert!(calls.iter().all(|c| c.program == "sudo"));
        assert!(calls.iter().all(|c| c.stdin.as_deref() == Some("hunter2\n")));
        assert_eq!(
            calls[1].args[3..],
            ["apt-get", "-y", "install", "postgresql", "postgresql-contrib"]
        );
        assert!(calls[2].args.last().unwrap().starts_with("CREATE USER \"alice\""));
        assert_eq!(
            calls[3].args.last().unwrap(),
            "CREATE DATABASE \"test\" WITH OWNER \"alice\""
        );
    }

    #[test]
    fn test_uninstall_commands() {
        let runner = RecordingRunner::default();
        let store = MemoryStore::new();
        let tools = Toolbox {
            runner: &runner,
            fetcher: &NoFetch,
            extractor: &NoExtract,
            store: &store,
        };

        let steps = DebianProfile.steps(Mode::Uninstall, &config(), tools).unwrap();
        let run = pipeline::run(steps, &mut NullObserver);

        assert!(run.is_succeeded());
        let calls = runner.calls.borrow();
        assert_eq!(calls[0].args[3..], ["apt-get", "-y", "--purge", "remove", "postgresql*"]);
        assert_eq!(
            calls[1].args,
            vec![
                "-S",
                "rm",
                "-rf",
                "/var/lib/postgresql/",
                "/var/log/postgresql/",
                "/etc/postgresql/"
            ]
        );
    }

    #[test]
    fn test_prompts_password_for_mutating_modes() {
        assert_eq!(DebianProfile.prompts(Mode::Setup), vec![PromptField::Password]);
        assert_eq!(DebianProfile.prompts(Mode::Uninstall), vec![PromptField::Password]);
        assert!(DebianProfile.prompts(Mode::Test).is_empty());
    }
}
