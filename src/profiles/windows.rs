//! Windows profile: EnterpriseDB binary zip, machine environment in the
//! registry, PostgreSQL registered as a Windows service.

use std::path::Path;

use crate::commands::windows::{
    InitDbArgs, NetServiceArgs, PgCtlRegisterArgs, ScDeleteArgs, ServiceAction,
};
use crate::config::ProvisionConfig;
use crate::env_store::ConfigStore;
use crate::error::Result;
use crate::pipeline::{check_passed, value_contains, Outcome, Step};
use crate::prompt::PromptField;
use crate::types::{Mode, PlatformKind};

use super::{PlatformProfile, Toolbox};

/// Entry prepended to the machine `Path`.
pub const PATH_ENTRY: &str = "%PGHOME%/bin";

#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsProfile;

/// Forward-slash form of a path, as written into the environment.
fn slash_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

/// Write `name = value`, then read it back. Passes when the read-back value
/// contains what was written.
fn set_env_step<'a>(store: &'a dyn ConfigStore, name: &str, value: String) -> Step<'a> {
    let description = format!("set {} = {}", store.describe(name), value);
    let var = name.to_string();
    let expected = value.clone();
    Step::new(
        format!("set-{}", name),
        description,
        move || {
            store.set(&var, &value)?;
            Ok(Outcome::Value(store.get(&var)?.unwrap_or_default()))
        },
        value_contains(expected),
    )
}

/// Prepend `%PGHOME%/bin` to the machine `Path`, keeping what is there.
fn set_path_step(store: &dyn ConfigStore) -> Step<'_> {
    let description = format!("set {} = {};<existing Path>", store.describe("Path"), PATH_ENTRY);
    Step::new(
        "set-Path",
        description,
        move || {
            let existing = store.get("Path")?.unwrap_or_default();
            let value = if existing.split(';').any(|entry| entry == PATH_ENTRY) {
                existing
            } else if existing.is_empty() {
                PATH_ENTRY.to_string()
            } else {
                format!("{};{}", PATH_ENTRY, existing)
            };
            store.set("Path", &value)?;
            Ok(Outcome::Value(store.get("Path")?.unwrap_or_default()))
        },
        value_contains(PATH_ENTRY),
    )
}

impl PlatformProfile for WindowsProfile {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Windows
    }

    fn prompts(&self, mode: Mode) -> Vec<PromptField> {
        match mode {
            Mode::Setup => vec![PromptField::Version],
            Mode::Uninstall | Mode::Test => Vec::new(),
        }
    }

    fn required_binaries(&self) -> &'static [&'static str] {
        &["net", "sc", "reg"]
    }

    fn setup_steps<'a>(&self, config: &ProvisionConfig, tools: Toolbox<'a>) -> Result<Vec<Step<'a>>> {
        let url = config.download_url();
        let archive = config.archive_path();
        let install_dir = config.install_dir();
        let pg_home = config.pg_home();
        let pg_home_value = slash_path(&pg_home);
        let fetcher = tools.fetcher;
        let extractor = tools.extractor;

        let download = {
            let description = format!("download {} -> {}", url, archive.display());
            let archive = archive.clone();
            Step::new(
                "download",
                description,
                move || fetcher.fetch(&url, &archive).map(|_| Outcome::Check(true)),
                check_passed,
            )
        };

        let extract = {
            let description = format!("extract {} -> {}", archive.display(), install_dir.display());
            Step::new(
                "extract",
                description,
                move || {
                    extractor
                        .extract(&archive, &install_dir)
                        .map(|_| Outcome::Check(true))
                },
                check_passed,
            )
        };

        let verify = {
            let description = format!("test -d {}", pg_home.display());
            let pg_home = pg_home.clone();
            Step::new(
                "verify-install-dir",
                description,
                move || Ok(Outcome::Check(pg_home.is_dir())),
                check_passed,
            )
        };

        let service = config.service_name.clone();
        Ok(vec![
            download,
            extract,
            verify,
            set_env_step(tools.store, "PGHOME", pg_home_value),
            set_env_step(tools.store, "PGDATA", "%PGHOME%/data".to_string()),
            set_env_step(tools.store, "PGLIB", "%PGHOME%/lib".to_string()),
            set_env_step(tools.store, "PGHOST", config.pg_host.clone()),
            set_path_step(tools.store),
            Step::command("initdb", tools.runner, &InitDbArgs { pg_home: pg_home.clone() }),
            Step::command(
                "register-service",
                tools.runner,
                &PgCtlRegisterArgs {
                    pg_home,
                    service: service.clone(),
                },
            ),
            Step::command(
                "start-service",
                tools.runner,
                &NetServiceArgs {
                    action: ServiceAction::Start,
                    service,
                },
            ),
        ])
    }

    fn uninstall_steps<'a>(
        &self,
        config: &ProvisionConfig,
        tools: Toolbox<'a>,
    ) -> Result<Vec<Step<'a>>> {
        let service = config.service_name.clone();
        Ok(vec![
            Step::command(
                "stop-service",
                tools.runner,
                &NetServiceArgs {
                    action: ServiceAction::Stop,
                    service: service.clone(),
                },
            ),
            Step::command("delete-service", tools.runner, &ScDeleteArgs { service }),
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

    fn names(steps: &[Step<'_>]) -> Vec<String> {
        steps.iter().map(|s| s.name().to_string()).collect()
    }

    #[test]
    fn test_setup_step_order() {
        let runner = RecordingRunner::default();
        let store = MemoryStore::new();
        let tools = Toolbox {
            runner: &runner,
            fetcher: &NoFetch,
            extractor: &NoExtract,
            store: &store,
        };

        let steps = WindowsProfile
            .steps(Mode::Setup, &ProvisionConfig::default(), tools)
            .unwrap();

        assert_eq!(
            names(&steps),
            vec![
                "download",
                "extract",
                "verify-install-dir",
                "set-PGHOME",
                "set-PGDATA",
                "set-PGLIB",
                "set-PGHOST",
                "set-Path",
                "initdb",
                "register-service",
                "start-service",
            ]
        );
        assert!(steps[0].description().contains("postgresql-9.3.10-2-windows"));
        assert!(steps[8].description().contains("initdb.exe"));
        assert!(steps[8].description().ends_with("-E UTF8 --locale=C"));
        assert_eq!(steps[10].description(), "net start pgsql");
    }

    #[test]
    fn test_uninstall_runs_net_stop_then_sc_delete() {
        let runner = RecordingRunner::default();
        let store = MemoryStore::new();
        let tools = Toolbox {
            runner: &runner,
            fetcher: &NoFetch,
            extractor: &NoExtract,
            store: &store,
        };

        let steps = WindowsProfile
            .steps(Mode::Uninstall, &ProvisionConfig::default(), tools)
            .unwrap();
        let run = pipeline::run(steps, &mut NullObserver);

        assert!(run.is_succeeded());
        let calls = runner.calls.borrow();
        assert_eq!(calls[0].to_string(), "net stop pgsql");
        assert_eq!(calls[1].to_string(), "sc delete pgsql");
    }

    #[test]
    fn test_env_steps_write_and_verify() {
        let store = MemoryStore::with_values([("Path", "C:/Windows")]);
        let steps = vec![
            set_env_step(&store, "PGHOME", "D:/PostgreSQL9.3.10/pgsql".to_string()),
            set_env_step(&store, "PGDATA", "%PGHOME%/data".to_string()),
            set_path_step(&store),
        ];

        let run = pipeline::run(steps, &mut NullObserver);

        assert!(run.is_succeeded());
        let values = store.snapshot();
        assert_eq!(values["PGHOME"], "D:/PostgreSQL9.3.10/pgsql");
        assert_eq!(values["PGDATA"], "%PGHOME%/data");
        assert_eq!(values["Path"], "%PGHOME%/bin;C:/Windows");
    }

    #[test]
    fn test_path_entry_not_duplicated() {
        let store = MemoryStore::with_values([("Path", "%PGHOME%/bin;C:/Windows")]);

        let run = pipeline::run(vec![set_path_step(&store)], &mut NullObserver);

        assert!(run.is_succeeded());
        assert_eq!(store.snapshot()["Path"], "%PGHOME%/bin;C:/Windows");
    }

    /// A store whose writes never stick.
    struct ForgetfulStore;

    impl ConfigStore for ForgetfulStore {
        fn set(&self, _name: &str, _value: &str) -> Result<()> {
            Ok(())
        }

        fn get(&self, _name: &str) -> Result<Option<String>> {
            Ok(Some("C:/something/else".to_string()))
        }
    }

    #[test]
    fn test_env_step_fails_when_read_back_differs() {
        let steps = vec![
            set_env_step(&ForgetfulStore, "PGHOME", "D:/pg".to_string()),
            set_env_step(&ForgetfulStore, "PGDATA", "%PGHOME%/data".to_string()),
        ];

        let run = pipeline::run(steps, &mut NullObserver);

        assert_eq!(run.failed_at(), Some("set-PGHOME"));
        assert_eq!(run.executed_steps(), vec!["set-PGHOME"]);
    }

    #[test]
    fn test_prompts_version_on_setup_only() {
        assert_eq!(WindowsProfile.prompts(Mode::Setup), vec![PromptField::Version]);
        assert!(WindowsProfile.prompts(Mode::Uninstall).is_empty());
    }
}
