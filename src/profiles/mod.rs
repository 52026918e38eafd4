//! Platform profiles.
//!
//! A profile knows, for each mode, which steps to run, which values to ask
//! the user for and which binaries must be on `PATH`. Profiles only assemble
//! steps; the pipeline runs them.
//!
//! | Profile | setup | uninstall |
//! |---------|-------|-----------|
//! | Windows | download, extract, verify-install-dir, set-PG*, set-Path, initdb, register-service, start-service | stop-service, delete-service |
//! | Debian  | update, install-package, create-role, create-database | purge-packages, remove-data-dirs |
//!
//! `test` mode is the same for both: one `check-<binary>` step per required
//! binary.

pub mod debian;
pub mod windows;

pub use debian::DebianProfile;
pub use windows::WindowsProfile;

use crate::archive::ArchiveExtractor;
use crate::command_runner::CommandRunner;
use crate::config::ProvisionConfig;
use crate::env_store::ConfigStore;
use crate::error::Result;
use crate::fetch::ArchiveFetcher;
use crate::pipeline::Step;
use crate::prompt::PromptField;
use crate::sanity;
use crate::types::{Mode, PlatformKind};

/// Collaborators step actions call into.
#[derive(Clone, Copy)]
pub struct Toolbox<'a> {
    pub runner: &'a dyn CommandRunner,
    pub fetcher: &'a dyn ArchiveFetcher,
    pub extractor: &'a dyn ArchiveExtractor,
    pub store: &'a dyn ConfigStore,
}

pub trait PlatformProfile {
    fn kind(&self) -> PlatformKind;

    /// Values to ask for before running `mode`.
    fn prompts(&self, mode: Mode) -> Vec<PromptField>;

    /// Binaries the profile shells out to.
    fn required_binaries(&self) -> &'static [&'static str];

    fn setup_steps<'a>(&self, config: &ProvisionConfig, tools: Toolbox<'a>) -> Result<Vec<Step<'a>>>;

    fn uninstall_steps<'a>(
        &self,
        config: &ProvisionConfig,
        tools: Toolbox<'a>,
    ) -> Result<Vec<Step<'a>>>;

    /// Ordered steps for `mode`.
    fn steps<'a>(
        &self,
        mode: Mode,
        config: &ProvisionConfig,
        tools: Toolbox<'a>,
    ) -> Result<Vec<Step<'a>>> {
        let steps = match mode {
            Mode::Setup => self.setup_steps(config, tools)?,
            Mode::Uninstall => self.uninstall_steps(config, tools)?,
            Mode::Test => sanity::preflight_steps(self.required_binaries(), tools.runner),
        };
        tracing::debug!(
            platform = %self.kind(),
            mode = %mode,
            steps = steps.len(),
            "assembled pipeline"
        );
        Ok(steps)
    }
}

/// Profile implementation for `kind`.
pub fn for_platform(kind: PlatformKind) -> Box<dyn PlatformProfile> {
    match kind {
        PlatformKind::Windows => Box::new(WindowsProfile),
        PlatformKind::Debian => Box::new(DebianProfile),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fakes shared by the profile tests.

    use std::cell::RefCell;
    use std::path::Path;

    use crate::archive::ArchiveExtractor;
    use crate::command_runner::{CommandOutput, CommandRunner};
    use crate::command_traits::ShellCommand;
    use crate::error::Result;
    use crate::fetch::ArchiveFetcher;

    /// Records every command and succeeds.
    #[derive(Default)]
    pub struct RecordingRunner {
        pub calls: RefCell<Vec<ShellCommand>>,
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, command: &ShellCommand) -> Result<CommandOutput> {
            self.calls.borrow_mut().push(command.clone());
            Ok(CommandOutput::ok(""))
        }
    }

    pub struct NoFetch;

    impl ArchiveFetcher for NoFetch {
        fn fetch(&self, url: &str, _dest: &Path) -> Result<u64> {
            panic!("unexpected download of {}", url)
        }
    }

    pub struct NoExtract;

    impl ArchiveExtractor for NoExtract {
        fn extract(&self, archive: &Path, _dest: &Path) -> Result<usize> {
            panic!("unexpected extraction of {}", archive.display())
        }
    }
}
