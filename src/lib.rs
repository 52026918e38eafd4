//! pgprovision Library
//!
//! This library provides the provisioning pipeline and the Windows and
//! Debian/Ubuntu profiles used by the `pgprovision` binary.

pub mod archive;
pub mod cli;
pub mod command_runner;
pub mod command_traits;
pub mod commands;
pub mod config;
pub mod env_store;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod platform;
pub mod process_guard;
pub mod profiles;
pub mod prompt;
pub mod report;
pub mod run_state;
pub mod sanity;
pub mod types;

// Re-export main types for convenience
pub use archive::{ArchiveExtractor, ZipExtractor};
pub use command_runner::{CommandOutput, CommandRunner, SystemRunner};
pub use command_traits::{CommandArgs, ShellCommand};
pub use config::ProvisionConfig;
pub use env_store::{ConfigStore, MemoryStore, RegistryStore};
pub use error::{CommandFailure, ProvisionError};
pub use fetch::{ArchiveFetcher, HttpFetcher};
pub use pipeline::{Outcome, Step};
pub use platform::HostInfo;
pub use process_guard::{ChildRegistry, CommandProcessGroup, ProcessGuard};
pub use profiles::{for_platform, DebianProfile, PlatformProfile, Toolbox, WindowsProfile};
pub use prompt::{PromptField, Prompter, StdinPrompter};
pub use report::{ConsoleReporter, NullObserver, RunObserver};
pub use run_state::{PipelineRun, RunStatus, RunTransitionError};
pub use types::{Arch, Mode, PlatformKind};
