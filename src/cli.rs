use clap::Parser;
use std::path::PathBuf;

use crate::config::ProvisionConfig;
use crate::prompt::PromptField;
use crate::types::{Mode, PlatformKind};

/// pgprovision - install or remove PostgreSQL on Windows and Debian/Ubuntu
#[derive(Parser, Debug)]
#[command(name = "pgprovision")]
#[command(about = "A platform-detecting installer and uninstaller for PostgreSQL")]
#[command(version)]
pub struct Cli {
    /// What to do
    #[arg(value_enum)]
    pub mode: Mode,

    /// JSON configuration file; its values replace the built-in defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the effective configuration (without the password) to this file and exit
    #[arg(long)]
    pub save_config: Option<PathBuf>,

    /// PostgreSQL version to install (Windows)
    #[arg(long)]
    pub pg_version: Option<String>,

    /// sudo password, also used for the created role (Debian)
    #[arg(long)]
    pub password: Option<String>,

    /// Name of the database to create (Debian)
    #[arg(long)]
    pub db_name: Option<String>,

    /// Force a platform profile instead of detecting the host
    #[arg(long, value_enum)]
    pub platform: Option<PlatformKind>,

    /// Accept configured values without prompting
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Print the steps that would run without executing them
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Copy flag values over `config`.
    pub fn apply_overrides(&self, config: &mut ProvisionConfig) {
        if let Some(version) = &self.pg_version {
            config.version = version.clone();
        }
        if let Some(password) = &self.password {
            config.password = password.clone();
        }
        if let Some(db_name) = &self.db_name {
            config.db_name = db_name.clone();
        }
    }

    /// Prompts still needed once flags are taken into account.
    pub fn pending_prompts(&self, wanted: Vec<PromptField>) -> Vec<PromptField> {
        if self.yes || self.dry_run {
            return Vec::new();
        }
        wanted
            .into_iter()
            .filter(|field| match field {
                PromptField::Version => self.pg_version.is_none(),
                PromptField::Password => self.password.is_none(),
            })
            .collect()
    }
}
