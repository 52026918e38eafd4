//! Type-safe arguments for apt package management.
//!
//! - `AptUpdateArgs` for `apt-get update`
//! - `AptInstallArgs` for `apt-get -y install`
//! - `AptPurgeArgs` for `apt-get -y --purge remove`
//! - `RemoveDirsArgs` for deleting leftover data/config directories
//!
//! Every command goes through `sudo -S` with the password on stdin. sudo
//! resets the environment, so `DEBIAN_FRONTEND` is passed through `env` on
//! the command line rather than set on the sudo process.

use std::path::PathBuf;

use super::sudo_stdin;
use crate::command_traits::CommandArgs;

/// `-S env DEBIAN_FRONTEND=noninteractive apt-get <args...>`
fn noninteractive_apt_get(args: &[&str]) -> Vec<String> {
    ["-S", "env", "DEBIAN_FRONTEND=noninteractive", "apt-get"]
        .iter()
        .chain(args)
        .map(|a| a.to_string())
        .collect()
}

// ============================================================================
// Update
// ============================================================================

/// `sudo -S apt-get update`
#[derive(Debug, Clone)]
pub struct AptUpdateArgs {
    pub sudo_password: String,
}

impl CommandArgs for AptUpdateArgs {
    fn program(&self) -> String {
        "sudo".to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec!["-S".to_string(), "apt-get".to_string(), "update".to_string()]
    }

    fn stdin(&self) -> Option<String> {
        Some(sudo_stdin(&self.sudo_password))
    }

    fn secrets(&self) -> Vec<String> {
        vec![self.sudo_password.clone()]
    }
}

// ============================================================================
// Install
// ============================================================================

/// `sudo -S env DEBIAN_FRONTEND=noninteractive apt-get -y install <packages...>`
#[derive(Debug, Clone)]
pub struct AptInstallArgs {
    pub packages: Vec<String>,
    pub sudo_password: String,
}

impl CommandArgs for AptInstallArgs {
    fn program(&self) -> String {
        "sudo".to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        let mut args = noninteractive_apt_get(&["-y", "install"]);
        args.extend(self.packages.iter().cloned());
        args
    }

    fn stdin(&self) -> Option<String> {
        Some(sudo_stdin(&self.sudo_password))
    }

    fn secrets(&self) -> Vec<String> {
        vec![self.sudo_password.clone()]
    }
}

// ============================================================================
// Purge
// ============================================================================

/// `sudo -S env DEBIAN_FRONTEND=noninteractive apt-get -y --purge remove <pattern>`
///
/// The pattern (e.g. `postgresql*`) is interpreted by apt, not by a shell.
#[derive(Debug, Clone)]
pub struct AptPurgeArgs {
    pub pattern: String,
    pub sudo_password: String,
}

impl CommandArgs for AptPurgeArgs {
    fn program(&self) -> String {
        "sudo".to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        noninteractive_apt_get(&["-y", "--purge", "remove", self.pattern.as_str()])
    }

    fn stdin(&self) -> Option<String> {
        Some(sudo_stdin(&self.sudo_password))
    }

    fn secrets(&self) -> Vec<String> {
        vec![self.sudo_password.clone()]
    }
}

// ============================================================================
// Remove directories
// ============================================================================

/// `sudo -S rm -rf <dirs...>`
#[derive(Debug, Clone)]
pub struct RemoveDirsArgs {
    pub dirs: Vec<PathBuf>,
    pub sudo_password: String,
}

impl CommandArgs for RemoveDirsArgs {
    fn program(&self) -> String {
        "sudo".to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec!["-S".to_string(), "rm".to_string(), "-rf".to_string()];
        args.extend(self.dirs.iter().map(|d| d.display().to_string()));
        args
    }

    fn stdin(&self) -> Option<String> {
        Some(sudo_stdin(&self.sudo_password))
    }

    fn secrets(&self) -> Vec<String> {
        vec![self.sudo_password.clone()]
    }
}
