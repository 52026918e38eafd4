//! Type-safe arguments for Windows service and registry commands.
//!
//! - `InitDbArgs` for `initdb.exe`
//! - `PgCtlRegisterArgs` for `pg_ctl.exe register`
//! - `NetServiceArgs` for `net start|stop`
//! - `ScDeleteArgs` for `sc delete`
//! - `RegAddArgs` / `RegQueryArgs` for `reg add|query`

use std::path::{Path, PathBuf};

use strum::{Display, EnumString};

use crate::command_traits::CommandArgs;

fn bin_path(pg_home: &Path, exe: &str) -> String {
    pg_home.join("bin").join(exe).display().to_string()
}

fn data_dir(pg_home: &Path) -> String {
    pg_home.join("data").display().to_string()
}

// ============================================================================
// initdb
// ============================================================================

/// `<pg_home>/bin/initdb.exe -D <pg_home>/data -E UTF8 --locale=C`
#[derive(Debug, Clone)]
pub struct InitDbArgs {
    pub pg_home: PathBuf,
}

impl CommandArgs for InitDbArgs {
    fn program(&self) -> String {
        bin_path(&self.pg_home, "initdb.exe")
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "-D".to_string(),
            data_dir(&self.pg_home),
            "-E".to_string(),
            "UTF8".to_string(),
            "--locale=C".to_string(),
        ]
    }
}

// ============================================================================
// pg_ctl register
// ============================================================================

/// `<pg_home>/bin/pg_ctl.exe register -D <pg_home>/data -N <service>`
#[derive(Debug, Clone)]
pub struct PgCtlRegisterArgs {
    pub pg_home: PathBuf,
    pub service: String,
}

impl CommandArgs for PgCtlRegisterArgs {
    fn program(&self) -> String {
        bin_path(&self.pg_home, "pg_ctl.exe")
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "register".to_string(),
            "-D".to_string(),
            data_dir(&self.pg_home),
            "-N".to_string(),
            self.service.clone(),
        ]
    }
}

// ============================================================================
// net start / net stop
// ============================================================================

/// Service state change understood by `net`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ServiceAction {
    Start,
    Stop,
}

/// `net <start|stop> <service>`
#[derive(Debug, Clone)]
pub struct NetServiceArgs {
    pub action: ServiceAction,
    pub service: String,
}

impl CommandArgs for NetServiceArgs {
    fn program(&self) -> String {
        "net".to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![self.action.to_string(), self.service.clone()]
    }
}

// ============================================================================
// sc delete
// ============================================================================

/// `sc delete <service>`
#[derive(Debug, Clone)]
pub struct ScDeleteArgs {
    pub service: String,
}

impl CommandArgs for ScDeleteArgs {
    fn program(&self) -> String {
        "sc".to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec!["delete".to_string(), self.service.clone()]
    }
}

// ============================================================================
// reg add / reg query
// ============================================================================

/// `reg add <key> /v <name> /t <type> /d <value> /f`
///
/// Values referencing other variables (`%PGHOME%`) are written as
/// `REG_EXPAND_SZ` so Windows expands them; everything else is `REG_SZ`.
#[derive(Debug, Clone)]
pub struct RegAddArgs {
    pub key: String,
    pub name: String,
    pub value: String,
}

impl RegAddArgs {
    pub fn value_type(&self) -> &'static str {
        if self.value.contains('%') {
            "REG_EXPAND_SZ"
        } else {
            "REG_SZ"
        }
    }
}

impl CommandArgs for RegAddArgs {
    fn program(&self) -> String {
        "reg".to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "add".to_string(),
            self.key.clone(),
            "/v".to_string(),
            self.name.clone(),
            "/t".to_string(),
            self.value_type().to_string(),
            "/d".to_string(),
            self.value.clone(),
            "/f".to_string(),
        ]
    }
}

/// `reg query <key> /v <name>`
#[derive(Debug, Clone)]
pub struct RegQueryArgs {
    pub key: String,
    pub name: String,
}

impl CommandArgs for RegQueryArgs {
    fn program(&self) -> String {
        "reg".to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "query".to_string(),
            self.key.clone(),
            "/v".to_string(),
            self.name.clone(),
        ]
    }
}
