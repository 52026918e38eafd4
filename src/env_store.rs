//! System configuration store for environment values.
//!
//! On Windows the machine-wide environment lives in the registry. Values are
//! written with `reg add` and read back with `reg query` through the
//! `CommandRunner`, so the same fakes that cover other steps cover these.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::command_runner::CommandRunner;
use crate::command_traits::CommandArgs;
use crate::commands::windows::{RegAddArgs, RegQueryArgs};
use crate::error::{ProvisionError, Result};

/// Named string values that outlive this process.
pub trait ConfigStore {
    fn set(&self, name: &str, value: &str) -> Result<()>;

    /// `None` when the value does not exist.
    fn get(&self, name: &str) -> Result<Option<String>>;

    /// Printable location of `name`, for step descriptions.
    fn describe(&self, name: &str) -> String {
        name.to_string()
    }
}

/// Values under one registry key.
pub struct RegistryStore<'a> {
    runner: &'a dyn CommandRunner,
    key: String,
}

impl<'a> RegistryStore<'a> {
    pub fn new(runner: &'a dyn CommandRunner, key: impl Into<String>) -> Self {
        Self {
            runner,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl ConfigStore for RegistryStore<'_> {
    fn set(&self, name: &str, value: &str) -> Result<()> {
        let args = RegAddArgs {
            key: self.key.clone(),
            name: name.to_string(),
            value: value.to_string(),
        };
        let output = self.runner.run(&args.to_command())?;
        if output.success {
            Ok(())
        } else {
            Err(ProvisionError::registry(format!(
                "reg add {} failed: {}",
                name,
                output.stderr.trim()
            )))
        }
    }

    fn get(&self, name: &str) -> Result<Option<String>> {
        let args = RegQueryArgs {
            key: self.key.clone(),
            name: name.to_string(),
        };
        let output = self.runner.run(&args.to_command())?;
        if !output.success {
            // reg exits 1 for a missing value
            tracing::debug!(name, stderr = %output.stderr.trim(), "registry value not found");
            return Ok(None);
        }
        Ok(parse_reg_query(&output.stdout, name))
    }

    fn describe(&self, name: &str) -> String {
        format!("{}\\{}", self.key, name)
    }
}

/// Extract the data of value `name` from `reg query` output.
///
/// ```text
/// HKEY_LOCAL_MACHINE\SYSTEM\ControlSet001\Control\Session Manager\Environment
///     PGHOME    REG_SZ    D:/PostgreSQL9.3.10/pgsql
/// ```
pub fn parse_reg_query(stdout: &str, name: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        let line = line.trim();
        let head = line.get(..name.len())?;
        if !head.eq_ignore_ascii_case(name) {
            return None;
        }
        let rest = &line[name.len()..];
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let rest = rest.trim_start();
        let (kind, data) = match rest.split_once(char::is_whitespace) {
            Some((kind, data)) => (kind, data.trim()),
            None => (rest, ""),
        };
        kind.starts_with("REG_").then(|| data.to_string())
    })
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Mutex::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Copy of every stored value.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.values
            .lock()
            .map(|values| values.clone())
            .unwrap_or_default()
    }
}

impl ConfigStore for MemoryStore {
    fn set(&self, name: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| ProvisionError::registry("memory store lock poisoned"))?;
        values.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| ProvisionError::registry("memory store lock poisoned"))?;
        Ok(values.get(name).cloned())
    }
}
