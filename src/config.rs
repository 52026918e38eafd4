//! Provisioning configuration.
//!
//! One `ProvisionConfig` is built per invocation: built-in defaults, then an
//! optional JSON file, then CLI flags, then interactive answers. It is never
//! mutated once the step list has been assembled.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::Arch;

pub const DEFAULT_VERSION: &str = "9.3.10";
pub const DEFAULT_PASSWORD: &str = "123456";
pub const DEFAULT_DB_NAME: &str = "test";
pub const DEFAULT_DOWNLOAD_BASE: &str = "http://get.enterprisedb.com/postgresql";
pub const DEFAULT_SERVICE_NAME: &str = "pgsql";
pub const ENVIRONMENT_KEY: &str =
    r"HKLM\SYSTEM\ControlSet001\Control\Session Manager\Environment";

/// PostgreSQL identifiers are truncated beyond this many bytes.
const MAX_IDENTIFIER_LEN: usize = 63;

/// Everything a provisioning run needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionConfig {
    // PostgreSQL
    pub version: String,
    /// sudo password on Debian, also used for the created role. Read from a
    /// file when present, never written back.
    #[serde(skip_serializing)]
    pub password: String,
    pub db_name: String,
    /// Role to create; the invoking login when unset
    pub superuser: Option<String>,

    // Windows distribution
    pub download_base: String,
    pub install_root: PathBuf,
    pub service_name: String,
    /// Archive flavour; detected from the host when unset
    pub arch: Option<Arch>,
    pub registry_key: String,
    pub pg_host: String,

    // Debian packages
    pub packages: Vec<String>,
    pub purge_pattern: String,
    pub data_dirs: Vec<PathBuf>,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            db_name: DEFAULT_DB_NAME.to_string(),
            superuser: None,
            download_base: DEFAULT_DOWNLOAD_BASE.to_string(),
            install_root: PathBuf::from("D:/"),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            arch: None,
            registry_key: ENVIRONMENT_KEY.to_string(),
            pg_host: "localhost".to_string(),
            packages: vec!["postgresql".to_string(), "postgresql-contrib".to_string()],
            purge_pattern: "postgresql*".to_string(),
            data_dirs: vec![
                PathBuf::from("/var/lib/postgresql/"),
                PathBuf::from("/var/log/postgresql/"),
                PathBuf::from("/etc/postgresql/"),
            ],
        }
    }
}

impl ProvisionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load configuration from a JSON file. Missing keys keep their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_version(&self.version)?;

        if self.password.is_empty() {
            anyhow::bail!("Password must be specified");
        }
        // sudo -S reads exactly one line
        if self.password.contains(['\n', '\r']) {
            anyhow::bail!("Password cannot contain line breaks");
        }

        validate_identifier("Database name", &self.db_name)?;
        if let Some(role) = &self.superuser {
            validate_identifier("Superuser name", role)?;
        }

        let base = self.download_base.trim();
        if !base.starts_with("http://") && !base.starts_with("https://") {
            anyhow::bail!("Download base must start with http:// or https://");
        }

        if self.service_name.trim().is_empty() || self.service_name.contains(char::is_whitespace)
        {
            anyhow::bail!("Service name must be a single non-empty word");
        }

        if self.packages.is_empty() {
            anyhow::bail!("At least one package must be listed");
        }

        Ok(())
    }

    /// Architecture used to pick the Windows archive.
    pub fn effective_arch(&self) -> Arch {
        self.arch.unwrap_or_else(Arch::detect)
    }

    /// EnterpriseDB binary zip URL for the configured version.
    pub fn download_url(&self) -> String {
        format!(
            "{}/postgresql-{}-2-{}",
            self.download_base.trim_end_matches('/'),
            self.version,
            self.effective_arch().archive_suffix()
        )
    }

    /// Where the downloaded zip is saved.
    pub fn archive_path(&self) -> PathBuf {
        self.install_root
            .join(format!("PostgreSQL{}.zip", self.version))
    }

    /// Directory the zip is extracted into.
    pub fn install_dir(&self) -> PathBuf {
        self.install_root.join(format!("PostgreSQL{}", self.version))
    }

    /// PGHOME: the `pgsql` directory inside the extracted archive.
    pub fn pg_home(&self) -> PathBuf {
        self.install_dir().join("pgsql")
    }

    /// Role created on Debian.
    pub fn role_name(&self) -> Result<String> {
        match &self.superuser {
            Some(role) => Ok(role.clone()),
            None => current_login().context(
                "Cannot determine the current login; set \"superuser\" in the configuration",
            ),
        }
    }
}

/// Login name of the invoking user, from the environment.
pub fn current_login() -> Option<String> {
    ["USER", "LOGNAME", "USERNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
}

/// Dotted numeric release such as `9.3.10`, optionally with a suffix like `beta2`.
pub fn validate_version(version: &str) -> Result<()> {
    if version.is_empty() {
        anyhow::bail!("Version must be specified");
    }
    if !version.starts_with(|c: char| c.is_ascii_digit()) {
        anyhow::bail!("Version must start with a digit: {}", version);
    }
    if version.ends_with('.') || version.contains("..") {
        anyhow::bail!("Version has an empty component: {}", version);
    }
    if !version
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.')
    {
        anyhow::bail!(
            "Version can only contain digits, letters and dots: {}",
            version
        );
    }
    Ok(())
}

/// Unquoted PostgreSQL identifier: letter or underscore first, then
/// letters, digits and underscores.
pub fn validate_identifier(what: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        anyhow::bail!("{} must be specified", what);
    }
    if name.len() > MAX_IDENTIFIER_LEN {
        anyhow::bail!("{} must be at most {} characters long", what, MAX_IDENTIFIER_LEN);
    }
    if let Some(first_char) = name.chars().next() {
        if !(first_char.is_ascii_alphabetic() || first_char == '_') {
            anyhow::bail!("{} must start with a letter or underscore", what);
        }
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        anyhow::bail!("{} can only contain letters, numbers, and underscores", what);
    }
    Ok(())
}
