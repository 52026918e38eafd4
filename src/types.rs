//! Type-safe selection enums for pgprovision
//!
//! Modes, platforms and architectures are proper Rust enums instead of
//! strings inspected at runtime.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// What the invocation should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Install PostgreSQL and initialize it
    Setup,
    /// Remove PostgreSQL
    Uninstall,
    /// Preflight checks only, nothing is changed
    Test,
}

impl Mode {
    /// Returns true if this mode changes the system.
    pub fn is_mutating(self) -> bool {
        !matches!(self, Self::Test)
    }
}

/// Target platform profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    /// Windows: zip distribution, registry, Windows service
    Windows,
    /// Debian/Ubuntu: apt packages, psql statements
    Debian,
}

/// Host pointer width, selects the Windows binary archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    #[strum(serialize = "x86")]
    X86,
    #[default]
    #[strum(serialize = "x64")]
    X64,
}

impl Arch {
    /// Detect the architecture this binary was built for.
    pub fn detect() -> Self {
        if cfg!(target_pointer_width = "32") {
            Self::X86
        } else {
            Self::X64
        }
    }

    /// Suffix of the EnterpriseDB binary zip for this architecture.
    pub fn archive_suffix(self) -> &'static str {
        match self {
            Self::X86 => "windows-binaries.zip",
            Self::X64 => "windows-x64-binaries.zip",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!("setup".parse::<Mode>().unwrap(), Mode::Setup);
        assert_eq!("uninstall".parse::<Mode>().unwrap(), Mode::Uninstall);
        assert_eq!("test".parse::<Mode>().unwrap(), Mode::Test);
        assert!("install".parse::<Mode>().is_err());
    }

    #[test]
    fn test_only_test_mode_is_read_only() {
        assert!(Mode::Setup.is_mutating());
        assert!(Mode::Uninstall.is_mutating());
        assert!(!Mode::Test.is_mutating());
    }

    #[test]
    fn test_archive_suffix() {
        assert_eq!(Arch::X86.archive_suffix(), "windows-binaries.zip");
        assert_eq!(Arch::X64.archive_suffix(), "windows-x64-binaries.zip");
    }
}
