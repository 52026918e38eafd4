//! Host platform detection
//!
//! Picks the provisioning profile once at startup from the operating system
//! and, on Linux, from the presence of the Debian package tooling. Detection
//! is read-only: it looks at compile-time constants and a few well-known
//! paths, nothing is executed.

use std::fmt;
use std::path::Path;

use crate::error::{ProvisionError, Result};
use crate::types::{Arch, PlatformKind};

/// Files whose presence marks an apt-based distribution.
const APT_MARKERS: &[&str] = &["/etc/debian_version", "/usr/bin/apt-get"];

/// Facts about the host the profile is chosen from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    /// `std::env::consts::OS` value, e.g. `windows`, `linux`
    pub os: String,
    pub arch: Arch,
    /// Debian package tooling found
    pub apt: bool,
}

impl HostInfo {
    /// Detect the current host.
    pub fn detect() -> Self {
        let os = std::env::consts::OS.to_string();
        let apt = os == "linux" && APT_MARKERS.iter().any(|p| Path::new(p).exists());
        let info = Self {
            os,
            arch: Arch::detect(),
            apt,
        };
        tracing::info!("Host detection: {}", info);
        info
    }

    /// Profile for this host, or a configuration error when unsupported.
    pub fn platform(&self) -> Result<PlatformKind> {
        match self.os.as_str() {
            "windows" => Ok(PlatformKind::Windows),
            "linux" if self.apt => Ok(PlatformKind::Debian),
            "linux" => Err(ProvisionError::config(
                "unsupported Linux distribution: apt-get not found",
            )),
            other => Err(ProvisionError::config(format!(
                "unsupported platform: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for HostInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "os={}, arch={}, apt={}", self.os, self.arch, self.apt)
    }
}

/// Profile to use: the forced one if given, otherwise the detected one.
pub fn resolve_platform(forced: Option<PlatformKind>, host: &HostInfo) -> Result<PlatformKind> {
    match forced {
        Some(kind) => {
            tracing::info!("Platform forced to {}", kind);
            Ok(kind)
        }
        None => host.platform(),
    }
}
