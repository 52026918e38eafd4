//! Error handling module for pgprovision
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Collaborators (runner, fetcher, extractor, config store) return
//! `ProvisionError`; the pipeline folds any of them into a `CommandFailure`.

use thiserror::Error;

/// The single failure kind recognized by the provisioning pipeline.
///
/// Network, filesystem and permission problems are not distinguished here:
/// a step either reported success or it did not.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("step '{step}' failed: \"{action}\" ({detail})")]
pub struct CommandFailure {
    /// Name of the step that failed.
    pub step: String,
    /// Printable description of the action (secrets redacted).
    pub action: String,
    /// Exit code, read-back mismatch or underlying error message.
    pub detail: String,
}

/// Main error type for pgprovision
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// IO errors (file operations, process spawning, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors (loading, unsupported platform)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Download errors
    #[error("Network error: {0}")]
    Network(String),

    /// Zip extraction errors
    #[error("Archive error: {0}")]
    Archive(String),

    /// System configuration store errors (registry, key not found)
    #[error("Registry error: {0}")]
    Registry(String),
}

/// Result type alias for pgprovision operations
pub type Result<T> = std::result::Result<T, ProvisionError>;

impl ProvisionError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create an archive error
    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive(msg.into())
    }

    /// Create a registry error
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }
}

impl From<reqwest::Error> for ProvisionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<zip::result::ZipError> for ProvisionError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}
