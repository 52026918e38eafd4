//! Type-safe command argument modules.
//!
//! This module contains structs that implement `CommandArgs` for each external
//! program a provisioning step invokes. Each struct maps Rust fields to the exact
//! flags, stdin and environment expected by that program.

pub mod apt;
pub mod psql;
pub mod windows;

/// `sudo -S` reads the password from the first stdin line.
pub(crate) fn sudo_stdin(password: &str) -> String {
    format!("{}\n", password)
}
