//! Zip extraction.
//!
//! The EnterpriseDB archives are built on Windows, so entry names may use `\`
//! as the separator. Names are normalised to `/` and each component is checked
//! before anything is written: an entry may never land outside the destination.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::{ProvisionError, Result};

/// Unpacks an archive into a directory.
pub trait ArchiveExtractor {
    /// Extract `archive` into `dest`, returning the number of files written.
    fn extract(&self, archive: &Path, dest: &Path) -> Result<usize>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ZipExtractor;

impl ZipExtractor {
    pub fn new() -> Self {
        Self
    }
}

/// Relative path for an archive entry name, or an error if the name would
/// escape the destination.
pub fn sanitize_entry_name(name: &str) -> Result<PathBuf> {
    let normalized = name.replace('\\', "/");
    if normalized.starts_with('/') {
        return Err(ProvisionError::archive(format!(
            "absolute path in archive: {}",
            name
        )));
    }

    let mut path = PathBuf::new();
    for component in normalized.split('/') {
        match component {
            "" | "." => continue,
            ".." => {
                return Err(ProvisionError::archive(format!(
                    "path escapes destination: {}",
                    name
                )))
            }
            c if c.contains(':') => {
                return Err(ProvisionError::archive(format!(
                    "drive or stream specifier in archive path: {}",
                    name
                )))
            }
            c => path.push(c),
        }
    }
    Ok(path)
}

impl ArchiveExtractor for ZipExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<usize> {
        tracing::info!(archive = %archive.display(), dest = %dest.display(), "extracting archive");

        let file = File::open(archive).map_err(|e| {
            ProvisionError::archive(format!("cannot open {}: {}", archive.display(), e))
        })?;
        let mut zip = ZipArchive::new(file)?;
        fs::create_dir_all(dest)?;

        let mut written = 0;
        for i in 0..zip.len() {
            let mut entry = zip.by_index(i)?;
            let relative = sanitize_entry_name(entry.name())?;
            if relative.as_os_str().is_empty() {
                continue;
            }
            let target = dest.join(&relative);

            let is_dir = entry.is_dir() || entry.name().ends_with('\\');
            if is_dir {
                fs::create_dir_all(&target)?;
                continue;
            }

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&target)?;
            io::copy(&mut entry, &mut out)?;
            written += 1;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    fs::set_permissions(&target, fs::Permissions::from_mode(mode))?;
                }
            }
        }

        tracing::info!(files = written, "extraction finished");
        Ok(written)
    }
}
