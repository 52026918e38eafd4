//! Archive download.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{ProvisionError, Result};

/// Downloads a URL to a file.
pub trait ArchiveFetcher {
    /// Stream `url` into `dest`, returning the number of bytes written.
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Blocking HTTP download.
///
/// Only connecting is time-limited; the archive body may take as long as the
/// link needs.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("pgprovision/{}", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| ProvisionError::network(format!("create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl ArchiveFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        tracing::info!(url, dest = %dest.display(), "downloading archive");

        let mut response = self.client.get(url).send()?.error_for_status()?;

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(dest)?);

        match response.copy_to(&mut writer) {
            Ok(bytes) => {
                writer.flush()?;
                tracing::info!(bytes, "download finished");
                Ok(bytes)
            }
            Err(e) => {
                drop(writer);
                // A truncated zip would only fail later, during extraction.
                if let Err(rm) = fs::remove_file(dest) {
                    tracing::warn!("could not remove partial download {}: {}", dest.display(), rm);
                }
                Err(e.into())
            }
        }
    }
}
