use crate::shared::security::{validate_archive_entry, validate_file_size, MAX_UNPACKED_SIZE};
use crate::shared::Result;
use anyhow::Context;
use flate2::read::GzDecoder;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tar::{Archive, EntryType};
use tempfile::TempDir;
use tracing::debug;

/// Largest tarball accepted from a registry (100 MB)
const MAX_TARBALL_SIZE: u64 = 100 * 1024 * 1024;

/// Downloads package tarballs and unpacks them into temporary directories
pub struct TarballFetcher {
    client: reqwest::Client,
}

impl TarballFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("depwalk/{}", version))
            .build()?;
        Ok(Self { client })
    }

    /// Downloads `url` and unpacks it; the directory is removed when dropped
    pub async fn fetch(&self, url: &str) -> Result<TempDir> {
        if !url.starts_with("https://") && !url.starts_with("http://") {
            anyhow::bail!("Security: refusing to download tarball from {}", url);
        }

        debug!(url = %url, "downloading tarball");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to download {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("Tarball download returned status code {}", response.status());
        }
        if let Some(length) = response.content_length() {
            validate_file_size(length, Path::new(url), MAX_TARBALL_SIZE)?;
        }

        let bytes = response.bytes().await?;
        validate_file_size(bytes.len() as u64, Path::new(url), MAX_TARBALL_SIZE)?;

        tokio::task::spawn_blocking(move || Self::unpack(&bytes[..])).await?
    }

    /// Unpacks a gzipped npm tarball, dropping its top-level directory
    /// (`package/` on the public registry).
    ///
    /// Only regular files and directories are extracted; links are skipped.
    pub fn unpack(reader: impl Read) -> Result<TempDir> {
        let destination = TempDir::new()?;
        let mut archive = Archive::new(GzDecoder::new(reader));
        let mut unpacked = 0u64;

        for entry in archive.entries().context("Failed to read tarball")? {
            let mut entry = entry.context("Corrupt tarball entry")?;
            let path = entry.path()?.into_owned();
            validate_archive_entry(&path)?;

            let Some(target) = Self::strip_top_level(destination.path(), &path) else {
                continue;
            };

            match entry.header().entry_type() {
                EntryType::Directory => fs::create_dir_all(&target)?,
                EntryType::Regular | EntryType::Continuous => {
                    unpacked += entry.size();
                    validate_file_size(unpacked, &path, MAX_UNPACKED_SIZE)?;

                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    entry.unpack(&target)?;
                }
                _ => {}
            }
        }

        Ok(destination)
    }

    fn strip_top_level(destination: &Path, path: &Path) -> Option<PathBuf> {
        let mut components = path.components();
        components.next()?;
        let rest = components.as_path();
        if rest.as_os_str().is_empty() {
            None
        } else {
            Some(destination.join(rest))
        }
    }
}
