use super::file_tree_scanner::FileTreeScanner;
use super::tarball_fetcher::TarballFetcher;
use crate::dependency_graph::domain::{PackageLocation, ScanReport};
use crate::ports::outbound::PackageScanner;
use crate::shared::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// JavaScriptPackageScanner adapter implementing the PackageScanner port
///
/// Registry packages are downloaded and unpacked into a temporary directory
/// that lives only for the duration of the scan; local packages are scanned
/// in place. File system work runs on the blocking thread pool.
pub struct JavaScriptPackageScanner {
    fetcher: TarballFetcher,
}

impl JavaScriptPackageScanner {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            fetcher: TarballFetcher::new(timeout)?,
        })
    }

    async fn scan_directory(root: PathBuf) -> Result<ScanReport> {
        tokio::task::spawn_blocking(move || FileTreeScanner::scan(&root)).await?
    }
}

#[async_trait]
impl PackageScanner for JavaScriptPackageScanner {
    async fn scan_package(&self, location: &PackageLocation) -> Result<ScanReport> {
        match location {
            PackageLocation::Directory(root) => Self::scan_directory(root.clone()).await,
            PackageLocation::Tarball(url) => {
                let extracted = self.fetcher.fetch(url).await?;
                let report = Self::scan_directory(extracted.path().to_path_buf()).await;
                extracted.close()?;
                report
            }
        }
    }
}
