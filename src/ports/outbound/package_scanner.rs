use crate::dependency_graph::domain::{PackageLocation, ScanReport};
use crate::shared::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// PackageScanner port for static analysis of a package's files
///
/// Implementations fetch the package contents when needed (tarball download)
/// and report composition, size and security warnings.
#[async_trait]
pub trait PackageScanner: Send + Sync {
    /// Scans the package stored at `location`
    ///
    /// # Errors
    /// Returns an error if the contents cannot be fetched or read. The walker
    /// records such failures on the node instead of aborting.
    async fn scan_package(&self, location: &PackageLocation) -> Result<ScanReport>;
}

#[async_trait]
impl<T: PackageScanner + ?Sized> PackageScanner for Arc<T> {
    async fn scan_package(&self, location: &PackageLocation) -> Result<ScanReport> {
        (**self).scan_package(location).await
    }
}
