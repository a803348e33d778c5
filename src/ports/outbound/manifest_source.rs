use crate::dependency_graph::domain::{DependencySpec, Manifest};
use crate::shared::error::FetchError;
use async_trait::async_trait;
use std::sync::Arc;

/// ManifestSource port for turning a dependency spec into a concrete manifest
///
/// This port abstracts where manifests come from (npm registry, local
/// directories, `file:` dependencies). The returned manifest carries the
/// resolved version, so the walker can key the resolution cache on it.
///
/// # Async Support
/// Implementations must be `Send + Sync`: the walker calls them from many
/// concurrent traversal paths.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Resolves `spec` to one published version and returns its manifest
    ///
    /// # Errors
    /// Returns a [`FetchError`] when the package or a satisfying version
    /// does not exist, the network fails, or the resolver kind is unsupported.
    async fn fetch_manifest(&self, spec: &DependencySpec) -> Result<Manifest, FetchError>;
}

#[async_trait]
impl<T: ManifestSource + ?Sized> ManifestSource for Arc<T> {
    async fn fetch_manifest(&self, spec: &DependencySpec) -> Result<Manifest, FetchError> {
        (**self).fetch_manifest(spec).await
    }
}
