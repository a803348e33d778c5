use crate::dependency_graph::domain::{DependencySpec, Manifest, ResolverKind};
use crate::ports::outbound::ManifestSource;
use crate::shared::error::FetchError;
use async_trait::async_trait;

/// ManifestRouter dispatches each spec to the source able to serve its resolver kind
///
/// Registry specs go to `registry`, `file:`/`link:` specs to `local`. Git, URL
/// and workspace specs are reported as unsupported so the walker degrades
/// their node while keeping the resolver flags.
pub struct ManifestRouter<R, L> {
    registry: R,
    local: L,
}

impl<R, L> ManifestRouter<R, L>
where
    R: ManifestSource,
    L: ManifestSource,
{
    pub fn new(registry: R, local: L) -> Self {
        Self { registry, local }
    }
}

#[async_trait]
impl<R, L> ManifestSource for ManifestRouter<R, L>
where
    R: ManifestSource,
    L: ManifestSource,
{
    async fn fetch_manifest(&self, spec: &DependencySpec) -> Result<Manifest, FetchError> {
        match spec.kind() {
            ResolverKind::Registry => self.registry.fetch_manifest(spec).await,
            ResolverKind::File => self.local.fetch_manifest(spec).await,
            kind @ (ResolverKind::Git | ResolverKind::Url | ResolverKind::Workspace) => {
                Err(FetchError::Unsupported {
                    spec: spec.to_string(),
                    reason: format!("{:?} dependencies cannot be resolved", kind),
                })
            }
        }
    }
}
