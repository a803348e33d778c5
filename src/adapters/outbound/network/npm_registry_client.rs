use super::packument::Packument;
use crate::dependency_graph::domain::{DependencySpec, Manifest, ResolverKind};
use crate::dependency_graph::services::RangeResolver;
use crate::ports::outbound::ManifestSource;
use crate::shared::error::FetchError;
use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

/// Default public registry
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

type PackumentSlot = Arc<OnceCell<Result<Arc<Packument>, FetchError>>>;

/// NpmRegistryClient adapter resolving registry specs against an npm registry
///
/// This adapter implements the ManifestSource port for `registry` specs.
/// Each packument is downloaded at most once per client: every range of the
/// same package name is resolved against the cached document.
///
/// # Async Support
/// Uses async reqwest client for non-blocking HTTP requests.
pub struct NpmRegistryClient {
    client: reqwest::Client,
    registry_url: String,
    max_retries: u32,
    packuments: DashMap<String, PackumentSlot>,
}

impl NpmRegistryClient {
    /// Creates a client for the public npm registry
    pub fn new() -> crate::shared::Result<Self> {
        Self::with_registry(DEFAULT_REGISTRY_URL, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client for a custom registry (mirrors, private registries)
    pub fn with_registry(registry_url: &str, timeout: Duration) -> crate::shared::Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("depwalk/{}", version);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            registry_url: registry_url.trim_end_matches('/').to_string(),
            max_retries: 3,
            packuments: DashMap::new(),
        })
    }

    /// Returns the packument of `name`, downloading it on first use
    async fn packument(&self, name: &str) -> Result<Arc<Packument>, FetchError> {
        let slot = Arc::clone(
            self.packuments
                .entry(name.to_string())
                .or_insert_with(PackumentSlot::default)
                .value(),
        );

        slot.get_or_init(|| async { self.fetch_with_retry(name).await.map(Arc::new) })
            .await
            .clone()
    }

    /// Fetches a packument with retry logic; a missing package is never retried
    async fn fetch_with_retry(&self, name: &str) -> Result<Packument, FetchError> {
        let mut attempt = 1;
        loop {
            match self.fetch_packument(name).await {
                Err(FetchError::Network { .. }) if attempt < self.max_retries => {
                    // Retry after a short wait (async)
                    tokio::time::sleep(Duration::from_millis(100 * attempt as u64)).await;
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    /// Validates a package name before it is placed in a URL
    fn validate_url_component(name: &str) -> Result<(), FetchError> {
        let reject = |reason: &str| {
            Err(FetchError::InvalidSpec {
                spec: name.to_string(),
                reason: format!("Security: package name {}", reason),
            })
        };

        // Security: Prevent URL injection attacks
        if name.contains('\\') {
            return reject("contains path separators which are not allowed");
        }
        if name.contains("..") {
            return reject("contains '..' which is not allowed");
        }
        if name.contains('#') || name.contains('?') {
            return reject("contains URL-unsafe characters");
        }

        DependencySpec::validate_name(name).or_else(|error| reject(&error.to_string()))
    }

    /// URL of a packument; the scope separator of `@scope/name` stays literal
    fn packument_url(&self, name: &str) -> String {
        match name.strip_prefix('@').and_then(|scoped| scoped.split_once('/')) {
            Some((scope, package)) => format!(
                "{}/@{}%2F{}",
                self.registry_url,
                urlencoding::encode(scope),
                urlencoding::encode(package)
            ),
            None => format!("{}/{}", self.registry_url, urlencoding::encode(name)),
        }
    }

    /// A body that is not a packument is not retried
    fn parse_packument(name: &str, body: &[u8]) -> Result<Packument, FetchError> {
        serde_json::from_slice(body).map_err(|e| FetchError::Malformed {
            spec: name.to_string(),
            details: e.to_string(),
        })
    }

    async fn fetch_packument(&self, name: &str) -> Result<Packument, FetchError> {
        Self::validate_url_component(name)?;

        let url = self.packument_url(name);
        debug!(url = %url, "GET packument");

        let network_error = |details: String| FetchError::Network {
            spec: name.to_string(),
            details,
        };

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| network_error(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(FetchError::NotFound {
                spec: name.to_string(),
            }),
            status if !status.is_success() => Err(network_error(format!(
                "registry returned status code {}",
                status
            ))),
            _ => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| network_error(e.to_string()))?;
                Self::parse_packument(name, &body)
            }
        }
    }
}

#[async_trait]
impl ManifestSource for NpmRegistryClient {
    async fn fetch_manifest(&self, spec: &DependencySpec) -> Result<Manifest, FetchError> {
        if spec.kind() != ResolverKind::Registry {
            return Err(FetchError::Unsupported {
                spec: spec.to_string(),
                reason: format!("{:?} specs are not served by the registry", spec.kind()),
            });
        }

        // `npm:real-name@range` aliases install another package under this name
        let target = match spec.range().strip_prefix("npm:") {
            Some(alias) => DependencySpec::parse(alias).map_err(|e| FetchError::InvalidSpec {
                spec: spec.to_string(),
                reason: e.to_string(),
            })?,
            None => spec.clone(),
        };

        let packument = self.packument(target.name()).await?;
        let version = RangeResolver::resolve(
            target.range(),
            packument.versions.keys().map(String::as_str),
            &packument.dist_tags,
        )
        .ok_or_else(|| FetchError::NotFound {
            spec: spec.to_string(),
        })?;

        packument
            .manifest(&version)
            .ok_or_else(|| FetchError::NotFound {
                spec: spec.to_string(),
            })
    }
}
