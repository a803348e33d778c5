use async_trait::async_trait;
use depwalk::prelude::*;
use depwalk::dependency_graph::domain::PackageLocation;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory ManifestSource with call counters and injectable failures
#[derive(Default)]
pub struct MockManifestSource {
    manifests: HashMap<String, Vec<Manifest>>,
    failures: HashMap<String, FetchError>,
    delay: Option<Duration>,
    cancel_on: Option<(String, CancellationFlag)>,
    calls: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockManifestSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name@version` with a tarball location and an MIT licence
    pub fn with_package(self, name: &str, version: &str, dependencies: &[(&str, &str)]) -> Self {
        let mut manifest = Manifest::new(name, version);
        for (dependency, range) in dependencies {
            manifest = manifest.with_dependency(dependency, range);
        }
        manifest.license = Some("MIT".to_string());
        manifest.location = Some(PackageLocation::Tarball(Self::tarball_url(name, version)));
        self.with_manifest(manifest)
    }

    pub fn with_manifest(mut self, manifest: Manifest) -> Self {
        self.manifests
            .entry(manifest.name.clone())
            .or_default()
            .push(manifest);
        self
    }

    /// Every fetch of `name` fails with `error`
    pub fn with_failure(mut self, name: &str, error: FetchError) -> Self {
        self.failures.insert(name.to_string(), error);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets `flag` as soon as `name` is fetched
    pub fn cancelling_on(mut self, name: &str, flag: CancellationFlag) -> Self {
        self.cancel_on = Some((name.to_string(), flag));
        self
    }

    pub fn tarball_url(name: &str, version: &str) -> String {
        format!("https://registry.test/{0}/-/{0}-{1}.tgz", name, version)
    }

    /// Number of fetches for the spec rendered as `name@range`
    pub fn calls(&self, spec: &str) -> usize {
        self.calls.lock().unwrap().get(spec).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn lookup(&self, spec: &DependencySpec) -> std::result::Result<Manifest, FetchError> {
        if let Some(error) = self.failures.get(spec.name()) {
            return Err(error.clone());
        }

        let versions = self.manifests.get(spec.name());
        let found = if spec.range() == "latest" {
            versions.and_then(|versions| versions.last())
        } else {
            versions.and_then(|versions| versions.iter().find(|m| m.version == spec.range()))
        };

        found.cloned().ok_or_else(|| FetchError::NotFound {
            spec: spec.to_string(),
        })
    }
}

#[async_trait]
impl ManifestSource for MockManifestSource {
    async fn fetch_manifest(&self, spec: &DependencySpec) -> std::result::Result<Manifest, FetchError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(spec.to_string())
            .or_insert(0) += 1;

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some((name, flag)) = &self.cancel_on {
            if name == spec.name() {
                flag.cancel();
            }
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.lookup(spec)
    }
}
