use crate::application::cancellation::CancellationFlag;
use crate::application::dto::WalkRequest;
use crate::dependency_graph::domain::{
    DependencyNode, DependencySpec, Manifest, NodeResolution, PackageKey, ScanOutcome, WalkResult,
};
use crate::dependency_graph::services::{PayloadSerializer, ResolutionCache};
use crate::ports::outbound::{ManifestSource, PackageScanner, ProgressReporter};
use crate::shared::error::{FetchError, WalkError};
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tokio::sync::{OnceCell, Semaphore};
use tracing::{debug, warn};

/// Memoised outcome of one manifest fetch
type ManifestSlot = Arc<OnceCell<Result<Arc<Manifest>, FetchError>>>;

/// WalkDependenciesUseCase - the Graph Walker
///
/// Resolves a root package and its transitive dependencies up to the
/// requested depth, deduplicating every (name, version) into a single shared
/// node, and serializes the finalized node set.
///
/// # Type Parameters
/// * `MS` - ManifestSource implementation
/// * `PS` - PackageScanner implementation
/// * `PR` - ProgressReporter implementation
pub struct WalkDependenciesUseCase<MS, PS, PR> {
    manifest_source: MS,
    package_scanner: PS,
    progress_reporter: PR,
}

impl<MS, PS, PR> WalkDependenciesUseCase<MS, PS, PR>
where
    MS: ManifestSource,
    PS: PackageScanner,
    PR: ProgressReporter,
{
    /// Creates a new WalkDependenciesUseCase with injected dependencies
    pub fn new(manifest_source: MS, package_scanner: PS, progress_reporter: PR) -> Self {
        Self {
            manifest_source,
            package_scanner,
            progress_reporter,
        }
    }

    /// Executes one complete walk
    ///
    /// Every walk starts from a fresh resolution cache and identity
    /// allocator, so ids run from 1 to the number of nodes.
    ///
    /// # Errors
    /// Only root failures and cancellation abort the walk; any other
    /// failure degrades the affected node and is reported as a warning.
    pub async fn execute(&self, request: WalkRequest) -> Result<WalkResult, WalkError> {
        let root_spec = request.root.spec();
        self.progress_reporter.report(&format!(
            "🔍 Walking dependencies of {} (max depth {})",
            root_spec, request.max_depth
        ));

        let walk = Walk::new(&self.manifest_source, &self.package_scanner, &request);
        let outcome = self.run_with_progress(&walk, &root_spec).await;

        for failure in walk.take_failures() {
            self.progress_reporter
                .report_error(&format!("⚠️  Warning: {}", failure));
        }

        let result = outcome?;
        self.progress_reporter.report_completion(&format!(
            "✅ Dependency walk complete: {} package version(s) resolved",
            result.node_count()
        ));

        Ok(result)
    }

    async fn run_with_progress(
        &self,
        walk: &Walk<'_, MS, PS>,
        root_spec: &DependencySpec,
    ) -> Result<WalkResult, WalkError> {
        let is_done = Arc::new(AtomicBool::new(false));
        let discovered = Arc::clone(&walk.discovered);
        let visited = Arc::clone(&walk.visited);
        let done_clone = Arc::clone(&is_done);

        // Spawn a thread to update the progress bar
        let progress_handle = thread::spawn(move || {
            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("   {spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} - {msg}")
                    .expect("Failed to set progress bar template")
                    .progress_chars("=>-"),
            );
            pb.set_message("Resolving dependencies...");

            // Poll for updates until done
            while !done_clone.load(Ordering::Relaxed) {
                pb.set_length(discovered.load(Ordering::Relaxed) as u64);
                pb.set_position(visited.load(Ordering::Relaxed) as u64);
                thread::sleep(Duration::from_millis(50));
            }

            pb.finish_and_clear();
        });

        let outcome = walk.run(root_spec).await;

        // Signal completion and wait for progress bar thread
        is_done.store(true, Ordering::Relaxed);
        let _ = progress_handle.join();

        outcome
    }
}

/// State of a single walk. Dropped once the result is serialized.
struct Walk<'a, MS, PS> {
    manifest_source: &'a MS,
    package_scanner: &'a PS,
    cache: ResolutionCache,
    manifests: DashMap<DependencySpec, ManifestSlot>,
    permits: Semaphore,
    max_depth: usize,
    fan_out: usize,
    cancellation: CancellationFlag,
    discovered: Arc<AtomicUsize>,
    visited: Arc<AtomicUsize>,
    failures: Mutex<Vec<String>>,
}

impl<'a, MS, PS> Walk<'a, MS, PS>
where
    MS: ManifestSource,
    PS: PackageScanner,
{
    fn new(manifest_source: &'a MS, package_scanner: &'a PS, request: &WalkRequest) -> Self {
        Self {
            manifest_source,
            package_scanner,
            cache: ResolutionCache::new(),
            manifests: DashMap::new(),
            permits: Semaphore::new(request.concurrency_limit),
            max_depth: request.max_depth,
            fan_out: request.concurrency_limit,
            cancellation: request.cancellation.clone(),
            discovered: Arc::new(AtomicUsize::new(1)),
            visited: Arc::new(AtomicUsize::new(0)),
            failures: Mutex::new(Vec::new()),
        }
    }

    async fn run(&self, root_spec: &DependencySpec) -> Result<WalkResult, WalkError> {
        if self.cancellation.is_cancelled() {
            return Err(WalkError::Cancelled);
        }

        let manifest = self
            .fetch_manifest(root_spec)
            .await
            .map_err(|error| match error {
                FetchError::Cancelled { .. } => WalkError::Cancelled,
                error => WalkError::RootResolution {
                    spec: root_spec.to_string(),
                    error,
                },
            })?;

        let scan = self.scan(&manifest).await;
        if let ScanOutcome::Failed(details) = &scan {
            return Err(WalkError::RootScan {
                package: manifest.key().to_string(),
                details: details.clone(),
            });
        }

        let root = self
            .cache
            .get_or_create(manifest.key(), || async {
                NodeResolution::resolved(None, &manifest, scan)
            })
            .await;
        self.visited.fetch_add(1, Ordering::Relaxed);
        debug!(root = %root.key(), id = %root.id(), "root resolved");

        if self.max_depth > 0 && root.claim_expansion() {
            self.expand(&root, 0).await;
        }

        if self.cancellation.is_cancelled() {
            return Err(WalkError::Cancelled);
        }

        let nodes = self.cache.nodes();
        Ok(PayloadSerializer::serialize(&root, &nodes))
    }

    /// Visits every direct dependency of `node`, which sits at `depth`
    async fn expand(&self, node: &Arc<DependencyNode>, depth: usize) {
        let specs = node.dependencies().to_vec();
        self.discovered.fetch_add(specs.len(), Ordering::Relaxed);

        let children: Vec<Option<Arc<DependencyNode>>> = stream::iter(specs)
            .map(|spec| self.visit(node.key(), spec, depth + 1))
            .buffer_unordered(self.fan_out)
            .collect()
            .await;

        if children
            .iter()
            .flatten()
            .any(|child| child.flags().has_dependencies)
        {
            node.mark_indirect_dependencies();
        }
    }

    /// Resolves `spec` declared by `parent` and recurses while depth allows.
    ///
    /// Returns `None` when the walk was cancelled before the visit started.
    fn visit<'s>(
        &'s self,
        parent: &'s PackageKey,
        spec: DependencySpec,
        depth: usize,
    ) -> BoxFuture<'s, Option<Arc<DependencyNode>>> {
        async move {
            if self.cancellation.is_cancelled() {
                return None;
            }

            let node = self.resolve(&spec).await;
            node.record_parent(parent);
            self.visited.fetch_add(1, Ordering::Relaxed);

            if depth < self.max_depth && node.has_manifest() && node.claim_expansion() {
                self.expand(&node, depth).await;
            }

            Some(node)
        }
        .boxed()
    }

    /// Returns the shared node for `spec`, creating it on first sight.
    async fn resolve(&self, spec: &DependencySpec) -> Arc<DependencyNode> {
        match self.fetch_manifest(spec).await {
            Ok(manifest) => {
                self.cache
                    .get_or_create(manifest.key(), || async {
                        let scan = self.scan(&manifest).await;
                        if let ScanOutcome::Failed(details) = &scan {
                            self.record_failure(format!(
                                "Failed to scan {}: {}",
                                manifest.key(),
                                details
                            ));
                        }
                        debug!(package = %manifest.key(), "package resolved");
                        NodeResolution::resolved(Some(spec.kind()), &manifest, scan)
                    })
                    .await
            }
            Err(error) => {
                // Nothing was resolved, so the declared range stands in for the version
                let key = PackageKey::new(spec.name(), spec.range());
                self.cache
                    .get_or_create(key, || async {
                        if !matches!(error, FetchError::Cancelled { .. }) {
                            warn!(spec = %spec, error = %error, "manifest unavailable");
                            self.record_failure(error.to_string());
                        }
                        NodeResolution::failed(Some(spec.kind()))
                    })
                    .await
            }
        }
    }

    /// Fetches the manifest of `spec` at most once per walk, failures included
    async fn fetch_manifest(&self, spec: &DependencySpec) -> Result<Arc<Manifest>, FetchError> {
        let slot = Arc::clone(
            self.manifests
                .entry(spec.clone())
                .or_insert_with(ManifestSlot::default)
                .value(),
        );

        slot.get_or_init(|| async {
            let _permit = self.permits.acquire().await.ok();
            if self.cancellation.is_cancelled() {
                return Err(FetchError::Cancelled {
                    spec: spec.to_string(),
                });
            }
            debug!(spec = %spec, "fetching manifest");
            self.manifest_source.fetch_manifest(spec).await.map(Arc::new)
        })
        .await
        .clone()
    }

    async fn scan(&self, manifest: &Manifest) -> ScanOutcome {
        let Some(location) = &manifest.location else {
            return ScanOutcome::Skipped;
        };
        if self.cancellation.is_cancelled() {
            return ScanOutcome::Skipped;
        }

        let _permit = self.permits.acquire().await.ok();
        if self.cancellation.is_cancelled() {
            return ScanOutcome::Skipped;
        }
        match self.package_scanner.scan_package(location).await {
            Ok(report) => ScanOutcome::Scanned(report),
            Err(error) => {
                warn!(package = %manifest.key(), error = %error, "scan failed");
                ScanOutcome::Failed(format!("{:#}", error))
            }
        }
    }

    fn record_failure(&self, message: String) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }

    fn take_failures(&self) -> Vec<String> {
        std::mem::take(&mut *self.failures.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests;
