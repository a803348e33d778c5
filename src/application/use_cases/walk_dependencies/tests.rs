use super::*;
use crate::dependency_graph::domain::{PackageLocation, ResolverKind, ScanReport, ScanStatus};
use crate::shared::Result;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

// Mock implementations for testing
#[derive(Default)]
struct MockManifestSource {
    manifests: HashMap<String, Vec<Manifest>>,
    calls: Mutex<HashMap<String, usize>>,
    delays: HashMap<String, Duration>,
    cancel_on: Option<(String, CancellationFlag)>,
}

impl MockManifestSource {
    fn with(mut self, manifest: Manifest) -> Self {
        self.manifests
            .entry(manifest.name.clone())
            .or_default()
            .push(manifest);
        self
    }

    fn with_delay(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }

    /// Cancels `flag` once the fetch of `name` completes
    fn cancelling_on(mut self, name: &str, flag: &CancellationFlag) -> Self {
        self.cancel_on = Some((name.to_string(), flag.clone()));
        self
    }

    fn calls(&self, spec: &str) -> usize {
        self.calls.lock().unwrap().get(spec).copied().unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl ManifestSource for MockManifestSource {
    async fn fetch_manifest(&self, spec: &DependencySpec) -> std::result::Result<Manifest, FetchError> {
        *self.calls.lock().unwrap().entry(spec.to_string()).or_insert(0) += 1;

        if let Some(delay) = self.delays.get(spec.name()) {
            tokio::time::sleep(*delay).await;
        }
        if let Some((name, flag)) = &self.cancel_on {
            if name == spec.name() {
                flag.cancel();
            }
        }

        if spec.kind() != ResolverKind::Registry {
            return Err(FetchError::Unsupported {
                spec: spec.to_string(),
                reason: "not a registry spec".to_string(),
            });
        }

        self.manifests
            .get(spec.name())
            .and_then(|versions| {
                versions
                    .iter()
                    .find(|m| spec.range() == "latest" || m.version == spec.range())
            })
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                spec: spec.to_string(),
            })
    }
}

#[derive(Default)]
struct MockScanner {
    failing: HashSet<String>,
    scanned: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl PackageScanner for MockScanner {
    async fn scan_package(&self, location: &PackageLocation) -> Result<ScanReport> {
        let PackageLocation::Tarball(url) = location else {
            anyhow::bail!("unexpected location");
        };
        self.scanned.lock().unwrap().push(url.clone());

        if self.failing.contains(url) {
            anyhow::bail!("corrupt archive");
        }
        Ok(ScanReport {
            size: 10,
            ..ScanReport::default()
        })
    }
}

#[derive(Default)]
struct MockProgressReporter {
    errors: Mutex<Vec<String>>,
}

impl ProgressReporter for MockProgressReporter {
    fn report(&self, _message: &str) {}
    fn report_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
    fn report_completion(&self, _message: &str) {}
}

fn manifest(name: &str, version: &str, deps: &[(&str, &str)]) -> Manifest {
    let mut manifest = Manifest::new(name, version);
    for (dep, range) in deps {
        manifest = manifest.with_dependency(dep, range);
    }
    manifest.license = Some("MIT".to_string());
    manifest.location = Some(PackageLocation::Tarball(format!("{}-{}.tgz", name, version)));
    manifest
}

fn request(max_depth: usize) -> WalkRequest {
    WalkRequest::builder()
        .package(DependencySpec::new("root", "latest"))
        .max_depth(max_depth)
        .concurrency_limit(4)
        .build()
        .unwrap()
}

fn use_case(
    source: MockManifestSource,
    scanner: MockScanner,
) -> WalkDependenciesUseCase<MockManifestSource, MockScanner, MockProgressReporter> {
    WalkDependenciesUseCase::new(source, scanner, MockProgressReporter::default())
}

#[tokio::test]
async fn test_root_without_dependencies() {
    let source = MockManifestSource::default().with(manifest("root", "1.0.0", &[]));
    let result = use_case(source, MockScanner::default())
        .execute(request(2))
        .await
        .unwrap();

    assert_eq!(result.node_count(), 1);
    let root = result.record("root", "1.0.0").unwrap();
    assert_eq!(root.id.value(), 1);
    assert!(!root.flags.has_dependencies);
    assert!(root.used_by.is_empty());
}

#[tokio::test]
async fn test_root_resolution_failure_is_fatal() {
    let result = use_case(MockManifestSource::default(), MockScanner::default())
        .execute(request(2))
        .await;

    assert!(matches!(
        result,
        Err(WalkError::RootResolution {
            error: FetchError::NotFound { .. },
            ..
        })
    ));
}

#[tokio::test]
async fn test_root_scan_failure_is_fatal() {
    let source = MockManifestSource::default().with(manifest("root", "1.0.0", &[]));
    let scanner = MockScanner {
        failing: HashSet::from(["root-1.0.0.tgz".to_string()]),
        ..MockScanner::default()
    };

    let result = use_case(source, scanner).execute(request(2)).await;
    assert!(matches!(result, Err(WalkError::RootScan { .. })));
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let source = MockManifestSource::default().with(manifest("root", "1.0.0", &[]));
    let flag = CancellationFlag::new();
    flag.cancel();
    let request = WalkRequest::builder()
        .package(DependencySpec::new("root", "latest"))
        .cancellation(flag)
        .build()
        .unwrap();

    let use_case = use_case(source, MockScanner::default());
    let result = use_case.execute(request).await;

    assert!(matches!(result, Err(WalkError::Cancelled)));
    assert_eq!(use_case.manifest_source.calls("root@latest"), 0);
}

#[tokio::test]
async fn test_zero_depth_yields_only_root() {
    let source = MockManifestSource::default()
        .with(manifest("root", "1.0.0", &[("a", "1.0.0")]))
        .with(manifest("a", "1.0.0", &[]));

    let use_case = use_case(source, MockScanner::default());
    let result = use_case.execute(request(0)).await.unwrap();

    assert_eq!(result.node_count(), 1);
    assert!(result.record("root", "1.0.0").unwrap().flags.has_dependencies);
    assert_eq!(use_case.manifest_source.calls("a@1.0.0"), 0);
}

#[tokio::test]
async fn test_cycle_terminates() {
    let source = MockManifestSource::default()
        .with(manifest("root", "1.0.0", &[("a", "1.0.0")]))
        .with(manifest("a", "1.0.0", &[("b", "1.0.0")]))
        .with(manifest("b", "1.0.0", &[("a", "1.0.0"), ("root", "1.0.0")]));

    let use_case = use_case(source, MockScanner::default());
    let result = use_case.execute(request(10)).await.unwrap();

    assert_eq!(result.node_count(), 3);
    let a = result.record("a", "1.0.0").unwrap();
    assert_eq!(a.used_by.get("root").map(String::as_str), Some("1.0.0"));
    assert_eq!(a.used_by.get("b").map(String::as_str), Some("1.0.0"));
    let root = result.record("root", "1.0.0").unwrap();
    assert_eq!(root.used_by.get("b").map(String::as_str), Some("1.0.0"));
    assert_eq!(use_case.manifest_source.calls("a@1.0.0"), 1);
}

#[tokio::test]
async fn test_unsupported_resolver_degrades_node() {
    let source = MockManifestSource::default().with(manifest(
        "root",
        "1.0.0",
        &[("gitdep", "github:user/gitdep")],
    ));

    let use_case = use_case(source, MockScanner::default());
    let result = use_case.execute(request(2)).await.unwrap();

    let record = result.record("gitdep", "github:user/gitdep").unwrap();
    assert!(!record.flags.has_manifest);
    assert!(record.flags.is_git);
    assert!(record.flags.has_custom_resolver);
    assert_eq!(record.used_by.get("root").map(String::as_str), Some("1.0.0"));
    assert_eq!(result.statistics.missing_manifests, 1);

    let errors = use_case.progress_reporter.errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("gitdep"));
}

#[tokio::test]
async fn test_scan_failure_keeps_manifest_fields() {
    let mut a = manifest("a", "1.0.0", &[]);
    a.unpacked_size = Some(4096);
    a.description = "package a".to_string();
    let source = MockManifestSource::default()
        .with(manifest("root", "1.0.0", &[("a", "1.0.0")]))
        .with(a);
    let scanner = MockScanner {
        failing: HashSet::from(["a-1.0.0.tgz".to_string()]),
        ..MockScanner::default()
    };

    let use_case = use_case(source, scanner);
    let result = use_case.execute(request(2)).await.unwrap();

    let record = result.record("a", "1.0.0").unwrap();
    assert_eq!(record.scan_status, ScanStatus::Failed);
    assert!(record.flags.has_manifest);
    assert!(!record.flags.has_suspect_import);
    assert!(record.composition.files.is_empty());
    assert_eq!(record.description, "package a");
    assert_eq!(record.size, 4096);
    assert_eq!(result.statistics.scan_failures, 1);
}

#[tokio::test]
async fn test_same_spec_fetched_once() {
    let source = MockManifestSource::default()
        .with(manifest("root", "1.0.0", &[("a", "1.0.0"), ("b", "1.0.0")]))
        .with(manifest("a", "1.0.0", &[("missing", "9.9.9")]))
        .with(manifest("b", "1.0.0", &[("missing", "9.9.9")]));

    let use_case = use_case(source, MockScanner::default());
    let result = use_case.execute(request(3)).await.unwrap();

    assert_eq!(use_case.manifest_source.calls("missing@9.9.9"), 1);
    let missing = result.record("missing", "9.9.9").unwrap();
    assert_eq!(missing.used_by.len(), 2);
}

#[tokio::test]
async fn test_ids_are_dense_from_one() {
    let source = MockManifestSource::default()
        .with(manifest("root", "1.0.0", &[("a", "1.0.0"), ("b", "1.0.0")]))
        .with(manifest("a", "1.0.0", &[("c", "1.0.0")]))
        .with(manifest("b", "1.0.0", &[("c", "1.0.0")]))
        .with(manifest("c", "1.0.0", &[]));

    let result = use_case(source, MockScanner::default())
        .execute(request(2))
        .await
        .unwrap();

    let mut ids: Vec<u64> = result.records().map(|record| record.id.value()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(result.record("root", "1.0.0").unwrap().id.value(), 1);
}

#[tokio::test]
async fn test_queued_fetch_observes_cancellation() {
    // Two permits: "slow" holds one while a1 and a2 queue for the other
    let flag = CancellationFlag::new();
    let source = MockManifestSource::default()
        .with(manifest("root", "1.0.0", &[("slow", "1.0.0"), ("a", "1.0.0")]))
        .with(manifest("slow", "1.0.0", &[]))
        .with(manifest("a", "1.0.0", &[("a1", "1.0.0"), ("a2", "1.0.0")]))
        .with(manifest("a1", "1.0.0", &[]))
        .with(manifest("a2", "1.0.0", &[]))
        .with_delay("slow", Duration::from_millis(200))
        .with_delay("a1", Duration::from_millis(20))
        .cancelling_on("a1", &flag);
    let request = WalkRequest::builder()
        .package(DependencySpec::new("root", "latest"))
        .max_depth(3)
        .concurrency_limit(2)
        .cancellation(flag)
        .build()
        .unwrap();

    let use_case = use_case(source, MockScanner::default());
    let result = use_case.execute(request).await;

    assert!(matches!(result, Err(WalkError::Cancelled)));
    assert_eq!(use_case.manifest_source.calls("a1@1.0.0"), 1);
    assert_eq!(use_case.manifest_source.calls("a2@1.0.0"), 0);
    assert!(!use_case
        .package_scanner
        .scanned
        .lock()
        .unwrap()
        .contains(&"a1-1.0.0.tgz".to_string()));
}
