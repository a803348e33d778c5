use super::{
    Composition, DependencySpec, Manifest, PackageKey, RegistryMetadata, ResolverKind,
    SastWarning, ScanReport, ScanStatus,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Identifier issued once per unique (name, version) by the identity allocator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Security-relevant flags of a package version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeFlags {
    pub is_git: bool,
    pub has_manifest: bool,
    pub is_deprecated: bool,
    pub has_suspect_import: bool,
    pub has_license: bool,
    pub has_indirect_dependencies: bool,
    pub has_minified_code: bool,
    pub has_custom_resolver: bool,
    pub has_dependencies: bool,
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self {
            is_git: false,
            has_manifest: true,
            is_deprecated: false,
            has_suspect_import: false,
            has_license: false,
            has_indirect_dependencies: false,
            has_minified_code: false,
            has_custom_resolver: false,
            has_dependencies: false,
        }
    }
}

impl NodeFlags {
    fn for_resolver(kind: Option<ResolverKind>) -> Self {
        let kind = kind.unwrap_or(ResolverKind::Registry);
        Self {
            is_git: kind.is_git(),
            has_custom_resolver: kind.is_custom(),
            ..Self::default()
        }
    }
}

/// What the static scanner produced for a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Scanned(ScanReport),
    Failed(String),
    Skipped,
}

/// Everything a resolution factory computes for one package version.
///
/// Immutable once handed to the resolution cache.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeResolution {
    pub flags: NodeFlags,
    pub description: String,
    pub size: u64,
    pub author: String,
    pub license: String,
    pub license_from: String,
    pub composition: Composition,
    pub warnings: Vec<SastWarning>,
    pub scan_status: ScanStatus,
    pub scan_error: Option<String>,
    pub metadata: Option<RegistryMetadata>,
    pub dependencies: Vec<DependencySpec>,
}

impl NodeResolution {
    /// Merges a manifest and its scan outcome.
    ///
    /// `declared_kind` is the resolver of the edge that reached the package;
    /// `None` for the walk root.
    pub fn resolved(
        declared_kind: Option<ResolverKind>,
        manifest: &Manifest,
        scan: ScanOutcome,
    ) -> Self {
        let license = manifest.license.clone().unwrap_or_default();
        let mut flags = NodeFlags::for_resolver(declared_kind);
        flags.is_deprecated = manifest.deprecated;
        flags.has_license = !license.trim().is_empty();
        flags.has_dependencies = !manifest.dependencies.is_empty();

        let (report, scan_status, scan_error) = match scan {
            ScanOutcome::Scanned(report) => (Some(report), ScanStatus::Scanned, None),
            ScanOutcome::Failed(details) => (None, ScanStatus::Failed, Some(details)),
            ScanOutcome::Skipped => (None, ScanStatus::Skipped, None),
        };

        let (composition, warnings, size) = match report {
            Some(report) => {
                flags.has_suspect_import = report.has_suspect_import();
                flags.has_minified_code = !report.composition.minified.is_empty();
                (report.composition, report.warnings, report.size)
            }
            None => (
                Composition::default(),
                Vec::new(),
                manifest.unpacked_size.unwrap_or(0),
            ),
        };

        Self {
            flags,
            description: manifest.description.clone(),
            size,
            author: manifest
                .author
                .clone()
                .filter(|author| !author.trim().is_empty())
                .unwrap_or_else(|| "N/A".to_string()),
            license,
            license_from: "package.json".to_string(),
            composition,
            warnings,
            scan_status,
            scan_error,
            metadata: manifest.registry_metadata.clone(),
            dependencies: manifest.dependencies.clone(),
        }
    }

    /// Terminal state of a package whose manifest could not be fetched
    pub fn failed(declared_kind: Option<ResolverKind>) -> Self {
        let mut flags = NodeFlags::for_resolver(declared_kind);
        flags.has_manifest = false;

        Self {
            flags,
            description: String::new(),
            size: 0,
            author: "N/A".to_string(),
            license: String::new(),
            license_from: "package.json".to_string(),
            composition: Composition::default(),
            warnings: Vec::new(),
            scan_status: ScanStatus::Skipped,
            scan_error: None,
            metadata: None,
            dependencies: Vec::new(),
        }
    }
}

/// One resolved, deduplicated package version shared by every parent that reaches it.
///
/// Parents are kept as name/version snapshots in `used_by`, never as node
/// references, so the node set cannot form ownership cycles. Apart from
/// `used_by`, only `has_indirect_dependencies` changes after construction,
/// and only once the node's own children have been visited.
#[derive(Debug)]
pub struct DependencyNode {
    id: NodeId,
    key: PackageKey,
    resolution: NodeResolution,
    used_by: Mutex<BTreeMap<String, String>>,
    has_indirect_dependencies: AtomicBool,
    expansion_claimed: AtomicBool,
}

impl DependencyNode {
    pub fn new(id: NodeId, key: PackageKey, resolution: NodeResolution) -> Self {
        Self {
            id,
            key,
            resolution,
            used_by: Mutex::new(BTreeMap::new()),
            has_indirect_dependencies: AtomicBool::new(false),
            expansion_claimed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn key(&self) -> &PackageKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn version(&self) -> &str {
        &self.key.version
    }

    pub fn resolution(&self) -> &NodeResolution {
        &self.resolution
    }

    /// Direct dependencies declared by the manifest (empty when it was not found)
    pub fn dependencies(&self) -> &[DependencySpec] {
        &self.resolution.dependencies
    }

    pub fn flags(&self) -> NodeFlags {
        NodeFlags {
            has_indirect_dependencies: self.has_indirect_dependencies.load(Ordering::Acquire),
            ..self.resolution.flags
        }
    }

    pub fn has_manifest(&self) -> bool {
        self.resolution.flags.has_manifest
    }

    /// Records `parent` as depending on this node
    pub fn record_parent(&self, parent: &PackageKey) {
        self.used_by
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(parent.name.clone(), parent.version.clone());
    }

    pub fn used_by(&self) -> BTreeMap<String, String> {
        self.used_by
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns true for exactly one caller: the traversal path allowed to visit the children
    pub fn claim_expansion(&self) -> bool {
        !self.expansion_claimed.swap(true, Ordering::AcqRel)
    }

    pub fn mark_indirect_dependencies(&self) {
        self.has_indirect_dependencies.store(true, Ordering::Release);
    }

    /// Fresh, serializable copy of the node; nothing in it aliases live walker state
    pub fn to_record(&self) -> NodeRecord {
        let resolution = &self.resolution;
        NodeRecord {
            id: self.id,
            used_by: self.used_by(),
            flags: self.flags(),
            description: resolution.description.clone(),
            size: resolution.size,
            author: resolution.author.clone(),
            composition: resolution.composition.clone(),
            license_from: resolution.license_from.clone(),
            license: resolution.license.clone(),
            warnings: resolution.warnings.clone(),
            scan_status: resolution.scan_status,
            scan_error: resolution.scan_error.clone(),
        }
    }
}

/// Per-version entry of the produced payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: NodeId,
    pub used_by: BTreeMap<String, String>,
    pub flags: NodeFlags,
    pub description: String,
    pub size: u64,
    pub author: String,
    pub composition: Composition,
    pub license_from: String,
    pub license: String,
    pub warnings: Vec<SastWarning>,
    pub scan_status: ScanStatus,
    /// Why the scan failed, when it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency_graph::domain::{Severity, SourceLocation, WarningKind};

    fn manifest() -> Manifest {
        let mut manifest = Manifest::new("left-pad", "1.3.0").with_dependency("a", "^1.0.0");
        manifest.license = Some("MIT".to_string());
        manifest.author = Some("azer".to_string());
        manifest.unpacked_size = Some(4096);
        manifest
    }

    fn scan_report() -> ScanReport {
        let mut report = ScanReport {
            size: 2048,
            ..ScanReport::default()
        };
        report.composition.minified.push("index.min.js".to_string());
        report.warnings.push(SastWarning {
            kind: WarningKind::UnsafeImport,
            severity: Severity::Warning,
            file: "index.js".to_string(),
            location: SourceLocation { line: 3, column: 4 },
        });
        report
    }

    #[test]
    fn test_default_flags() {
        let flags = NodeFlags::default();
        assert!(flags.has_manifest);
        assert!(!flags.is_git);
        assert!(!flags.has_dependencies);
        assert!(!flags.has_indirect_dependencies);
    }

    #[test]
    fn test_resolved_with_scan() {
        let resolution = NodeResolution::resolved(
            Some(ResolverKind::Registry),
            &manifest(),
            ScanOutcome::Scanned(scan_report()),
        );

        assert!(resolution.flags.has_manifest);
        assert!(resolution.flags.has_license);
        assert!(resolution.flags.has_dependencies);
        assert!(resolution.flags.has_suspect_import);
        assert!(resolution.flags.has_minified_code);
        assert!(!resolution.flags.has_custom_resolver);
        assert_eq!(resolution.size, 2048);
        assert_eq!(resolution.author, "azer");
        assert_eq!(resolution.scan_status, ScanStatus::Scanned);
    }

    #[test]
    fn test_resolved_with_failed_scan_keeps_manifest_fields() {
        let resolution = NodeResolution::resolved(
            Some(ResolverKind::Git),
            &manifest(),
            ScanOutcome::Failed("tarball unreachable".to_string()),
        );

        assert!(resolution.flags.has_manifest);
        assert!(resolution.flags.is_git);
        assert!(resolution.flags.has_custom_resolver);
        assert!(!resolution.flags.has_suspect_import);
        assert!(resolution.composition.files.is_empty());
        assert_eq!(resolution.size, 4096);
        assert_eq!(resolution.license, "MIT");
        assert_eq!(resolution.scan_status, ScanStatus::Failed);
        assert_eq!(resolution.scan_error.as_deref(), Some("tarball unreachable"));
    }

    #[test]
    fn test_failed_resolution() {
        let resolution = NodeResolution::failed(Some(ResolverKind::Registry));

        assert!(!resolution.flags.has_manifest);
        assert!(!resolution.flags.has_dependencies);
        assert!(resolution.dependencies.is_empty());
        assert_eq!(resolution.author, "N/A");
        assert_eq!(resolution.composition, Composition::default());
    }

    #[test]
    fn test_root_never_has_custom_resolver() {
        let resolution = NodeResolution::resolved(None, &manifest(), ScanOutcome::Skipped);
        assert!(!resolution.flags.has_custom_resolver);
        assert!(!resolution.flags.is_git);
    }

    #[test]
    fn test_record_parent_accumulates() {
        let node = DependencyNode::new(
            NodeId::new(3),
            PackageKey::new("c", "2.0.0"),
            NodeResolution::failed(None),
        );

        node.record_parent(&PackageKey::new("a", "1.0.0"));
        node.record_parent(&PackageKey::new("b", "1.0.0"));
        node.record_parent(&PackageKey::new("a", "1.0.0"));

        let used_by = node.used_by();
        assert_eq!(used_by.len(), 2);
        assert_eq!(used_by["a"], "1.0.0");
        assert_eq!(used_by["b"], "1.0.0");
    }

    #[test]
    fn test_claim_expansion_only_once() {
        let node = DependencyNode::new(
            NodeId::new(1),
            PackageKey::new("a", "1.0.0"),
            NodeResolution::failed(None),
        );

        assert!(node.claim_expansion());
        assert!(!node.claim_expansion());
    }

    #[test]
    fn test_record_is_a_snapshot() {
        let node = DependencyNode::new(
            NodeId::new(1),
            PackageKey::new("a", "1.0.0"),
            NodeResolution::resolved(None, &manifest(), ScanOutcome::Skipped),
        );

        let before = node.to_record();
        node.record_parent(&PackageKey::new("root", "0.0.1"));
        node.mark_indirect_dependencies();

        assert!(before.used_by.is_empty());
        assert!(!before.flags.has_indirect_dependencies);

        let after = node.to_record();
        assert_eq!(after.used_by.len(), 1);
        assert!(after.flags.has_indirect_dependencies);
    }

    #[test]
    fn test_record_serialization_shape() {
        let node = DependencyNode::new(
            NodeId::new(7),
            PackageKey::new("a", "1.0.0"),
            NodeResolution::resolved(None, &manifest(), ScanOutcome::Skipped),
        );

        let value = serde_json::to_value(node.to_record()).unwrap();
        assert_eq!(value["id"], 7);
        assert!(value["usedBy"].as_object().unwrap().is_empty());
        assert_eq!(value["flags"]["hasManifest"], true);
        assert_eq!(value["licenseFrom"], "package.json");
        assert_eq!(value["scanStatus"], "skipped");
        assert!(value.get("scanError").is_none());
        assert!(value["composition"]["files"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_failed_scan_reason_reaches_record() {
        let node = DependencyNode::new(
            NodeId::new(2),
            PackageKey::new("left-pad", "1.3.0"),
            NodeResolution::resolved(
                None,
                &manifest(),
                ScanOutcome::Failed("tarball unreachable".to_string()),
            ),
        );

        let value = serde_json::to_value(node.to_record()).unwrap();
        assert_eq!(value["scanStatus"], "failed");
        assert_eq!(value["scanError"], "tarball unreachable");
    }
}
