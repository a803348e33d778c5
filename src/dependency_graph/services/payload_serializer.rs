use crate::dependency_graph::domain::{
    version_key, DependencyNode, DependencyPayload, GraphStatistics, NodeId, PackageEntry,
    RegistryMetadata, ScanStatus, WalkResult,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// PayloadSerializer turns the finalized node set into the canonical output.
///
/// This is a pure function of its input: every record is a fresh copy, and
/// names and versions are ordered lexically so serializing the same node
/// set twice yields identical bytes.
pub struct PayloadSerializer;

impl PayloadSerializer {
    /// Groups nodes by name then version and computes whole-graph statistics
    /// in a single pass over `nodes`.
    pub fn serialize(root: &DependencyNode, nodes: &[Arc<DependencyNode>]) -> WalkResult {
        let mut dependencies = DependencyPayload::new();
        let mut statistics = GraphStatistics::default();
        let mut metadata_source: HashMap<&str, NodeId> = HashMap::new();

        for node in nodes {
            let record = node.to_record();
            Self::accumulate(&mut statistics, node, record.flags.has_indirect_dependencies);

            let entry = dependencies
                .entry(node.name().to_string())
                .or_insert_with(|| PackageEntry {
                    versions: BTreeMap::new(),
                    metadata: RegistryMetadata::default(),
                });

            if let Some(metadata) = &node.resolution().metadata {
                let is_lowest = metadata_source
                    .get(node.name())
                    .map_or(true, |current| node.id() < *current);
                if is_lowest {
                    metadata_source.insert(node.name(), node.id());
                    entry.metadata = metadata.clone();
                }
            }

            entry.versions.insert(version_key(node.version()), record);
        }

        WalkResult {
            root: root.key().clone(),
            dependencies,
            statistics,
        }
    }

    fn accumulate(statistics: &mut GraphStatistics, node: &DependencyNode, has_indirect: bool) {
        let resolution = node.resolution();

        statistics.total_packages += 1;
        statistics.total_size += resolution.size;

        if has_indirect {
            statistics.packages_with_indirect_dependencies += 1;
        }
        if !node.has_manifest() {
            statistics.missing_manifests += 1;
        }
        if resolution.scan_status == ScanStatus::Failed {
            statistics.scan_failures += 1;
        }

        for extension in &resolution.composition.extensions {
            *statistics.extensions.entry(extension.clone()).or_insert(0) += 1;
        }

        let license = resolution.license.trim();
        if !license.is_empty() {
            *statistics.licenses.entry(license.to_string()).or_insert(0) += 1;
        }
    }
}
