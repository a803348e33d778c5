use super::{NodeRecord, PackageKey, RegistryMetadata};
use serde::Serialize;
use std::collections::BTreeMap;

const METADATA_KEY: &str = "metadata";

/// Key of `version` inside a [`PackageEntry`].
///
/// Versions share the object with the literal `metadata` key, so a failed
/// node keyed by the declared range `metadata` is stored as `=metadata`.
pub fn version_key(version: &str) -> String {
    if version == METADATA_KEY {
        format!("={}", version)
    } else {
        version.to_string()
    }
}

/// All versions of one package name plus the registry metadata of that name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageEntry {
    #[serde(flatten)]
    pub versions: BTreeMap<String, NodeRecord>,
    pub metadata: RegistryMetadata,
}

/// `name -> { version -> record, metadata }`, the shape report renderers consume
pub type DependencyPayload = BTreeMap<String, PackageEntry>;

/// Whole-graph statistics computed once from the finalized node set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStatistics {
    pub total_packages: usize,
    pub total_size: u64,
    pub packages_with_indirect_dependencies: usize,
    pub extensions: BTreeMap<String, usize>,
    pub licenses: BTreeMap<String, usize>,
    pub scan_failures: usize,
    pub missing_manifests: usize,
}

/// Finalized output of one complete graph walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkResult {
    pub root: PackageKey,
    pub dependencies: DependencyPayload,
    pub statistics: GraphStatistics,
}

impl WalkResult {
    pub fn node_count(&self) -> usize {
        self.dependencies
            .values()
            .map(|entry| entry.versions.len())
            .sum()
    }

    pub fn record(&self, name: &str, version: &str) -> Option<&NodeRecord> {
        self.dependencies
            .get(name)?
            .versions
            .get(&version_key(version))
    }

    pub fn records(&self) -> impl Iterator<Item = &NodeRecord> {
        self.dependencies
            .values()
            .flat_map(|entry| entry.versions.values())
    }

    /// Pretty JSON of the dependency payload
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.dependencies)
    }
}
