use super::{DependencySpec, PackageKey, ResolverKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Where the files of a resolved package can be obtained for scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageLocation {
    /// Gzipped tarball published on a registry
    Tarball(String),
    /// Package already present on disk (local project, `file:` dependency)
    Directory(PathBuf),
}

/// A resolved manifest as returned by the Manifest Source
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    pub dependencies: Vec<DependencySpec>,
    pub deprecated: bool,
    pub resolver_kind: ResolverKind,
    pub description: String,
    pub license: Option<String>,
    pub author: Option<String>,
    /// Size advertised by the registry, used when the package cannot be scanned
    pub unpacked_size: Option<u64>,
    pub location: Option<PackageLocation>,
    /// Registry-level facts; absent for local packages
    pub registry_metadata: Option<RegistryMetadata>,
}

impl Manifest {
    /// Minimal manifest, mostly useful to adapters and tests
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            dependencies: Vec::new(),
            deprecated: false,
            resolver_kind: ResolverKind::Registry,
            description: String::new(),
            license: None,
            author: None,
            unpacked_size: None,
            location: None,
            registry_metadata: None,
        }
    }

    pub fn with_dependency(mut self, name: &str, range: &str) -> Self {
        self.dependencies.push(DependencySpec::new(name, range));
        self
    }

    pub fn key(&self) -> PackageKey {
        PackageKey::new(&self.name, &self.version)
    }
}

/// One account that published at least one version of a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Publisher {
    pub name: String,
    /// First version published by this account
    pub version: String,
    pub at: Option<DateTime<Utc>>,
}

/// Registry-level facts about a package name, independent of any single version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryMetadata {
    pub published_count: usize,
    pub last_update_at: Option<DateTime<Utc>>,
    pub last_version: Option<String>,
    pub has_changed_author: bool,
    pub has_many_publishers: bool,
    pub homepage: String,
    pub author: String,
    pub publishers: Vec<Publisher>,
    pub authors: Vec<String>,
}

impl Default for RegistryMetadata {
    fn default() -> Self {
        Self {
            published_count: 0,
            last_update_at: None,
            last_version: None,
            has_changed_author: false,
            has_many_publishers: false,
            homepage: String::new(),
            author: "N/A".to_string(),
            publishers: Vec::new(),
            authors: Vec::new(),
        }
    }
}
