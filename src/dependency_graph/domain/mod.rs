pub mod dependency_node;
pub mod dependency_spec;
pub mod manifest;
pub mod scan_report;
pub mod walk_result;

pub use dependency_node::{DependencyNode, NodeFlags, NodeId, NodeRecord, NodeResolution, ScanOutcome};
pub use dependency_spec::{DependencySpec, PackageKey, ResolverKind};
pub use manifest::{Manifest, PackageLocation, Publisher, RegistryMetadata};
pub use scan_report::{
    Composition, SastWarning, ScanReport, ScanStatus, Severity, SourceLocation, WarningKind,
};
pub use walk_result::{version_key, DependencyPayload, GraphStatistics, PackageEntry, WalkResult};
