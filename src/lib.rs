//! depwalk - security-annotated dependency graph walker for npm packages
//!
//! Starting from a local project or a registry package, the walker resolves
//! every declared dependency up to a configurable depth, scans each package's
//! sources and produces a keyed payload of annotated nodes.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`dependency_graph`): graph model, identity allocation,
//!   resolution cache and payload serialization
//! - **Application Layer** (`application`): the graph walker use case and its request DTO
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): npm registry, local manifests, scanner, console output
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use depwalk::prelude::*;
//! use std::time::Duration;
//!
//! # async fn walk() -> Result<()> {
//! let timeout = Duration::from_secs(30);
//! let manifest_source = ManifestRouter::new(
//!     NpmRegistryClient::new()?,
//!     PackageJsonReader::new("."),
//! );
//! let use_case = WalkDependenciesUseCase::new(
//!     manifest_source,
//!     JavaScriptPackageScanner::new(timeout)?,
//!     StderrProgressReporter::new(),
//! );
//!
//! let request = WalkRequest::builder()
//!     .package(DependencySpec::parse("express@^4.18.0")?)
//!     .max_depth(1)
//!     .build()?;
//! let result = use_case.execute(request).await?;
//! println!("{}", result.to_json()?);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod dependency_graph;
pub mod ports;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::{StderrProgressReporter, SummaryPrinter};
    pub use crate::adapters::outbound::filesystem::{
        FileSystemWriter, PackageJsonReader, StdoutPresenter,
    };
    pub use crate::adapters::outbound::network::NpmRegistryClient;
    pub use crate::adapters::outbound::scanner::JavaScriptPackageScanner;
    pub use crate::adapters::outbound::ManifestRouter;
    pub use crate::application::dto::{WalkRequest, WalkRoot};
    pub use crate::application::use_cases::WalkDependenciesUseCase;
    pub use crate::application::CancellationFlag;
    pub use crate::dependency_graph::domain::{
        DependencySpec, Manifest, NodeFlags, NodeRecord, PackageKey, ResolverKind, ScanReport,
        WalkResult,
    };
    pub use crate::ports::outbound::{
        ManifestSource, OutputPresenter, PackageScanner, ProgressReporter,
    };
    pub use crate::shared::error::{FetchError, WalkError};
    pub use crate::shared::Result;
}
