use crate::application::cancellation::CancellationFlag;
use crate::dependency_graph::domain::DependencySpec;
use crate::shared::error::DepwalkError;
use crate::shared::Result;
use std::path::PathBuf;

/// Default number of dependency levels resolved below the root
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Default cap on simultaneous fetches and scans
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 8;

/// Where a walk starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkRoot {
    /// Project directory containing a package.json
    LocalProject(PathBuf),
    /// Registry package, e.g. `express@^4.0.0`
    Package(DependencySpec),
}

impl WalkRoot {
    /// Spec handed to the Manifest Source for the root
    pub fn spec(&self) -> DependencySpec {
        match self {
            WalkRoot::LocalProject(path) => {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| ".".to_string());
                DependencySpec::local(name, path)
            }
            WalkRoot::Package(spec) => spec.clone(),
        }
    }
}

/// WalkRequest - Internal request DTO for the graph walker
///
/// Use [`WalkRequest::builder`] to construct one; the builder applies the
/// defaults and rejects a zero concurrency limit.
#[derive(Debug, Clone)]
pub struct WalkRequest {
    pub root: WalkRoot,
    /// Depth of the deepest resolved dependency; the root is depth 0
    pub max_depth: usize,
    pub concurrency_limit: usize,
    pub cancellation: CancellationFlag,
}

impl WalkRequest {
    pub fn builder() -> WalkRequestBuilder {
        WalkRequestBuilder::default()
    }
}

/// Builder for [`WalkRequest`]
#[derive(Debug, Default)]
pub struct WalkRequestBuilder {
    root: Option<WalkRoot>,
    max_depth: Option<usize>,
    concurrency_limit: Option<usize>,
    cancellation: Option<CancellationFlag>,
}

impl WalkRequestBuilder {
    pub fn project_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(WalkRoot::LocalProject(path.into()));
        self
    }

    pub fn package(mut self, spec: DependencySpec) -> Self {
        self.root = Some(WalkRoot::Package(spec));
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = Some(limit);
        self
    }

    pub fn cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    pub fn build(self) -> Result<WalkRequest> {
        let root = self.root.ok_or_else(|| DepwalkError::Validation {
            message: "a walk needs a root: a project path or a package".to_string(),
        })?;

        let concurrency_limit = self.concurrency_limit.unwrap_or(DEFAULT_CONCURRENCY_LIMIT);
        if concurrency_limit == 0 {
            return Err(DepwalkError::Validation {
                message: "concurrency limit must be at least 1".to_string(),
            }
            .into());
        }

        Ok(WalkRequest {
            root,
            max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
            concurrency_limit,
            cancellation: self.cancellation.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let request = WalkRequest::builder()
            .package(DependencySpec::new("express", "^4.0.0"))
            .build()
            .unwrap();

        assert_eq!(request.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(request.concurrency_limit, DEFAULT_CONCURRENCY_LIMIT);
        assert!(!request.cancellation.is_cancelled());
    }

    #[test]
    fn test_builder_requires_root() {
        let result = WalkRequest::builder().max_depth(3).build();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("root"));
    }

    #[test]
    fn test_builder_rejects_zero_concurrency() {
        let result = WalkRequest::builder()
            .project_path(".")
            .concurrency_limit(0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_depth_is_allowed() {
        let request = WalkRequest::builder()
            .project_path("/tmp/project")
            .max_depth(0)
            .build()
            .unwrap();
        assert_eq!(request.max_depth, 0);
    }

    #[test]
    fn test_local_root_spec() {
        let root = WalkRoot::LocalProject(PathBuf::from("/work/my-app"));
        let spec = root.spec();

        assert_eq!(spec.name(), "my-app");
        assert_eq!(spec.local_path(), Some("/work/my-app"));
    }
}
