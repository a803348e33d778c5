use crate::adapters::outbound::package_json::PackageJson;
use crate::dependency_graph::domain::{DependencySpec, Manifest, PackageLocation, ResolverKind};
use crate::ports::outbound::ManifestSource;
use crate::shared::error::FetchError;
use crate::shared::security::{read_regular_file, MAX_FILE_SIZE};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Version reported for local packages whose package.json has none
const UNVERSIONED: &str = "0.0.0";

/// PackageJsonReader adapter for packages that live on disk
///
/// Serves the local project root and `file:` / `link:` dependencies.
/// Relative paths in specs handed in from outside are resolved against
/// `base_dir`, the project directory. Local dependencies declared by a package
/// read here are rewritten to absolute paths anchored at that package's
/// directory, so `file:../b` always means a sibling of the declaring package.
pub struct PackageJsonReader {
    base_dir: PathBuf,
}

impl PackageJsonReader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn package_dir(&self, relative: &str) -> PathBuf {
        let relative = match relative.strip_prefix("~/") {
            Some(rest) => match std::env::var_os("HOME") {
                Some(home) => return PathBuf::from(home).join(rest),
                None => rest,
            },
            None => relative,
        };
        normalize(&self.base_dir.join(relative))
    }

    /// Rewrites relative `file:`/`link:` dependencies against `dir`
    fn anchor_local_dependencies(manifest: &mut Manifest, dir: &Path) {
        for dependency in &mut manifest.dependencies {
            let anchored = match dependency.local_path() {
                Some(path) if !path.starts_with("~/") && !Path::new(path).is_absolute() => {
                    normalize(&dir.join(path))
                }
                _ => continue,
            };
            let name = dependency.name().to_string();
            *dependency = DependencySpec::local(name, &anchored);
        }
    }

    /// Reads and parses `<dir>/package.json` with the filesystem security checks
    fn read_manifest(&self, spec: &DependencySpec, dir: &Path) -> Result<Manifest, FetchError> {
        let path = dir.join("package.json");
        if !path.exists() {
            return Err(FetchError::NotFound {
                spec: format!("{} ({})", spec, path.display()),
            });
        }

        let invalid = |reason: String| FetchError::InvalidSpec {
            spec: spec.to_string(),
            reason,
        };

        let content = read_regular_file(&path, "package.json", MAX_FILE_SIZE)
            .map_err(|e| invalid(e.to_string()))?;
        let document: PackageJson = serde_json::from_str(&content)
            .map_err(|e| invalid(format!("Failed to parse {}: {}", path.display(), e)))?;

        let mut manifest = document.into_manifest(spec.name(), UNVERSIONED);
        manifest.resolver_kind = ResolverKind::File;
        manifest.location = Some(PackageLocation::Directory(dir.to_path_buf()));
        Self::anchor_local_dependencies(&mut manifest, dir);
        Ok(manifest)
    }
}

/// Lexically removes `.` and `..` components without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[async_trait]
impl ManifestSource for PackageJsonReader {
    async fn fetch_manifest(&self, spec: &DependencySpec) -> Result<Manifest, FetchError> {
        let Some(relative) = spec.local_path() else {
            return Err(FetchError::Unsupported {
                spec: spec.to_string(),
                reason: "not a local package".to_string(),
            });
        };

        let dir = self.package_dir(relative);
        self.read_manifest(spec, &dir)
    }
}
