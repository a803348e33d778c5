use crate::shared::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for npm package names (registry limit)
const MAX_PACKAGE_NAME_LENGTH: usize = 214;

/// Maximum length for a declared version range (security limit)
const MAX_RANGE_LENGTH: usize = 256;

/// How a declared dependency is resolved.
///
/// Derived from the range string the parent wrote in its manifest, the same
/// way npm decides between the registry and the alternative resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    Registry,
    Git,
    Url,
    File,
    Workspace,
}

impl ResolverKind {
    const GIT_PREFIXES: [&'static str; 9] = [
        "git+",
        "git://",
        "git@",
        "github:",
        "gitlab:",
        "bitbucket:",
        "gist:",
        "ssh://",
        "git:",
    ];

    /// Classifies a declared range (`^1.2.0`, `github:user/repo`, `file:../x`, ...)
    pub fn detect(range: &str) -> Self {
        let range = range.trim();

        if range.starts_with("workspace:") {
            return ResolverKind::Workspace;
        }

        if range.starts_with("file:")
            || range.starts_with("link:")
            || range.starts_with("./")
            || range.starts_with("../")
            || range.starts_with("~/")
            || range.starts_with('/')
        {
            return ResolverKind::File;
        }

        if Self::GIT_PREFIXES.iter().any(|prefix| range.starts_with(prefix)) {
            return ResolverKind::Git;
        }

        if range.starts_with("http://") || range.starts_with("https://") {
            return if range.ends_with(".git") || range.contains(".git#") {
                ResolverKind::Git
            } else {
                ResolverKind::Url
            };
        }

        // `user/repo` and `user/repo#ref` are GitHub shorthands
        if !range.starts_with("npm:") && !range.contains(' ') && range.contains('/') {
            return ResolverKind::Git;
        }

        ResolverKind::Registry
    }

    /// True for every resolver that bypasses the registry
    pub fn is_custom(self) -> bool {
        !matches!(self, ResolverKind::Registry)
    }

    pub fn is_git(self) -> bool {
        matches!(self, ResolverKind::Git)
    }
}

/// A dependency edge as declared by a parent manifest, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencySpec {
    name: String,
    range: String,
    kind: ResolverKind,
}

impl DependencySpec {
    /// Builds a spec from a manifest entry; the resolver kind is derived from the range.
    pub fn new(name: impl Into<String>, range: impl Into<String>) -> Self {
        let range = range.into();
        let range = if range.trim().is_empty() {
            "*".to_string()
        } else {
            range
        };
        let kind = ResolverKind::detect(&range);

        Self {
            name: name.into(),
            range,
            kind,
        }
    }

    /// Spec for a package living in a local directory (the `cwd` root).
    pub fn local(name: impl Into<String>, path: &std::path::Path) -> Self {
        Self {
            name: name.into(),
            range: format!("file:{}", path.display()),
            kind: ResolverKind::File,
        }
    }

    /// Parses a command line argument such as `express`, `express@^4` or `@scope/pkg@1.0.0`.
    ///
    /// A missing range means the `latest` dist-tag.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        // The first character of a scoped name is '@' and must not be taken as the separator
        let (name, range) = match input.get(1..).and_then(|rest| rest.rfind('@')) {
            Some(index) => (&input[..=index], &input[index + 2..]),
            None => (input, "latest"),
        };

        Self::validate_name(name)?;
        let range = if range.is_empty() { "latest" } else { range };
        if range.len() > MAX_RANGE_LENGTH {
            anyhow::bail!(
                "Version range is too long ({} bytes). Maximum allowed: {} bytes",
                range.len(),
                MAX_RANGE_LENGTH
            );
        }

        Ok(Self::new(name, range))
    }

    /// Validates an npm package name.
    ///
    /// Only the characters npm ever accepted are allowed, which also keeps the
    /// name safe to place in a registry URL.
    pub fn validate_name(name: &str) -> Result<()> {
        if name.is_empty() {
            anyhow::bail!("Package name cannot be empty");
        }

        if name.len() > MAX_PACKAGE_NAME_LENGTH {
            anyhow::bail!(
                "Package name is too long ({} bytes). Maximum allowed: {} bytes",
                name.len(),
                MAX_PACKAGE_NAME_LENGTH
            );
        }

        let bare = match name.strip_prefix('@') {
            Some(scoped) => {
                let Some((scope, package)) = scoped.split_once('/') else {
                    anyhow::bail!("Scoped package name '{}' is missing the '/' separator", name);
                };
                if scope.is_empty() || package.is_empty() {
                    anyhow::bail!("Scoped package name '{}' has an empty scope or name", name);
                }
                format!("{}{}", scope, package)
            }
            None => name.to_string(),
        };

        if name.contains("..") || bare.starts_with('.') || bare.starts_with('_') {
            anyhow::bail!("Package name '{}' cannot start with '.' or '_' or contain '..'", name);
        }

        if !bare
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '~')
        {
            anyhow::bail!(
                "Package name '{}' contains invalid characters. Only alphanumeric, hyphens, underscores, dots, and tildes are allowed.",
                name
            );
        }

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> &str {
        &self.range
    }

    pub fn kind(&self) -> ResolverKind {
        self.kind
    }

    /// Path part of a `file:`/`link:` spec
    pub fn local_path(&self) -> Option<&str> {
        if self.kind != ResolverKind::File {
            return None;
        }
        let range = self.range.as_str();
        Some(
            range
                .strip_prefix("file:")
                .or_else(|| range.strip_prefix("link:"))
                .unwrap_or(range),
        )
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.range)
    }
}

/// Identity of one resolved package version.
///
/// Also used as the name+version snapshot a child keeps of each parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageKey {
    pub name: String,
    pub version: String,
}

impl PackageKey {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for PackageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}
