use super::javascript_analyzer::JavaScriptAnalyzer;
use crate::dependency_graph::domain::{Composition, SastWarning, ScanReport};
use crate::shared::Result;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Directories never considered part of a package
const SKIPPED_DIRECTORIES: [&str; 2] = ["node_modules", ".git"];

/// Extensions whose contents are analysed as JavaScript
const JAVASCRIPT_EXTENSIONS: [&str; 5] = [".js", ".mjs", ".cjs", ".jsx", ".ts"];

/// Source files above this size are counted but not analysed (10 MB)
const MAX_ANALYZED_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Walks an extracted package and builds its scan report
pub struct FileTreeScanner;

impl FileTreeScanner {
    /// Scans every regular file under `root`. Symlinks are not followed.
    pub fn scan(root: &Path) -> Result<ScanReport> {
        if !root.is_dir() {
            anyhow::bail!("{} is not a directory", root.display());
        }

        let mut files = Vec::new();
        let mut extensions = BTreeSet::new();
        let mut minified = Vec::new();
        let mut required = BTreeSet::new();
        let mut required_builtin = BTreeSet::new();
        let mut warnings = Vec::new();
        let mut size = 0u64;

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !Self::is_skipped(entry));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = Self::relative_name(root, entry.path());
            let file_size = entry.metadata()?.len();
            size += file_size;

            let extension = Self::extension_of(entry.path());
            if let Some(extension) = &extension {
                extensions.insert(extension.clone());
            }

            let is_javascript = extension
                .as_deref()
                .is_some_and(|ext| JAVASCRIPT_EXTENSIONS.contains(&ext));
            if is_javascript && file_size <= MAX_ANALYZED_FILE_SIZE {
                let bytes = fs::read(entry.path())?;
                let source = String::from_utf8_lossy(&bytes);

                if JavaScriptAnalyzer::is_minified(&relative, &source) {
                    minified.push(relative.clone());
                }

                let analysis = JavaScriptAnalyzer::analyze(&source);
                required.extend(analysis.required);
                required_builtin.extend(analysis.required_builtin);
                warnings.extend(analysis.findings.into_iter().map(|finding| SastWarning {
                    kind: finding.kind,
                    severity: finding.severity,
                    file: relative.clone(),
                    location: finding.location,
                }));
            }

            files.push(relative);
        }

        Ok(ScanReport {
            composition: Composition {
                extensions,
                files,
                minified,
                required: required.into_iter().collect(),
                required_builtin: required_builtin.into_iter().collect(),
            },
            size,
            warnings,
        })
    }

    fn is_skipped(entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| SKIPPED_DIRECTORIES.contains(&name))
    }

    /// `/`-separated path relative to the package root
    fn relative_name(root: &Path, path: &Path) -> String {
        let relative = path.strip_prefix(root).unwrap_or(path);
        relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Lower-cased extension with its leading dot, e.g. `.js`
    fn extension_of(path: &Path) -> Option<String> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
    }
}
