use serde::Serialize;
use std::collections::BTreeSet;

/// File-level composition of a package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Composition {
    pub extensions: BTreeSet<String>,
    pub files: Vec<String>,
    pub minified: Vec<String>,
    pub required: Vec<String>,
    pub required_builtin: Vec<String>,
}

/// Classification of a static-analysis finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum WarningKind {
    /// `require` called with something that is not a string literal
    #[serde(rename = "unsafe-import")]
    UnsafeImport,
    /// Import specifier hidden behind escape sequences
    #[serde(rename = "suspicious-import")]
    SuspiciousImport,
    /// `eval` or `new Function`
    #[serde(rename = "unsafe-stmt")]
    UnsafeStatement,
    /// Long base64 or hexadecimal string literal
    #[serde(rename = "encoded-literal")]
    EncodedLiteral,
}

impl WarningKind {
    /// Whether this finding marks the package as importing something it should not
    pub fn is_suspect_import(self) -> bool {
        matches!(self, WarningKind::UnsafeImport | WarningKind::SuspiciousImport)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Information,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

/// A SAST warning emitted by the Static Code Scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SastWarning {
    pub kind: WarningKind,
    pub severity: Severity,
    pub file: String,
    pub location: SourceLocation,
}

/// Outcome of scanning one package's file tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub composition: Composition,
    /// Total size of the files, in bytes
    pub size: u64,
    pub warnings: Vec<SastWarning>,
}

impl ScanReport {
    pub fn has_suspect_import(&self) -> bool {
        self.warnings.iter().any(|w| w.kind.is_suspect_import())
    }
}

/// Distinguishes "scanned and clean" from "never scanned"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Scanned,
    Failed,
    Skipped,
}
