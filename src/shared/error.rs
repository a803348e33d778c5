use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Walk completed and the payload was written
    Success = 0,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (root resolution, network, file I/O, config, ...)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Why the Manifest Source could not produce a manifest.
///
/// Cloneable because a failed fetch is memoised and handed to every
/// traversal path that declared the same spec.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Package not found: {spec}")]
    NotFound { spec: String },

    #[error("Network error while fetching {spec}: {details}")]
    Network { spec: String, details: String },

    #[error("Walk cancelled before {spec} was fetched")]
    Cancelled { spec: String },

    #[error("Malformed registry document for {spec}: {details}")]
    Malformed { spec: String, details: String },

    #[error("Invalid dependency spec {spec}: {reason}")]
    InvalidSpec { spec: String, reason: String },

    #[error("Cannot resolve {spec}: {reason}")]
    Unsupported { spec: String, reason: String },
}

/// Errors that abort a whole walk. Everything else degrades a single node.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("Failed to resolve root package {spec}\n\n💡 Hint: Check the package name and your network connection, or run from a directory containing package.json")]
    RootResolution {
        spec: String,
        #[source]
        error: FetchError,
    },

    #[error("Failed to scan root package {package}\nDetails: {details}")]
    RootScan { package: String, details: String },

    #[error("Dependency walk was cancelled")]
    Cancelled,
}

/// Application-specific errors for I/O around the walk.
#[derive(Debug, Error)]
pub enum DepwalkError {
    #[error("package.json not found: {path}\n\n💡 Hint: {suggestion}")]
    ManifestNotFound { path: PathBuf, suggestion: String },

    #[error("Failed to parse package.json: {path}\nDetails: {details}\n\n💡 Hint: Please verify that package.json contains valid JSON")]
    ManifestParseError { path: PathBuf, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Invalid project path: {path}\nReason: {reason}\n\n💡 Hint: Please specify a valid project directory")]
    InvalidProjectPath { path: PathBuf, reason: String },

    /// Validation error for builder patterns
    #[error("Validation error: {message}")]
    Validation { message: String },
}
