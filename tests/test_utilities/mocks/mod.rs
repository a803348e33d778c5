/// Mock implementations for testing
mod mock_manifest_source;
mod mock_package_scanner;
mod mock_progress_reporter;

pub use mock_manifest_source::MockManifestSource;
pub use mock_package_scanner::MockPackageScanner;
pub use mock_progress_reporter::MockProgressReporter;
