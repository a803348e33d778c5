/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the graph walker uses
/// to interact with external systems (registry, file system, console, etc.).
pub mod manifest_source;
pub mod output_presenter;
pub mod package_scanner;
pub mod progress_reporter;

pub use manifest_source::ManifestSource;
pub use output_presenter::OutputPresenter;
pub use package_scanner::PackageScanner;
pub use progress_reporter::ProgressReporter;
