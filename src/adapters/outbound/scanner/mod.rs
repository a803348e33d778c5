/// Static code scanner adapters
mod file_tree_scanner;
mod javascript_analyzer;
mod package_scanner;
mod tarball_fetcher;

pub use file_tree_scanner::FileTreeScanner;
pub use javascript_analyzer::{JavaScriptAnalyzer, SourceAnalysis};
pub use package_scanner::JavaScriptPackageScanner;
pub use tarball_fetcher::TarballFetcher;
