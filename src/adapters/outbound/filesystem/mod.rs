/// Filesystem adapters for file I/O operations
mod file_writer;
mod package_json_reader;

pub use file_writer::{FileSystemWriter, StdoutPresenter};
pub use package_json_reader::PackageJsonReader;
