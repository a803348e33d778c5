/// Outbound adapters - Infrastructure implementations of outbound ports
pub mod console;
pub mod filesystem;
pub mod manifest_router;
pub mod network;
pub mod package_json;
pub mod scanner;

pub use manifest_router::ManifestRouter;
