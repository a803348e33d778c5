/// Network adapters for npm registry access
mod npm_registry_client;
mod packument;

pub use npm_registry_client::{NpmRegistryClient, DEFAULT_REGISTRY_URL, DEFAULT_TIMEOUT_SECS};
pub use packument::Packument;
