/// Adapters layer
///
/// Concrete implementations of the outbound ports: the npm registry, local
/// package.json files, the JavaScript scanner and console/file output.
pub mod outbound;
