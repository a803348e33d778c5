/// Ports module defining interfaces for hexagonal architecture
///
/// The walker drives every external system (registry, filesystem, scanner,
/// console) through the outbound ports declared here.
pub mod outbound;
