/// Dependency graph core: domain model and pure services.
///
/// Nothing in this module performs I/O. The walker in the application layer
/// feeds it data obtained through the outbound ports.
pub mod domain;
pub mod services;
