/// Result used by adapters, configuration and the CLI.
///
/// Seams whose failures callers match on (`FetchError`, `WalkError`) keep
/// their own error types; everything else propagates `anyhow::Error`.
pub type Result<T> = std::result::Result<T, anyhow::Error>;
