/// Data Transfer Objects for application layer
///
/// DTOs are used to transfer data between the application layer
/// and adapters, keeping the domain layer isolated.
mod walk_request;

pub use walk_request::{
    WalkRequest, WalkRequestBuilder, WalkRoot, DEFAULT_CONCURRENCY_LIMIT, DEFAULT_MAX_DEPTH,
};
