/// Application layer - Use cases and DTOs
///
/// This layer contains the graph walker, which orchestrates the domain
/// services and reaches infrastructure only through ports.
pub mod cancellation;
pub mod dto;
pub mod use_cases;

pub use cancellation::CancellationFlag;
