pub mod identity_allocator;
pub mod payload_serializer;
pub mod range_resolver;
pub mod resolution_cache;

pub use identity_allocator::IdentityAllocator;
pub use payload_serializer::PayloadSerializer;
pub use range_resolver::RangeResolver;
pub use resolution_cache::ResolutionCache;
