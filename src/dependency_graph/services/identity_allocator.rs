use crate::dependency_graph::domain::NodeId;
use std::sync::atomic::{AtomicU64, Ordering};

const FIRST_ID: u64 = 1;

/// Issues strictly increasing node ids, starting at 1.
///
/// One allocator is owned by each walk, so independent walks number their
/// nodes identically.
#[derive(Debug)]
pub struct IdentityAllocator {
    next: AtomicU64,
}

impl IdentityAllocator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(FIRST_ID),
        }
    }

    pub fn next_id(&self) -> NodeId {
        NodeId::new(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdentityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
