use crate::dependency_graph::domain::{DependencyNode, NodeId, NodeResolution, PackageKey};
use crate::dependency_graph::services::IdentityAllocator;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// One cache entry: the id is fixed when the entry is inserted, the node once
/// the first factory completes.
#[derive(Debug)]
struct CacheSlot {
    id: NodeId,
    node: OnceCell<Arc<DependencyNode>>,
}

/// Resolution cache keyed by (name, version).
///
/// Guarantees at most one factory run per key even when many traversal
/// paths ask for the same package at once: later callers await the first
/// caller's result and all of them receive the same shared node. Id
/// allocation happens while the map shard is locked for the insertion, so a
/// key never receives two ids.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    allocator: IdentityAllocator,
    slots: DashMap<PackageKey, Arc<CacheSlot>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node for `key`, running `factory` only if no other caller has.
    ///
    /// A factory never fails: a failed resolution is itself a terminal
    /// `NodeResolution` and is cached like any other.
    pub async fn get_or_create<F, Fut>(&self, key: PackageKey, factory: F) -> Arc<DependencyNode>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = NodeResolution>,
    {
        let slot = Arc::clone(
            self.slots
                .entry(key.clone())
                .or_insert_with(|| {
                    Arc::new(CacheSlot {
                        id: self.allocator.next_id(),
                        node: OnceCell::new(),
                    })
                })
                .value(),
        );

        let id = slot.id;
        let node = slot
            .node
            .get_or_init(|| async move {
                let resolution = factory().await;
                Arc::new(DependencyNode::new(id, key, resolution))
            })
            .await;

        Arc::clone(node)
    }

    /// Every finalized node, ordered by id
    pub fn nodes(&self) -> Vec<Arc<DependencyNode>> {
        let mut nodes: Vec<Arc<DependencyNode>> = self
            .slots
            .iter()
            .filter_map(|slot| slot.node.get().cloned())
            .collect();
        nodes.sort_by_key(|node| node.id());
        nodes
    }
}
