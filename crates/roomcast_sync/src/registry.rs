//! Registry of sibling room-manager nodes.

use crate::peer::PeerHandle;
use parking_lot::RwLock;
use roomcast_protocol::NodeId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

struct PeerEntry {
    handle: Arc<dyn PeerHandle>,
    consecutive_failures: u64,
}

/// The set of known sibling nodes.
///
/// Upserted by `hello`; re-registering an id replaces its handle and
/// resets its failure counter. There is no automatic eviction - the
/// consecutive-failure counter is exposed so operators can decide.
#[derive(Default)]
pub struct PeerRegistry {
    peers: RwLock<HashMap<NodeId, PeerEntry>>,
}

impl PeerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or re-registers a node.
    pub fn register(&self, id: NodeId, handle: Arc<dyn PeerHandle>) {
        info!(node = %id, "registered peer node");
        self.peers.write().insert(
            id,
            PeerEntry {
                handle,
                consecutive_failures: 0,
            },
        );
    }

    /// Returns true if the node is registered.
    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.peers.read().contains_key(id)
    }

    /// Returns the number of registered nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    /// Returns true if no nodes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }

    /// Returns every registered node except the given one.
    ///
    /// Handles are cloned out so callers never hold the registry lock
    /// across peer calls.
    #[must_use]
    pub fn peers_except(&self, excluded: &NodeId) -> Vec<(NodeId, Arc<dyn PeerHandle>)> {
        self.peers
            .read()
            .iter()
            .filter(|(id, _)| *id != excluded)
            .map(|(id, entry)| (id.clone(), Arc::clone(&entry.handle)))
            .collect()
    }

    /// Records a failed delivery to a node; returns the new
    /// consecutive-failure count.
    pub fn record_failure(&self, id: &NodeId) -> u64 {
        let mut peers = self.peers.write();
        match peers.get_mut(id) {
            Some(entry) => {
                entry.consecutive_failures += 1;
                entry.consecutive_failures
            }
            None => 0,
        }
    }

    /// Records a successful delivery, resetting the failure counter.
    pub fn record_success(&self, id: &NodeId) {
        if let Some(entry) = self.peers.write().get_mut(id) {
            entry.consecutive_failures = 0;
        }
    }

    /// Returns a node's consecutive-failure count, if registered.
    #[must_use]
    pub fn failure_count(&self, id: &NodeId) -> Option<u64> {
        self.peers.read().get(id).map(|e| e.consecutive_failures)
    }
}

impl std::fmt::Debug for PeerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerRegistry")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::MockPeer;

    #[test]
    fn register_is_idempotent() {
        let registry = PeerRegistry::new();
        let id = NodeId::new("a");

        registry.register(id.clone(), Arc::new(MockPeer::new()));
        registry.register(id.clone(), Arc::new(MockPeer::new()));

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&id));
    }

    #[test]
    fn reregistration_resets_failures() {
        let registry = PeerRegistry::new();
        let id = NodeId::new("a");
        registry.register(id.clone(), Arc::new(MockPeer::new()));

        registry.record_failure(&id);
        registry.record_failure(&id);
        assert_eq!(registry.failure_count(&id), Some(2));

        registry.register(id.clone(), Arc::new(MockPeer::new()));
        assert_eq!(registry.failure_count(&id), Some(0));
    }

    #[test]
    fn peers_except_excludes_origin() {
        let registry = PeerRegistry::new();
        for name in ["a", "b", "c"] {
            registry.register(NodeId::new(name), Arc::new(MockPeer::new()));
        }

        let others = registry.peers_except(&NodeId::new("b"));
        let mut ids: Vec<String> = others.iter().map(|(id, _)| id.to_string()).collect();
        ids.sort();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn peers_except_unknown_id_returns_all() {
        let registry = PeerRegistry::new();
        registry.register(NodeId::new("a"), Arc::new(MockPeer::new()));

        assert_eq!(registry.peers_except(&NodeId::new("zz")).len(), 1);
    }

    #[test]
    fn failure_accounting() {
        let registry = PeerRegistry::new();
        let id = NodeId::new("a");
        registry.register(id.clone(), Arc::new(MockPeer::new()));

        assert_eq!(registry.record_failure(&id), 1);
        assert_eq!(registry.record_failure(&id), 2);

        registry.record_success(&id);
        assert_eq!(registry.failure_count(&id), Some(0));

        // Unknown nodes are ignored.
        assert_eq!(registry.record_failure(&NodeId::new("zz")), 0);
        assert_eq!(registry.failure_count(&NodeId::new("zz")), None);
    }
}
