//! Peer endpoint abstraction.

use crate::error::{SyncError, SyncResult};
use roomcast_protocol::{NodeId, RoomOffer, SyncEvent};
use roomcast_store::RoomStore;
use std::sync::Arc;

/// The opaque callable endpoint of a sibling room-manager node.
///
/// This trait abstracts how a peer is reached (in-process for tests,
/// an RPC proxy in deployment). Implementations apply events to their
/// node's own store **idempotently**: delivery is best-effort and may
/// duplicate or arrive after a local state change, so a duplicate
/// create or a missing-target remove is a no-op, not an error.
pub trait PeerHandle: Send + Sync {
    /// Applies a replicated room creation from `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Unreachable`] if the peer cannot be
    /// reached, or a store error from applying the offer.
    fn apply_new_room(&self, offer: &RoomOffer, origin: &NodeId) -> SyncResult<()>;

    /// Applies a replicated room removal from `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Unreachable`] if the peer cannot be
    /// reached, or a store error from applying the removal.
    fn apply_removed_room(&self, name: &str, owner: &str, origin: &NodeId) -> SyncResult<()>;

    /// Returns the peer's full room catalog.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Unreachable`] if the peer cannot be
    /// reached, or a store error from reading the catalog.
    fn catalog(&self) -> SyncResult<Vec<RoomOffer>>;
}

/// A peer handle over a local [`RoomStore`].
///
/// This is the handle a node hands to sibling hubs; in an in-process
/// cluster it is also the receiving end of every relay.
#[derive(Debug, Clone)]
pub struct LocalPeer {
    store: Arc<RoomStore>,
}

impl LocalPeer {
    /// Creates a handle over the given store.
    #[must_use]
    pub fn new(store: Arc<RoomStore>) -> Self {
        Self { store }
    }
}

impl PeerHandle for LocalPeer {
    fn apply_new_room(&self, offer: &RoomOffer, origin: &NodeId) -> SyncResult<()> {
        let stored = self.store.apply_new_room(&offer.owner, &offer.document)?;
        if !stored {
            tracing::debug!(room = %offer.document.room, %origin, "duplicate room event ignored");
        }
        Ok(())
    }

    fn apply_removed_room(&self, name: &str, owner: &str, origin: &NodeId) -> SyncResult<()> {
        let removed = self.store.apply_removed_room(owner, name)?;
        if !removed {
            tracing::debug!(room = %name, %origin, "removal of absent room ignored");
        }
        Ok(())
    }

    fn catalog(&self) -> SyncResult<Vec<RoomOffer>> {
        Ok(self.store.catalog()?)
    }
}

/// A scriptable peer for testing.
///
/// Records every applied event and can be told to fail its next N
/// calls, which exercises the relay retry path.
#[derive(Debug, Default)]
pub struct MockPeer {
    applied: std::sync::Mutex<Vec<SyncEvent>>,
    catalog: std::sync::Mutex<Vec<RoomOffer>>,
    failures_remaining: std::sync::atomic::AtomicU32,
}

impl MockPeer {
    /// Creates a peer that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` calls fail as unreachable.
    pub fn fail_next(&self, count: u32) {
        self.failures_remaining
            .store(count, std::sync::atomic::Ordering::SeqCst);
    }

    /// Sets the catalog returned by [`PeerHandle::catalog`].
    pub fn set_catalog(&self, offers: Vec<RoomOffer>) {
        *self.catalog.lock().unwrap() = offers;
    }

    /// Returns every event applied so far.
    #[must_use]
    pub fn applied(&self) -> Vec<SyncEvent> {
        self.applied.lock().unwrap().clone()
    }

    /// Returns the number of applied events.
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.applied.lock().unwrap().len()
    }

    fn check_reachable(&self) -> SyncResult<()> {
        let remaining = self
            .failures_remaining
            .load(std::sync::atomic::Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining
                .store(remaining - 1, std::sync::atomic::Ordering::SeqCst);
            return Err(SyncError::peer_unreachable("scripted failure"));
        }
        Ok(())
    }
}

impl PeerHandle for MockPeer {
    fn apply_new_room(&self, offer: &RoomOffer, origin: &NodeId) -> SyncResult<()> {
        self.check_reachable()?;
        self.applied.lock().unwrap().push(SyncEvent::new_room(
            offer.owner.clone(),
            origin.clone(),
            offer.document.clone(),
        ));
        Ok(())
    }

    fn apply_removed_room(&self, name: &str, owner: &str, origin: &NodeId) -> SyncResult<()> {
        self.check_reachable()?;
        self.applied
            .lock()
            .unwrap()
            .push(SyncEvent::removed_room(name, owner, origin.clone()));
        Ok(())
    }

    fn catalog(&self) -> SyncResult<Vec<RoomOffer>> {
        self.check_reachable()?;
        Ok(self.catalog.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomcast_protocol::RoomDocument;
    use serde_json::json;

    fn offer(owner: &str, name: &str) -> RoomOffer {
        RoomOffer::new(owner, RoomDocument::new(name, json!("x")))
    }

    #[test]
    fn local_peer_applies_idempotently() {
        let store = Arc::new(RoomStore::in_memory());
        let peer = LocalPeer::new(Arc::clone(&store));
        let origin = NodeId::new("origin");

        peer.apply_new_room(&offer("alice", "cave1"), &origin).unwrap();
        peer.apply_new_room(&offer("alice", "cave1"), &origin).unwrap();
        assert_eq!(store.len().unwrap(), 1);

        peer.apply_removed_room("cave1", "alice", &origin).unwrap();
        peer.apply_removed_room("cave1", "alice", &origin).unwrap();
        assert_eq!(store.len().unwrap(), 0);
    }

    #[test]
    fn local_peer_serves_catalog() {
        let store = Arc::new(RoomStore::in_memory());
        store
            .publish("alice", &RoomDocument::new("cave1", json!("x")))
            .unwrap();

        let peer = LocalPeer::new(store);
        let catalog = peer.catalog().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].owner, "alice");
    }

    #[test]
    fn mock_peer_records_events() {
        let peer = MockPeer::new();
        let origin = NodeId::new("a");

        peer.apply_new_room(&offer("alice", "cave1"), &origin).unwrap();
        peer.apply_removed_room("cave1", "alice", &origin).unwrap();

        let applied = peer.applied();
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0].kind(), "new_room");
        assert_eq!(applied[1].kind(), "removed_room");
    }

    #[test]
    fn mock_peer_scripted_failures() {
        let peer = MockPeer::new();
        let origin = NodeId::new("a");
        peer.fail_next(2);

        assert!(peer.apply_new_room(&offer("a", "r"), &origin).is_err());
        assert!(peer.apply_new_room(&offer("a", "r"), &origin).is_err());
        assert!(peer.apply_new_room(&offer("a", "r"), &origin).is_ok());
        assert_eq!(peer.applied_count(), 1);
    }
}
