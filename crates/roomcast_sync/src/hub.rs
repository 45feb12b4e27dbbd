//! The sync hub: registry plus background fan-out.

use crate::config::RetryConfig;
use crate::error::SyncResult;
use crate::peer::PeerHandle;
use crate::registry::PeerRegistry;
use crate::sink::EventSink;
use parking_lot::Mutex;
use roomcast_protocol::{NodeId, RoomOffer, SyncEvent};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

enum WorkerMessage {
    Relay(SyncEvent),
    Flush(Sender<()>),
    Shutdown,
}

/// Relays room lifecycle events between registered sibling nodes.
///
/// The hub owns a peer registry and a background worker thread. Events
/// enqueue on an unbounded channel, so producers never wait on peer
/// I/O; the worker delivers to every registered peer except the origin
/// with bounded retry and backoff. A peer that stays unreachable is
/// logged and counted against, never fatal to the producer.
///
/// # Example
///
/// ```
/// use roomcast_sync::{LocalPeer, RetryConfig, SyncHub};
/// use roomcast_store::RoomStore;
/// use roomcast_protocol::NodeId;
/// use std::sync::Arc;
///
/// let hub = SyncHub::new(RetryConfig::default());
/// let sibling = Arc::new(RoomStore::in_memory());
/// hub.hello(Arc::new(LocalPeer::new(sibling)), NodeId::new("node-b"));
/// assert_eq!(hub.registry().len(), 1);
/// ```
pub struct SyncHub {
    registry: Arc<PeerRegistry>,
    tx: Sender<WorkerMessage>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SyncHub {
    /// Creates a hub and starts its relay worker.
    #[must_use]
    pub fn new(retry: RetryConfig) -> Self {
        let registry = Arc::new(PeerRegistry::new());
        let (tx, rx) = mpsc::channel();

        let worker_registry = Arc::clone(&registry);
        let worker = std::thread::spawn(move || {
            while let Ok(message) = rx.recv() {
                match message {
                    WorkerMessage::Relay(event) => relay(&worker_registry, &retry, &event),
                    WorkerMessage::Flush(done) => {
                        let _ = done.send(());
                    }
                    WorkerMessage::Shutdown => break,
                }
            }
        });

        Self {
            registry,
            tx,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Creates a hub with the default retry configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(RetryConfig::default())
    }

    /// Returns the peer registry.
    #[must_use]
    pub fn registry(&self) -> &PeerRegistry {
        &self.registry
    }

    /// Registers a sibling node; idempotent upsert.
    pub fn hello(&self, node_ref: Arc<dyn PeerHandle>, node_id: NodeId) {
        self.registry.register(node_id, node_ref);
    }

    /// Registers a sibling node and runs a full-catalog exchange.
    ///
    /// The announcing node's rooms are offered to every other
    /// registered peer, and each of their catalogs is offered back to
    /// the announcer. Offers apply idempotently on both sides, so rooms
    /// that already exist anywhere are left alone - this is how a node
    /// recovers events it missed while down. Individual peer failures
    /// are logged and counted, not propagated.
    ///
    /// # Errors
    ///
    /// Returns an error only if the announcer's own catalog cannot be
    /// read.
    pub fn announce(&self, node_ref: Arc<dyn PeerHandle>, node_id: NodeId) -> SyncResult<()> {
        self.registry.register(node_id.clone(), Arc::clone(&node_ref));

        let announced = node_ref.catalog()?;
        info!(node = %node_id, rooms = announced.len(), "catalog exchange started");

        for (peer_id, peer) in self.registry.peers_except(&node_id) {
            // Offer the announcer's rooms to the peer.
            let mut failed = false;
            for offer in &announced {
                if let Err(e) = peer.apply_new_room(offer, &node_id) {
                    warn!(node = %peer_id, error = %e, "catalog offer failed");
                    failed = true;
                    break;
                }
            }

            // Pull the peer's rooms back to the announcer.
            match peer.catalog() {
                Ok(offers) => {
                    for offer in &offers {
                        if let Err(e) = node_ref.apply_new_room(offer, &peer_id) {
                            warn!(node = %node_id, error = %e, "catalog pull failed");
                            break;
                        }
                    }
                }
                Err(e) => {
                    warn!(node = %peer_id, error = %e, "catalog request failed");
                    failed = true;
                }
            }

            if failed {
                self.registry.record_failure(&peer_id);
            } else {
                self.registry.record_success(&peer_id);
            }
        }

        Ok(())
    }

    /// Enqueues an event for relay to all peers except its origin.
    ///
    /// Returns immediately; delivery happens on the worker thread.
    pub fn broadcast(&self, event: SyncEvent) {
        debug!(kind = event.kind(), room = event.room_name(), "queued event");
        // Send only fails if the worker is gone, i.e. after shutdown.
        let _ = self.tx.send(WorkerMessage::Relay(event));
    }

    /// Blocks until every previously queued event has been processed,
    /// including its retries. Test and shutdown aid.
    pub fn flush(&self) {
        let (done_tx, done_rx) = mpsc::channel();
        if self.tx.send(WorkerMessage::Flush(done_tx)).is_ok() {
            let _ = done_rx.recv();
        }
    }

    /// Stops the worker after draining queued events.
    pub fn shutdown(&self) {
        let _ = self.tx.send(WorkerMessage::Shutdown);
        if let Some(worker) = self.worker.lock().take() {
            let _ = worker.join();
        }
    }
}

impl Drop for SyncHub {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for SyncHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncHub")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl EventSink for SyncHub {
    fn emit(&self, event: SyncEvent) {
        self.broadcast(event);
    }
}

/// Delivers one event to every registered peer except its origin.
fn relay(registry: &PeerRegistry, retry: &RetryConfig, event: &SyncEvent) {
    for (peer_id, peer) in registry.peers_except(event.origin()) {
        deliver_with_retry(registry, retry, &peer_id, peer.as_ref(), event);
    }
}

fn deliver_with_retry(
    registry: &PeerRegistry,
    retry: &RetryConfig,
    peer_id: &NodeId,
    peer: &dyn PeerHandle,
    event: &SyncEvent,
) {
    let mut last_error = None;

    for attempt in 0..retry.max_attempts {
        std::thread::sleep(retry.delay_for_attempt(attempt));

        match deliver(peer, event) {
            Ok(()) => {
                debug!(node = %peer_id, kind = event.kind(), "event delivered");
                registry.record_success(peer_id);
                return;
            }
            Err(e) if e.is_retryable() => last_error = Some(e),
            Err(e) => {
                // Peer rejected the event outright; retrying cannot help.
                last_error = Some(e);
                break;
            }
        }
    }

    let failures = registry.record_failure(peer_id);
    warn!(
        node = %peer_id,
        kind = event.kind(),
        consecutive_failures = failures,
        error = %last_error.map(|e| e.to_string()).unwrap_or_default(),
        "event delivery failed, peer skipped"
    );
}

fn deliver(peer: &dyn PeerHandle, event: &SyncEvent) -> SyncResult<()> {
    match event {
        SyncEvent::NewRoom {
            owner,
            origin,
            document,
            ..
        } => {
            let offer = RoomOffer::new(owner.clone(), document.clone());
            peer.apply_new_room(&offer, origin)
        }
        SyncEvent::RemovedRoom {
            name,
            owner,
            origin,
        } => peer.apply_removed_room(name, owner, origin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::{LocalPeer, MockPeer};
    use roomcast_protocol::RoomDocument;
    use roomcast_store::RoomStore;
    use serde_json::json;
    use std::time::Duration;

    fn fast_retry(attempts: u32) -> RetryConfig {
        RetryConfig::new(attempts)
            .with_initial_delay(Duration::from_millis(1))
            .without_jitter()
    }

    fn new_room_event(origin: &str, name: &str) -> SyncEvent {
        SyncEvent::new_room(
            "alice",
            NodeId::new(origin),
            RoomDocument::new(name, json!("x")),
        )
    }

    #[test]
    fn broadcast_reaches_all_peers_except_origin() {
        let hub = SyncHub::new(fast_retry(1));
        let origin_peer = Arc::new(MockPeer::new());
        let other_a = Arc::new(MockPeer::new());
        let other_b = Arc::new(MockPeer::new());

        hub.hello(origin_peer.clone(), NodeId::new("origin"));
        hub.hello(other_a.clone(), NodeId::new("a"));
        hub.hello(other_b.clone(), NodeId::new("b"));

        hub.broadcast(new_room_event("origin", "cave1"));
        hub.flush();

        assert_eq!(origin_peer.applied_count(), 0);
        assert_eq!(other_a.applied_count(), 1);
        assert_eq!(other_b.applied_count(), 1);
    }

    #[test]
    fn broadcast_does_not_block_on_unreachable_peer() {
        let hub = SyncHub::new(fast_retry(3));
        let dead = Arc::new(MockPeer::new());
        dead.fail_next(u32::MAX);
        hub.hello(dead, NodeId::new("dead"));

        // Returns immediately even though delivery will fail.
        hub.broadcast(new_room_event("origin", "cave1"));
        hub.flush();

        assert_eq!(hub.registry().failure_count(&NodeId::new("dead")), Some(1));
    }

    #[test]
    fn delivery_retries_then_succeeds() {
        let hub = SyncHub::new(fast_retry(3));
        let flaky = Arc::new(MockPeer::new());
        flaky.fail_next(2);
        hub.hello(flaky.clone(), NodeId::new("flaky"));

        hub.broadcast(new_room_event("origin", "cave1"));
        hub.flush();

        assert_eq!(flaky.applied_count(), 1);
        assert_eq!(hub.registry().failure_count(&NodeId::new("flaky")), Some(0));
    }

    #[test]
    fn retries_are_bounded() {
        let hub = SyncHub::new(fast_retry(2));
        let flaky = Arc::new(MockPeer::new());
        flaky.fail_next(5);
        hub.hello(flaky.clone(), NodeId::new("flaky"));

        hub.broadcast(new_room_event("origin", "cave1"));
        hub.flush();

        assert_eq!(flaky.applied_count(), 0);
        assert_eq!(hub.registry().failure_count(&NodeId::new("flaky")), Some(1));
    }

    #[test]
    fn events_relay_in_order() {
        let hub = SyncHub::new(fast_retry(1));
        let peer = Arc::new(MockPeer::new());
        hub.hello(peer.clone(), NodeId::new("a"));

        hub.broadcast(new_room_event("origin", "cave1"));
        hub.broadcast(SyncEvent::removed_room("cave1", "alice", NodeId::new("origin")));
        hub.flush();

        let applied = peer.applied();
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0].kind(), "new_room");
        assert_eq!(applied[1].kind(), "removed_room");
    }

    #[test]
    fn announce_exchanges_catalogs_both_ways() {
        let hub = SyncHub::new(fast_retry(1));

        let store_a = Arc::new(RoomStore::in_memory());
        store_a
            .publish("alice", &RoomDocument::new("from_a", json!(1)))
            .unwrap();
        let store_b = Arc::new(RoomStore::in_memory());
        store_b
            .publish("bob", &RoomDocument::new("from_b", json!(2)))
            .unwrap();

        hub.hello(
            Arc::new(LocalPeer::new(Arc::clone(&store_b))),
            NodeId::new("b"),
        );
        hub.announce(
            Arc::new(LocalPeer::new(Arc::clone(&store_a))),
            NodeId::new("a"),
        )
        .unwrap();

        // Both stores converge to the union.
        assert_eq!(store_a.len().unwrap(), 2);
        assert_eq!(store_b.len().unwrap(), 2);
        assert!(store_a.contains("bob", "from_b").unwrap());
        assert!(store_b.contains("alice", "from_a").unwrap());
    }

    #[test]
    fn announce_is_idempotent() {
        let hub = SyncHub::new(fast_retry(1));

        let store_a = Arc::new(RoomStore::in_memory());
        store_a
            .publish("alice", &RoomDocument::new("r", json!(1)))
            .unwrap();
        let store_b = Arc::new(RoomStore::in_memory());

        let peer_a = Arc::new(LocalPeer::new(Arc::clone(&store_a)));
        hub.hello(
            Arc::new(LocalPeer::new(Arc::clone(&store_b))),
            NodeId::new("b"),
        );

        hub.announce(peer_a.clone(), NodeId::new("a")).unwrap();
        hub.announce(peer_a, NodeId::new("a")).unwrap();

        assert_eq!(store_a.len().unwrap(), 1);
        assert_eq!(store_b.len().unwrap(), 1);
    }

    #[test]
    fn announce_survives_unreachable_peer() {
        let hub = SyncHub::new(fast_retry(1));

        let dead = Arc::new(MockPeer::new());
        dead.fail_next(u32::MAX);
        hub.hello(dead, NodeId::new("dead"));

        let store = Arc::new(RoomStore::in_memory());
        store
            .publish("alice", &RoomDocument::new("r", json!(1)))
            .unwrap();

        hub.announce(Arc::new(LocalPeer::new(store)), NodeId::new("a"))
            .unwrap();
        assert_eq!(hub.registry().failure_count(&NodeId::new("dead")), Some(1));
    }

    #[test]
    fn shutdown_drains_queue() {
        let hub = SyncHub::new(fast_retry(1));
        let peer = Arc::new(MockPeer::new());
        hub.hello(peer.clone(), NodeId::new("a"));

        for i in 0..16 {
            hub.broadcast(new_room_event("origin", &format!("room{i}")));
        }
        hub.shutdown();

        assert_eq!(peer.applied_count(), 16);
    }

    #[test]
    fn broadcast_after_shutdown_is_ignored() {
        let hub = SyncHub::new(fast_retry(1));
        hub.shutdown();
        hub.broadcast(new_room_event("origin", "late"));
        hub.flush();
    }
}
