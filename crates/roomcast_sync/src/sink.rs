//! Event sink seam between the room manager and the hub.

use parking_lot::Mutex;
use roomcast_protocol::SyncEvent;

/// Receives room lifecycle events from a room manager.
///
/// Emission must never block or fail the operation that produced the
/// event; sinks queue or drop, they do not propagate errors.
pub trait EventSink: Send + Sync {
    /// Accepts an event for eventual delivery.
    fn emit(&self, event: SyncEvent);
}

/// A sink that discards every event.
///
/// For single-node deployments with no siblings to notify.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: SyncEvent) {}
}

/// A sink that records every event, for tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SyncEvent>>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every event emitted so far.
    #[must_use]
    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().clone()
    }

    /// Returns the number of emitted events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns true if nothing was emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: SyncEvent) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomcast_protocol::{NodeId, RoomDocument};
    use serde_json::json;

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.emit(SyncEvent::new_room(
            "alice",
            NodeId::new("a"),
            RoomDocument::new("r1", json!("x")),
        ));
        sink.emit(SyncEvent::removed_room("r1", "alice", NodeId::new("a")));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind(), "new_room");
        assert_eq!(events[1].kind(), "removed_room");
    }

    #[test]
    fn null_sink_discards() {
        let sink = NullSink;
        sink.emit(SyncEvent::removed_room("r1", "alice", NodeId::new("a")));
    }
}
