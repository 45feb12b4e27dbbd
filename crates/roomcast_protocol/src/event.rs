//! Sync events and node identity.

use crate::document::RoomDocument;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a room-manager node.
///
/// Node ids are opaque strings chosen by the deployment; when a node has
/// no configured id, [`NodeId::generate`] produces a random one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a node id from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a random node id.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One catalog entry exchanged during announce reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomOffer {
    /// Username the room belongs to.
    pub owner: String,
    /// The room document.
    pub document: RoomDocument,
}

impl RoomOffer {
    /// Creates a new offer.
    pub fn new(owner: impl Into<String>, document: RoomDocument) -> Self {
        Self {
            owner: owner.into(),
            document,
        }
    }
}

/// A room lifecycle event relayed between nodes.
///
/// The logical identity of an event is (kind, room name, origin node).
/// Creation events also carry the owner and the full document: a
/// receiving node cannot compute the content address or materialize the
/// room without them. Delivery is best-effort; events may be duplicated
/// or arrive after a local state change, so application must be
/// idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SyncEvent {
    /// A room was published on the origin node.
    NewRoom {
        /// Room name.
        name: String,
        /// Username the room belongs to.
        owner: String,
        /// Node the event originated on.
        origin: NodeId,
        /// The published document.
        document: RoomDocument,
    },
    /// A room was removed on the origin node.
    RemovedRoom {
        /// Room name.
        name: String,
        /// Username the room belonged to.
        owner: String,
        /// Node the event originated on.
        origin: NodeId,
    },
}

impl SyncEvent {
    /// Creates a `NewRoom` event from a stored room.
    pub fn new_room(owner: impl Into<String>, origin: NodeId, document: RoomDocument) -> Self {
        Self::NewRoom {
            name: document.room.clone(),
            owner: owner.into(),
            origin,
            document,
        }
    }

    /// Creates a `RemovedRoom` event.
    pub fn removed_room(name: impl Into<String>, owner: impl Into<String>, origin: NodeId) -> Self {
        Self::RemovedRoom {
            name: name.into(),
            owner: owner.into(),
            origin,
        }
    }

    /// Returns the node the event originated on.
    #[must_use]
    pub fn origin(&self) -> &NodeId {
        match self {
            Self::NewRoom { origin, .. } | Self::RemovedRoom { origin, .. } => origin,
        }
    }

    /// Returns the room name the event refers to.
    #[must_use]
    pub fn room_name(&self) -> &str {
        match self {
            Self::NewRoom { name, .. } | Self::RemovedRoom { name, .. } => name,
        }
    }

    /// Returns the owner of the room the event refers to.
    #[must_use]
    pub fn owner(&self) -> &str {
        match self {
            Self::NewRoom { owner, .. } | Self::RemovedRoom { owner, .. } => owner,
        }
    }

    /// Returns a short label for the event kind, for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NewRoom { .. } => "new_room",
            Self::RemovedRoom { .. } => "removed_room",
        }
    }
}
