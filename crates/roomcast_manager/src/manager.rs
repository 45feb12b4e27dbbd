//! The room manager service.

use crate::error::ManagerResult;
use roomcast_auth::AuthService;
use roomcast_protocol::{NodeId, RoomDocument, SyncEvent};
use roomcast_store::RoomStore;
use roomcast_sync::EventSink;
use std::sync::Arc;
use tracing::{info, warn};

/// The caller-facing room service.
///
/// Every mutation authorizes the caller's token first, then delegates
/// to the store; a successful mutation emits a lifecycle event for
/// sibling nodes. Emission is fire-and-forget: relay failures never
/// reach the caller. Reads ([`fetch`](Self::fetch)) are public.
///
/// # Example
///
/// ```
/// use roomcast_auth::{hash_password, AuthConfig, AuthService};
/// use roomcast_manager::RoomManager;
/// use roomcast_protocol::NodeId;
/// use roomcast_store::RoomStore;
/// use roomcast_sync::NullSink;
/// use std::sync::Arc;
///
/// let auth = Arc::new(AuthService::new(AuthConfig::new(b"key".to_vec())));
/// let hash = hash_password(auth.salt(), "secret123");
/// auth.change_password("alice", None, &hash).unwrap();
/// let token = auth.issue_token("alice", &hash).unwrap();
///
/// let manager = RoomManager::new(
///     auth,
///     Arc::new(RoomStore::in_memory()),
///     Arc::new(NullSink),
///     NodeId::new("node-a"),
/// );
/// manager.publish(&token, r#"{"room": "cave1", "data": "D"}"#).unwrap();
/// assert_eq!(manager.fetch().unwrap().room, "cave1");
/// ```
pub struct RoomManager {
    auth: Arc<AuthService>,
    store: Arc<RoomStore>,
    events: Arc<dyn EventSink>,
    node_id: NodeId,
}

impl RoomManager {
    /// Creates a manager over its collaborators.
    pub fn new(
        auth: Arc<AuthService>,
        store: Arc<RoomStore>,
        events: Arc<dyn EventSink>,
        node_id: NodeId,
    ) -> Self {
        Self {
            auth,
            store,
            events,
            node_id,
        }
    }

    /// Returns this node's id; it becomes the origin of emitted events.
    #[must_use]
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// Returns the underlying store, for wiring a peer handle.
    #[must_use]
    pub fn store(&self) -> &Arc<RoomStore> {
        &self.store
    }

    /// Publishes a room document supplied as JSON text.
    ///
    /// # Errors
    ///
    /// - [`Auth`](crate::ManagerError::Auth) if the token is invalid
    /// - [`Validation`](crate::ManagerError::Validation) if the text is
    ///   not exactly a `{room, data}` document
    /// - [`Conflict`](crate::ManagerError::Conflict) if the caller
    ///   already published a room with that name
    /// - [`Store`](crate::ManagerError::Store) on storage failure
    pub fn publish(&self, token: &str, room_json: &str) -> ManagerResult<()> {
        let owner = self.resolve(token)?;
        let document = RoomDocument::from_json(room_json).map_err(|e| {
            warn!("invalid format for room");
            e
        })?;

        self.store.publish(&owner, &document)?;
        info!(room = %document.room, owner = %owner, "published room");

        self.events
            .emit(SyncEvent::new_room(owner, self.node_id.clone(), document));
        Ok(())
    }

    /// Removes one of the caller's rooms by name.
    ///
    /// # Errors
    ///
    /// - [`Auth`](crate::ManagerError::Auth) if the token is invalid
    /// - [`NotFound`](crate::ManagerError::NotFound) if the caller has
    ///   no room with that name
    /// - [`Store`](crate::ManagerError::Store) on storage failure
    pub fn remove(&self, token: &str, name: &str) -> ManagerResult<()> {
        let owner = self.resolve(token)?;

        self.store.remove(&owner, name)?;
        info!(room = %name, owner = %owner, "removed room");

        self.events
            .emit(SyncEvent::removed_room(name, owner, self.node_id.clone()));
        Ok(())
    }

    /// Returns one uniformly chosen published room document.
    ///
    /// Reads are public; no token is required.
    ///
    /// # Errors
    ///
    /// [`NotFound`](crate::ManagerError::NotFound) if no rooms are
    /// published.
    pub fn fetch(&self) -> ManagerResult<RoomDocument> {
        Ok(self.store.fetch_random()?)
    }

    fn resolve(&self, token: &str) -> ManagerResult<String> {
        Ok(self.auth.resolve_owner(token).map_err(|e| {
            warn!("invalid token");
            e
        })?)
    }
}

impl std::fmt::Debug for RoomManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomManager")
            .field("node_id", &self.node_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ManagerError;
    use roomcast_auth::{hash_password, AuthConfig};
    use roomcast_sync::RecordingSink;

    struct Fixture {
        manager: RoomManager,
        events: Arc<RecordingSink>,
        token: String,
    }

    fn fixture() -> Fixture {
        let auth = Arc::new(AuthService::new(AuthConfig::new(b"test-key".to_vec())));
        let hash = hash_password(auth.salt(), "secret123");
        auth.change_password("alice", None, &hash).unwrap();
        let token = auth.issue_token("alice", &hash).unwrap();

        let events = Arc::new(RecordingSink::new());
        let manager = RoomManager::new(
            auth,
            Arc::new(RoomStore::in_memory()),
            Arc::clone(&events) as Arc<dyn EventSink>,
            NodeId::new("node-a"),
        );

        Fixture {
            manager,
            events,
            token,
        }
    }

    #[test]
    fn publish_stores_and_emits() {
        let f = fixture();
        f.manager
            .publish(&f.token, r#"{"room": "cave1", "data": "D"}"#)
            .unwrap();

        assert!(f.manager.store().contains("alice", "cave1").unwrap());

        let events = f.events.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), "new_room");
        assert_eq!(events[0].owner(), "alice");
        assert_eq!(events[0].origin().as_str(), "node-a");
    }

    #[test]
    fn publish_with_bad_token_fails_and_emits_nothing() {
        let f = fixture();
        let result = f
            .manager
            .publish("bogus", r#"{"room": "cave1", "data": "D"}"#);

        assert!(matches!(result, Err(ManagerError::Auth(_))));
        assert!(f.events.is_empty());
        assert!(f.manager.store().is_empty().unwrap());
    }

    #[test]
    fn publish_malformed_document_fails_validation() {
        let f = fixture();

        for bad in [
            r#"{"room": "cave1"}"#,
            r#"{"data": "D"}"#,
            r#"{"room": "cave1", "data": "D", "x": 1}"#,
            r#"{"room": 9, "data": "D"}"#,
            "not json",
        ] {
            let result = f.manager.publish(&f.token, bad);
            assert!(
                matches!(result, Err(ManagerError::Validation(_))),
                "document: {bad}"
            );
        }

        // Nothing stored, nothing emitted.
        assert!(f.manager.store().is_empty().unwrap());
        assert!(f.events.is_empty());
    }

    #[test]
    fn duplicate_publish_is_conflict() {
        let f = fixture();
        let doc = r#"{"room": "cave1", "data": "D"}"#;

        f.manager.publish(&f.token, doc).unwrap();
        let result = f.manager.publish(&f.token, doc);

        assert!(matches!(result, Err(ManagerError::Conflict)));
        assert_eq!(f.events.len(), 1);
    }

    #[test]
    fn remove_then_republish() {
        let f = fixture();
        let doc = r#"{"room": "cave1", "data": "D"}"#;

        f.manager.publish(&f.token, doc).unwrap();
        f.manager.remove(&f.token, "cave1").unwrap();
        f.manager.publish(&f.token, doc).unwrap();

        let kinds: Vec<&str> = f.events.events().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, ["new_room", "removed_room", "new_room"]);
    }

    #[test]
    fn remove_nonexistent_is_not_found() {
        let f = fixture();
        let result = f.manager.remove(&f.token, "nonexistent");
        assert!(matches!(result, Err(ManagerError::NotFound)));
        assert!(f.events.is_empty());
    }

    #[test]
    fn remove_with_bad_token_fails() {
        let f = fixture();
        f.manager
            .publish(&f.token, r#"{"room": "cave1", "data": "D"}"#)
            .unwrap();

        let result = f.manager.remove("bogus", "cave1");
        assert!(matches!(result, Err(ManagerError::Auth(_))));
        assert!(f.manager.store().contains("alice", "cave1").unwrap());
    }

    #[test]
    fn fetch_requires_no_token() {
        let f = fixture();
        f.manager
            .publish(&f.token, r#"{"room": "cave1", "data": "D"}"#)
            .unwrap();

        let doc = f.manager.fetch().unwrap();
        assert_eq!(doc.room, "cave1");
    }

    #[test]
    fn fetch_on_empty_catalog_is_not_found() {
        let f = fixture();
        assert!(matches!(f.manager.fetch(), Err(ManagerError::NotFound)));
    }

    #[test]
    fn owners_are_namespaced() {
        let f = fixture();

        // Second user publishing the same room name through a manager
        // that shares the store.
        let auth = Arc::new(AuthService::new(AuthConfig::new(b"test-key".to_vec())));
        let hash = hash_password(auth.salt(), "pw");
        auth.change_password("bob", None, &hash).unwrap();
        let bob_token = auth.issue_token("bob", &hash).unwrap();

        let bob_manager = RoomManager::new(
            auth,
            Arc::clone(f.manager.store()),
            Arc::new(roomcast_sync::NullSink),
            NodeId::new("node-a"),
        );

        bob_manager
            .publish(&bob_token, r#"{"room": "cave1", "data": "B"}"#)
            .unwrap();
        f.manager
            .publish(&f.token, r#"{"room": "cave1", "data": "A"}"#)
            .unwrap();

        assert_eq!(f.manager.store().len().unwrap(), 2);
    }
}
