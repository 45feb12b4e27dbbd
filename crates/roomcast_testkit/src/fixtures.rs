//! Test fixtures and node helpers.

use roomcast_auth::{hash_password, AuthConfig, AuthService};
use roomcast_manager::RoomManager;
use roomcast_protocol::{NodeId, RoomDocument};
use roomcast_store::RoomStore;
use roomcast_sync::{EventSink, LocalPeer, RetryConfig, SyncHub};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Signing key shared by every test node, so tokens work cluster-wide.
pub const TEST_SIGNING_KEY: &[u8] = b"roomcast-test-signing-key";

/// Builds a sample room document.
#[must_use]
pub fn sample_document(name: &str) -> RoomDocument {
    RoomDocument::new(name, serde_json::json!({"tiles": [[0, 1], [1, 0]]}))
}

/// Builds sample room JSON text, as a wire caller would send it.
#[must_use]
pub fn sample_document_json(name: &str) -> String {
    format!(r#"{{"room": "{name}", "data": {{"tiles": []}}}}"#)
}

/// One fully wired in-memory node: auth, store, hub, and manager.
pub struct TestNode {
    /// The node's id.
    pub id: NodeId,
    /// The node's authentication service.
    pub auth: Arc<AuthService>,
    /// The node's room store.
    pub store: Arc<RoomStore>,
    /// The node's sync hub.
    pub hub: Arc<SyncHub>,
    /// The node's room manager.
    pub manager: RoomManager,
}

impl TestNode {
    /// Creates a node with fast, jitter-free relay retries.
    #[must_use]
    pub fn new(id: &str) -> Self {
        let retry = RetryConfig::new(2)
            .with_initial_delay(Duration::from_millis(1))
            .without_jitter();
        Self::with_retry(id, retry)
    }

    /// Creates a node with an explicit relay retry configuration.
    #[must_use]
    pub fn with_retry(id: &str, retry: RetryConfig) -> Self {
        let id = NodeId::new(id);
        let auth = Arc::new(AuthService::new(AuthConfig::new(TEST_SIGNING_KEY.to_vec())));
        let store = Arc::new(RoomStore::in_memory());
        let hub = Arc::new(SyncHub::new(retry));

        // The hub knows its own node, so announce exchanges reach the
        // local store too; fan-out skips it via the origin check.
        hub.hello(Arc::new(LocalPeer::new(Arc::clone(&store))), id.clone());

        let manager = RoomManager::new(
            Arc::clone(&auth),
            Arc::clone(&store),
            Arc::clone(&hub) as Arc<dyn EventSink>,
            id.clone(),
        );

        Self {
            id,
            auth,
            store,
            hub,
            manager,
        }
    }

    /// Registers a password and returns a token, the way a client
    /// would: first-time set, then login with the salted hash.
    #[must_use]
    pub fn login(&self, user: &str, password: &str) -> String {
        let hash = hash_password(self.auth.salt(), password);
        self.auth
            .change_password(user, None, &hash)
            .expect("first-time password set");
        self.auth.issue_token(user, &hash).expect("login")
    }

    /// Returns a peer handle over this node's store.
    #[must_use]
    pub fn peer_handle(&self) -> Arc<LocalPeer> {
        Arc::new(LocalPeer::new(Arc::clone(&self.store)))
    }
}

impl std::fmt::Debug for TestNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestNode").field("id", &self.id).finish()
    }
}

/// A file-backed store in a temporary directory, with cleanup on drop.
pub struct TempStore {
    /// The store.
    pub store: Arc<RoomStore>,
    dir: TempDir,
}

impl TempStore {
    /// Creates a store in a fresh temporary directory.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp directory");
        let store = Arc::new(RoomStore::open(dir.path()).expect("open file store"));
        Self { store, dir }
    }

    /// Returns the store directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Drops the store and reopens the same directory, simulating a
    /// process restart.
    ///
    /// # Panics
    ///
    /// Panics if other references to the store are still alive (the
    /// directory lock would still be held).
    #[must_use]
    pub fn reopen(self) -> Self {
        let Self { store, dir } = self;
        drop(store);
        let store = Arc::new(RoomStore::open(dir.path()).expect("reopen file store"));
        Self { store, dir }
    }
}

impl Default for TempStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TempStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TempStore")
            .field("path", &self.dir.path())
            .finish()
    }
}
