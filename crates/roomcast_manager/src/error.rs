//! Caller-facing error taxonomy.

use roomcast_auth::AuthError;
use roomcast_protocol::DocumentError;
use roomcast_store::StoreError;
use thiserror::Error;

/// Result type for manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Errors returned to room-manager callers.
///
/// Auth, validation, conflict, and not-found are caller errors and are
/// returned synchronously with no retry; `Store` carries storage
/// failures that survived the store's own transient retries.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// The caller's token was rejected.
    #[error("unauthorized")]
    Auth(#[from] AuthError),

    /// The supplied document does not match the room schema.
    #[error("invalid room format: {0}")]
    Validation(String),

    /// A room with the same owner and name already exists.
    #[error("room already exists")]
    Conflict,

    /// No room matches the owner and name.
    #[error("no such room")]
    NotFound,

    /// Storage failed after exhausting retries.
    #[error("storage error: {0}")]
    Store(StoreError),
}

impl From<DocumentError> for ManagerError {
    fn from(err: DocumentError) -> Self {
        ManagerError::Validation(err.to_string())
    }
}

impl From<StoreError> for ManagerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RoomExists => ManagerError::Conflict,
            StoreError::RoomNotFound => ManagerError::NotFound,
            StoreError::InvalidFormat { reason } => ManagerError::Validation(reason),
            other => ManagerError::Store(other),
        }
    }
}
