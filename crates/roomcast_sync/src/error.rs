//! Error types for sync operations.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A peer could not be reached.
    ///
    /// Never surfaced to the caller whose publish or remove triggered
    /// the relay; retried independently and otherwise only observable
    /// via logs and the registry's failure counters.
    #[error("peer unreachable: {message}")]
    Unreachable {
        /// Description of the delivery failure.
        message: String,
    },

    /// The local store rejected an applied event or catalog read.
    #[error("store error: {0}")]
    Store(#[from] roomcast_store::StoreError),
}

impl SyncError {
    /// Creates an unreachable-peer error.
    pub fn peer_unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }

    /// Returns true if redelivery may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Unreachable { .. } => true,
            SyncError::Store(e) => e.is_transient(),
        }
    }
}
