//! Error types for room storage.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The document does not match the room schema.
    #[error("invalid room format: {reason}")]
    InvalidFormat {
        /// Description of the schema violation.
        reason: String,
    },

    /// A room already occupies the content address.
    #[error("room already exists")]
    RoomExists,

    /// No room occupies the content address.
    #[error("no such room")]
    RoomNotFound,

    /// Another process holds the store directory lock.
    #[error("store directory locked: another process has exclusive access")]
    DirectoryLocked,

    /// A persisted record could not be decoded.
    #[error("corrupt room record at {address}: {reason}")]
    CorruptRecord {
        /// Content address of the broken record.
        address: String,
        /// Description of the decode failure.
        reason: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StoreError {
    /// Creates an invalid-format error.
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            reason: reason.into(),
        }
    }

    /// Creates a corrupt-record error.
    pub fn corrupt_record(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CorruptRecord {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if retrying the operation may succeed.
    ///
    /// Caller errors (conflict, not-found, validation) are never
    /// transient; only interrupted or timed-out I/O is.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Io(err) => matches!(
                err.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }
}

impl From<roomcast_protocol::DocumentError> for StoreError {
    fn from(err: roomcast_protocol::DocumentError) -> Self {
        StoreError::invalid_format(err.to_string())
    }
}
