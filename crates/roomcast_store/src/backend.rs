//! Room backend trait definition.

use crate::address::ContentAddress;
use crate::error::StoreResult;
use roomcast_protocol::RoomDocument;
use serde::{Deserialize, Serialize};

/// A persisted room record.
///
/// The owner rides alongside the document because catalog
/// reconciliation and cross-node application both need to re-derive the
/// (owner, name) content address after a restart. The `document` field
/// is exactly what the publisher supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRoom {
    /// Username the room belongs to.
    pub owner: String,
    /// The room document as supplied to publish.
    pub document: RoomDocument,
}

impl StoredRoom {
    /// Creates a record.
    pub fn new(owner: impl Into<String>, document: RoomDocument) -> Self {
        Self {
            owner: owner.into(),
            document,
        }
    }

    /// Returns the content address this record is stored under.
    #[must_use]
    pub fn address(&self) -> ContentAddress {
        ContentAddress::for_room(&self.owner, &self.document.room)
    }
}

/// A keyed record store for room documents.
///
/// Backends map content addresses to [`StoredRoom`] records. They do
/// not compute addresses, validate documents, or interpret payloads -
/// [`super::RoomStore`] owns all of that.
///
/// # Invariants
///
/// - `create` is an **exclusive create**: it either stores the record
///   at a previously-vacant address or fails with `RoomExists`, and two
///   concurrent creates for the same address have exactly one winner
/// - `remove` is atomic with respect to concurrent `create` of the same
///   address: it either deletes an existing record or fails with
///   `RoomNotFound`
/// - A failed operation leaves the backend unchanged
///
/// # Implementors
///
/// - [`super::MemoryBackend`] - for testing
/// - [`super::FileBackend`] - for persistent storage
pub trait RoomBackend: Send + Sync + std::fmt::Debug {
    /// Stores a record at a vacant address.
    ///
    /// # Errors
    ///
    /// Returns `RoomExists` if the address is occupied, or an I/O error.
    fn create(&self, address: &ContentAddress, record: &StoredRoom) -> StoreResult<()>;

    /// Deletes the record at an address.
    ///
    /// # Errors
    ///
    /// Returns `RoomNotFound` if the address is vacant, or an I/O error.
    fn remove(&self, address: &ContentAddress) -> StoreResult<()>;

    /// Reads the record at an address, if any.
    ///
    /// # Errors
    ///
    /// Returns `CorruptRecord` if a record exists but cannot be
    /// decoded, or an I/O error.
    fn get(&self, address: &ContentAddress) -> StoreResult<Option<StoredRoom>>;

    /// Returns true if a record occupies the address.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the check fails.
    fn contains(&self, address: &ContentAddress) -> StoreResult<bool>;

    /// Returns every stored record.
    ///
    /// Used for random selection and catalog reconciliation; order is
    /// unspecified.
    ///
    /// # Errors
    ///
    /// Returns `CorruptRecord` or an I/O error.
    fn list(&self) -> StoreResult<Vec<StoredRoom>>;

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the count fails.
    fn len(&self) -> StoreResult<usize>;

    /// Returns true if no records are stored.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the count fails.
    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}
