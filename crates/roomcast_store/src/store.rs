//! The room store.

use crate::address::ContentAddress;
use crate::backend::{RoomBackend, StoredRoom};
use crate::error::{StoreError, StoreResult};
use crate::file::FileBackend;
use crate::memory::MemoryBackend;
use rand::seq::SliceRandom;
use roomcast_protocol::{RoomDocument, RoomOffer};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Configuration for the room store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum attempts for an operation that hits transient I/O errors.
    pub retry_attempts: u32,
    /// Delay before the first retry; doubles per attempt.
    pub retry_initial_delay: Duration,
}

impl StoreConfig {
    /// Sets the maximum retry attempts.
    #[must_use]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts.max(1);
        self
    }

    /// Sets the initial retry delay.
    #[must_use]
    pub fn with_retry_initial_delay(mut self, delay: Duration) -> Self {
        self.retry_initial_delay = delay;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            retry_initial_delay: Duration::from_millis(50),
        }
    }
}

/// Content-addressed storage for room documents.
///
/// The store validates documents, derives content addresses, and
/// delegates record persistence to a [`RoomBackend`]. Transient I/O
/// errors are retried with bounded backoff before surfacing; caller
/// errors (conflict, not-found, validation) are returned immediately.
pub struct RoomStore {
    backend: Box<dyn RoomBackend>,
    config: StoreConfig,
}

impl RoomStore {
    /// Creates a store over an in-memory backend.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_backend(Box::new(MemoryBackend::new()), StoreConfig::default())
    }

    /// Opens a file-backed store at the given directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DirectoryLocked`] if another process holds
    /// the directory, or an I/O error.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Ok(Self::with_backend(
            Box::new(FileBackend::open(path)?),
            StoreConfig::default(),
        ))
    }

    /// Creates a store over an explicit backend and configuration.
    #[must_use]
    pub fn with_backend(backend: Box<dyn RoomBackend>, config: StoreConfig) -> Self {
        Self { backend, config }
    }

    /// Publishes a room for an owner.
    ///
    /// The existence check and the write are one atomic step in the
    /// backend, so concurrent publishes for the same (owner, name) have
    /// exactly one winner.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` for an empty room name, `RoomExists` if
    /// the (owner, name) pair is already published, or an I/O error
    /// after retries are exhausted.
    pub fn publish(&self, owner: &str, document: &RoomDocument) -> StoreResult<()> {
        if document.room.is_empty() {
            warn!("rejected room with empty name");
            return Err(StoreError::invalid_format("room name must be non-empty"));
        }

        let record = StoredRoom::new(owner, document.clone());
        let address = record.address();

        self.retrying(|| self.backend.create(&address, &record))
            .map_err(|e| {
                if matches!(e, StoreError::RoomExists) {
                    warn!(room = %document.room, "room already exists");
                }
                e
            })?;

        info!(room = %document.room, %address, "registered room");
        Ok(())
    }

    /// Removes an owner's room by name.
    ///
    /// # Errors
    ///
    /// Returns `RoomNotFound` if the (owner, name) pair is not
    /// published, or an I/O error after retries are exhausted.
    pub fn remove(&self, owner: &str, name: &str) -> StoreResult<()> {
        let address = ContentAddress::for_room(owner, name);

        self.retrying(|| self.backend.remove(&address)).map_err(|e| {
            if matches!(e, StoreError::RoomNotFound) {
                warn!(room = %name, "room does not exist");
            }
            e
        })?;

        info!(room = %name, %address, "deleted room");
        Ok(())
    }

    /// Returns one uniformly chosen stored document.
    ///
    /// # Errors
    ///
    /// Returns `RoomNotFound` if the store is empty.
    pub fn fetch_random(&self) -> StoreResult<RoomDocument> {
        let records = self.retrying(|| self.backend.list())?;
        match records.choose(&mut rand::thread_rng()) {
            Some(record) => Ok(record.document.clone()),
            None => {
                warn!("no rooms in store");
                Err(StoreError::RoomNotFound)
            }
        }
    }

    /// Returns an owner's room document by name, if published.
    ///
    /// # Errors
    ///
    /// Returns an I/O or decode error from the backend.
    pub fn get(&self, owner: &str, name: &str) -> StoreResult<Option<RoomDocument>> {
        let address = ContentAddress::for_room(owner, name);
        Ok(self
            .retrying(|| self.backend.get(&address))?
            .map(|record| record.document))
    }

    /// Returns true if the (owner, name) pair is published.
    ///
    /// # Errors
    ///
    /// Returns an I/O error from the backend.
    pub fn contains(&self, owner: &str, name: &str) -> StoreResult<bool> {
        let address = ContentAddress::for_room(owner, name);
        self.retrying(|| self.backend.contains(&address))
    }

    /// Returns the full catalog as reconciliation offers.
    ///
    /// # Errors
    ///
    /// Returns an I/O or decode error from the backend.
    pub fn catalog(&self) -> StoreResult<Vec<RoomOffer>> {
        Ok(self
            .retrying(|| self.backend.list())?
            .into_iter()
            .map(|record| RoomOffer::new(record.owner, record.document))
            .collect())
    }

    /// Returns the number of stored rooms.
    ///
    /// # Errors
    ///
    /// Returns an I/O error from the backend.
    pub fn len(&self) -> StoreResult<usize> {
        self.retrying(|| self.backend.len())
    }

    /// Returns true if no rooms are stored.
    ///
    /// # Errors
    ///
    /// Returns an I/O error from the backend.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Applies a replicated room creation idempotently.
    ///
    /// A duplicate create is a silent no-op: relay delivery is
    /// best-effort and may duplicate. Returns true if the room was
    /// stored, false if the address was already occupied.
    ///
    /// # Errors
    ///
    /// Returns an I/O error after retries are exhausted.
    pub fn apply_new_room(&self, owner: &str, document: &RoomDocument) -> StoreResult<bool> {
        match self.publish(owner, document) {
            Ok(()) => Ok(true),
            Err(StoreError::RoomExists) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Applies a replicated room removal idempotently.
    ///
    /// A missing target is a silent no-op. Returns true if a room was
    /// deleted, false if the address was already vacant.
    ///
    /// # Errors
    ///
    /// Returns an I/O error after retries are exhausted.
    pub fn apply_removed_room(&self, owner: &str, name: &str) -> StoreResult<bool> {
        match self.remove(owner, name) {
            Ok(()) => Ok(true),
            Err(StoreError::RoomNotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Runs an operation, retrying transient I/O errors with doubling
    /// backoff up to the configured attempt limit.
    fn retrying<T>(&self, op: impl Fn() -> StoreResult<T>) -> StoreResult<T> {
        let mut delay = self.config.retry_initial_delay;
        let mut attempt = 1;
        loop {
            match op() {
                Err(e) if e.is_transient() && attempt < self.config.retry_attempts => {
                    warn!(attempt, error = %e, "transient storage error, retrying");
                    std::thread::sleep(delay);
                    delay *= 2;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

impl std::fmt::Debug for RoomStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomStore")
            .field("backend", &self.backend)
            .field("config", &self.config)
            .finish()
    }
}
