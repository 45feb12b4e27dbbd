//! File-based room backend for persistent storage.
//!
//! Layout:
//!
//! ```text
//! <store_path>/
//! ├─ LOCK                    # Advisory lock for single-writer
//! └─ rooms/
//!    ├─ room_<address>.json  # One record per room
//!    └─ ...
//! ```
//!
//! The LOCK file ensures only one process serves a store directory at a
//! time. Record files are named by content address, so raw owner and
//! room names never appear on disk.

use crate::address::ContentAddress;
use crate::backend::{RoomBackend, StoredRoom};
use crate::error::{StoreError, StoreResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const LOCK_FILE: &str = "LOCK";
const ROOMS_DIR: &str = "rooms";
const ROOM_PREFIX: &str = "room_";
const ROOM_SUFFIX: &str = ".json";

/// A file-based room backend.
///
/// Each room is one JSON record file; records survive process restarts.
/// The exclusive-create invariant comes straight from the filesystem:
/// `O_CREAT | O_EXCL` either creates the file or fails because it
/// already exists, so two concurrent publishes for the same address
/// have exactly one winner with no extra locking.
///
/// # Example
///
/// ```no_run
/// use roomcast_store::{FileBackend, RoomBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::open(Path::new("catalog")).unwrap();
/// assert_eq!(backend.len().unwrap(), 0);
/// ```
#[derive(Debug)]
pub struct FileBackend {
    rooms_dir: PathBuf,
    _lock_file: File,
}

impl FileBackend {
    /// Opens or creates a store directory at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DirectoryLocked`] if another process holds
    /// the directory lock, or an I/O error if the directory cannot be
    /// created.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if path.is_dir() {
            info!(path = %path.display(), "data directory OK");
        } else {
            fs::create_dir_all(path)?;
            info!(path = %path.display(), "created data directory");
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;
        if lock_file.try_lock_exclusive().is_err() {
            return Err(StoreError::DirectoryLocked);
        }

        let rooms_dir = path.join(ROOMS_DIR);
        fs::create_dir_all(&rooms_dir)?;

        Ok(Self {
            rooms_dir,
            _lock_file: lock_file,
        })
    }

    fn record_path(&self, address: &ContentAddress) -> PathBuf {
        self.rooms_dir
            .join(format!("{ROOM_PREFIX}{address}{ROOM_SUFFIX}"))
    }

    fn read_record(&self, path: &Path, address: &str) -> StoreResult<StoredRoom> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| StoreError::corrupt_record(address, e.to_string()))
    }

    /// Syncs the rooms directory so creations and deletions are durable.
    #[cfg(unix)]
    fn sync_rooms_dir(&self) -> StoreResult<()> {
        File::open(&self.rooms_dir)?.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_rooms_dir(&self) -> StoreResult<()> {
        // NTFS journaling covers metadata durability on Windows.
        Ok(())
    }
}

impl RoomBackend for FileBackend {
    fn create(&self, address: &ContentAddress, record: &StoredRoom) -> StoreResult<()> {
        let path = self.record_path(address);
        let body = serde_json::to_string(record)
            .map_err(|e| StoreError::corrupt_record(address.as_str(), e.to_string()))?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::RoomExists);
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = file.write_all(body.as_bytes()).and_then(|()| file.sync_all()) {
            // Partial writes must not look like a stored room.
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(e.into());
        }

        self.sync_rooms_dir()
    }

    fn remove(&self, address: &ContentAddress) -> StoreResult<()> {
        match fs::remove_file(self.record_path(address)) {
            Ok(()) => self.sync_rooms_dir(),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::RoomNotFound),
            Err(e) => Err(e.into()),
        }
    }

    fn get(&self, address: &ContentAddress) -> StoreResult<Option<StoredRoom>> {
        let path = self.record_path(address);
        if !path.is_file() {
            return Ok(None);
        }
        self.read_record(&path, address.as_str()).map(Some)
    }

    fn contains(&self, address: &ContentAddress) -> StoreResult<bool> {
        Ok(self.record_path(address).is_file())
    }

    fn list(&self) -> StoreResult<Vec<StoredRoom>> {
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.rooms_dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.starts_with(ROOM_PREFIX) || !name.ends_with(ROOM_SUFFIX) {
                continue;
            }
            let address = &name[ROOM_PREFIX.len()..name.len() - ROOM_SUFFIX.len()];
            records.push(self.read_record(&path, address)?);
        }
        Ok(records)
    }

    fn len(&self) -> StoreResult<usize> {
        let mut count = 0;
        for entry in fs::read_dir(&self.rooms_dir)? {
            let path = entry?.path();
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with(ROOM_PREFIX) && name.ends_with(ROOM_SUFFIX) {
                    count += 1;
                }
            }
        }
        Ok(count)
    }
}
