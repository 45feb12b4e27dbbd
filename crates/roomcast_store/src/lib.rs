//! # Roomcast Store
//!
//! Content-addressed room storage for roomcast.
//!
//! Rooms are keyed by a two-part content address derived from the owner
//! and the room name, so the storage layout never exposes raw names and
//! lookups never scan a directory listing.
//!
//! ## Design Principles
//!
//! - Backends expose an **exclusive create**: publishing an occupied
//!   address fails, and two concurrent publishes for the same address
//!   produce exactly one winner
//! - Failed operations leave storage unchanged
//! - Backends must be `Send + Sync` for concurrent access
//!
//! ## Available Backends
//!
//! - [`MemoryBackend`] - for testing and ephemeral catalogs
//! - [`FileBackend`] - one JSON record per room under a locked directory
//!
//! ## Example
//!
//! ```rust
//! use roomcast_protocol::RoomDocument;
//! use roomcast_store::RoomStore;
//!
//! let store = RoomStore::in_memory();
//! let doc = RoomDocument::new("cave1", serde_json::json!("payload"));
//! store.publish("alice", &doc).unwrap();
//! assert!(store.publish("alice", &doc).is_err()); // already exists
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod address;
mod backend;
mod error;
mod file;
mod memory;
mod store;

pub use address::ContentAddress;
pub use backend::{RoomBackend, StoredRoom};
pub use error::{StoreError, StoreResult};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use store::{RoomStore, StoreConfig};
