//! # Roomcast Manager
//!
//! The caller-facing room service: the only component clients address
//! for room mutation.
//!
//! [`RoomManager`] authorizes callers through an
//! [`AuthService`](roomcast_auth::AuthService), persists rooms in a
//! [`RoomStore`](roomcast_store::RoomStore), and emits lifecycle events
//! through an [`EventSink`](roomcast_sync::EventSink) so sibling nodes
//! converge on the same catalog.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod manager;

pub use error::{ManagerError, ManagerResult};
pub use manager::RoomManager;
