//! # Roomcast Sync
//!
//! Peer registry and room-event fan-out for roomcast.
//!
//! Each room-manager node runs a [`SyncHub`]: sibling nodes register
//! with [`SyncHub::hello`], and room lifecycle events are relayed to
//! every registered peer except the origin. Delivery is fire-and-forget
//! with bounded retries - an unreachable peer is logged and skipped,
//! never fatal to the publisher. Nodes recover missed events with
//! [`SyncHub::announce`], a full-catalog exchange.
//!
//! There is no global ordering across peers; events may duplicate or
//! arrive late, which is why peers apply them idempotently.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod hub;
mod peer;
mod registry;
mod sink;

pub use config::RetryConfig;
pub use error::{SyncError, SyncResult};
pub use hub::SyncHub;
pub use peer::{LocalPeer, MockPeer, PeerHandle};
pub use registry::PeerRegistry;
pub use sink::{EventSink, NullSink, RecordingSink};
