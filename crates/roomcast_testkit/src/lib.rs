//! # Roomcast Testkit
//!
//! Test utilities for roomcast.
//!
//! This crate provides:
//! - Fixtures: in-memory nodes with auth, store, hub, and manager wired
//! - Cluster helpers: fully-meshed multi-node setups with deterministic
//!   settling
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use roomcast_testkit::prelude::*;
//!
//! let cluster = TestCluster::meshed(2);
//! let token = cluster.node(0).login("alice", "secret123");
//! cluster.node(0).manager.publish(&token, r#"{"room": "r", "data": 1}"#).unwrap();
//! cluster.settle();
//! assert!(cluster.node(1).store.contains("alice", "r").unwrap());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cluster;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::cluster::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use cluster::*;
pub use fixtures::*;
pub use generators::*;

/// Initializes a tracing subscriber for test diagnostics.
///
/// Honors `RUST_LOG`; safe to call from multiple tests, later calls
/// are no-ops.
pub fn init_test_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
