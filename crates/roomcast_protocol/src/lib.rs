//! # Roomcast Protocol
//!
//! Shared data types for the roomcast room catalog service.
//!
//! This crate provides:
//! - [`RoomDocument`] - the strict two-field room schema
//! - [`SyncEvent`] - room lifecycle events relayed between nodes
//! - [`RoomOffer`] - one catalog entry exchanged during reconciliation
//! - [`NodeId`] - identity of a room-manager node
//!
//! This is a pure types crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod document;
mod event;

pub use document::{DocumentError, RoomDocument};
pub use event::{NodeId, RoomOffer, SyncEvent};
