//! Content addressing for stored rooms.

use sha2::{Digest, Sha256};
use std::fmt;

/// Domain-separation prefixes keep the owner and name hash namespaces
/// independent: a room name equal to some owner string can never
/// produce the same digest.
const OWNER_PREFIX: &[u8] = b"owner:";
const NAME_PREFIX: &[u8] = b"room:";

/// The deterministic storage key for a room.
///
/// Derived from (owner, name) by hashing each part independently with
/// SHA-256 and joining the hex digests. Stable across process restarts,
/// and the raw owner and name never appear in the storage layout.
///
/// # Example
///
/// ```
/// use roomcast_store::ContentAddress;
///
/// let a = ContentAddress::for_room("alice", "cave1");
/// let b = ContentAddress::for_room("alice", "cave1");
/// assert_eq!(a, b);
/// assert_ne!(a, ContentAddress::for_room("bob", "cave1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentAddress(String);

impl ContentAddress {
    /// Computes the address for a room.
    #[must_use]
    pub fn for_room(owner: &str, name: &str) -> Self {
        let owner_digest = digest(OWNER_PREFIX, owner);
        let name_digest = digest(NAME_PREFIX, name);
        Self(format!("{owner_digest}-{name_digest}"))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn digest(prefix: &[u8], value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prefix);
    hasher.update(value.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
