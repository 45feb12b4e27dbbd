//! Token mint and verification.
//!
//! Tokens are composed of:
//! - the username bytes
//! - 8 bytes: issue timestamp (Unix millis, big-endian)
//! - 32 bytes: HMAC-SHA256 signature over everything before it
//!
//! The whole token is hex-encoded for transport. Verification is
//! stateless: a token is valid iff its signature matches the deployment
//! signing key. The timestamp is carried for a future expiry policy but
//! is not checked.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// Length of the HMAC-SHA256 signature in bytes.
const SIGNATURE_LEN: usize = 32;
/// Length of the embedded timestamp in bytes.
const TIMESTAMP_LEN: usize = 8;

/// Signs and verifies authentication tokens.
#[derive(Clone)]
pub struct TokenSigner {
    signing_key: Vec<u8>,
}

impl TokenSigner {
    /// Creates a signer over the given deployment signing key.
    pub fn new(signing_key: impl Into<Vec<u8>>) -> Self {
        Self {
            signing_key: signing_key.into(),
        }
    }

    /// Mints a token for the given username.
    #[must_use]
    pub fn sign(&self, user: &str) -> String {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let mut payload = Vec::with_capacity(user.len() + TIMESTAMP_LEN + SIGNATURE_LEN);
        payload.extend_from_slice(user.as_bytes());
        payload.extend_from_slice(&timestamp.to_be_bytes());

        let signature = self.mac(&payload);
        payload.extend_from_slice(&signature);

        hex_encode(&payload)
    }

    /// Parses and verifies a token.
    ///
    /// Returns the username and the issue timestamp in Unix millis, or
    /// `None` for any malformed, truncated, or forged input. Never
    /// panics.
    #[must_use]
    pub fn parse(&self, token: &str) -> Option<(String, u64)> {
        let bytes = hex_decode(token)?;
        // At least one username byte plus timestamp and signature.
        if bytes.len() <= TIMESTAMP_LEN + SIGNATURE_LEN {
            return None;
        }

        let (payload, signature) = bytes.split_at(bytes.len() - SIGNATURE_LEN);
        if self.mac(payload).as_slice() != signature {
            return None;
        }

        let (user_bytes, timestamp_bytes) = payload.split_at(payload.len() - TIMESTAMP_LEN);
        let user = String::from_utf8(user_bytes.to_vec()).ok()?;
        let timestamp = u64::from_be_bytes(timestamp_bytes.try_into().ok()?);

        Some((user, timestamp))
    }

    /// Computes the HMAC-SHA256 over the payload.
    fn mac(&self, payload: &[u8]) -> [u8; SIGNATURE_LEN] {
        let mut mac =
            HmacSha256::new_from_slice(&self.signing_key).expect("HMAC can take key of any size");
        mac.update(payload);
        mac.finalize().into_bytes().into()
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of debug output.
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(text.get(i..i + 2)?, 16).ok())
        .collect()
}
