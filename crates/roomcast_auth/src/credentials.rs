//! Per-user credential storage.

use crate::error::{AuthError, AuthResult};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Holds per-user salted password hashes.
///
/// The store never sees plaintext passwords; callers hash client-side
/// and the store compares opaque hash strings.
///
/// # Thread Safety
///
/// All operations run under a single mutex, so a password change is one
/// critical section: the old-hash comparison and the overwrite cannot
/// interleave with a concurrent change for the same user.
#[derive(Debug, Default)]
pub struct CredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl CredentialStore {
    /// Creates an empty credential store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or changes a user's password hash.
    ///
    /// `old_hash` of `None` means a first-time set and succeeds
    /// unconditionally, creating the credential. Otherwise the supplied
    /// old hash must match the stored one.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] if `old_hash` does not match
    /// the stored hash, or if no credential exists to change. The stored
    /// hash is left untouched on failure.
    pub fn set_password(
        &self,
        user: &str,
        old_hash: Option<&str>,
        new_hash: &str,
    ) -> AuthResult<()> {
        let mut entries = self.entries.lock();

        match old_hash {
            None => {
                entries.insert(user.to_owned(), new_hash.to_owned());
                Ok(())
            }
            Some(old) => match entries.get(user) {
                Some(stored) if stored == old => {
                    entries.insert(user.to_owned(), new_hash.to_owned());
                    Ok(())
                }
                _ => Err(AuthError::Unauthorized),
            },
        }
    }

    /// Verifies a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] for an unknown user or a hash
    /// mismatch; the two cases are indistinguishable to the caller.
    pub fn verify(&self, user: &str, hash: &str) -> AuthResult<()> {
        match self.entries.lock().get(user) {
            Some(stored) if stored == hash => Ok(()),
            _ => Err(AuthError::Unauthorized),
        }
    }

    /// Returns true if a credential exists for the user.
    #[must_use]
    pub fn contains(&self, user: &str) -> bool {
        self.entries.lock().contains_key(user)
    }

    /// Returns the number of stored credentials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if no credentials are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
