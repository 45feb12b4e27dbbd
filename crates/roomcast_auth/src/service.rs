//! The caller-facing authentication service.

use crate::credentials::CredentialStore;
use crate::error::{AuthError, AuthResult};
use crate::token::TokenSigner;
use sha2::{Digest, Sha256};
use tracing::warn;

/// Default deployment salt, used when none is configured.
pub const DEFAULT_SALT: &str = "roomcast";

/// Authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret key for token signing.
    pub signing_key: Vec<u8>,
    /// Deployment-wide salt mixed into password hashes client-side.
    ///
    /// A single shared value, not per-user; rotating it invalidates
    /// every stored hash.
    pub salt: String,
}

impl AuthConfig {
    /// Creates a configuration with the given signing key and the
    /// default salt.
    pub fn new(signing_key: impl Into<Vec<u8>>) -> Self {
        Self {
            signing_key: signing_key.into(),
            salt: DEFAULT_SALT.to_owned(),
        }
    }

    /// Sets the deployment salt.
    #[must_use]
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = salt.into();
        self
    }
}

/// Computes the client-side password hash: hex SHA-256 of the
/// deployment salt concatenated with the plaintext password.
///
/// Callers hash before sending so the service never sees plaintext.
#[must_use]
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Issues and validates tokens over a [`CredentialStore`].
///
/// # Example
///
/// ```
/// use roomcast_auth::{hash_password, AuthConfig, AuthService};
///
/// let config = AuthConfig::new(b"signing-key".to_vec());
/// let salt = config.salt.clone();
/// let auth = AuthService::new(config);
///
/// auth.change_password("alice", None, &hash_password(&salt, "secret123")).unwrap();
/// let token = auth.issue_token("alice", &hash_password(&salt, "secret123")).unwrap();
/// assert_eq!(auth.resolve_owner(&token).unwrap(), "alice");
/// ```
#[derive(Debug)]
pub struct AuthService {
    credentials: CredentialStore,
    signer: TokenSigner,
    config: AuthConfig,
}

impl AuthService {
    /// Creates a service with an empty credential store.
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        Self {
            credentials: CredentialStore::new(),
            signer: TokenSigner::new(config.signing_key.clone()),
            config,
        }
    }

    /// Returns the deployment salt callers must hash with.
    #[must_use]
    pub fn salt(&self) -> &str {
        &self.config.salt
    }

    /// Returns the underlying credential store.
    #[must_use]
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Issues a token for the user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] for an unknown user or a
    /// password hash mismatch.
    pub fn issue_token(&self, user: &str, password_hash: &str) -> AuthResult<String> {
        self.credentials.verify(user, password_hash).map_err(|e| {
            warn!(user, "rejected token request");
            e
        })?;
        Ok(self.signer.sign(user))
    }

    /// Sets or changes a user's password hash.
    ///
    /// An `old_hash` of `None` or the empty string is a first-time set
    /// and succeeds unconditionally (the empty-string form matches the
    /// wire contract, where the field is a plain string).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] if the old hash does not
    /// match; the stored hash is unchanged on failure.
    pub fn change_password(
        &self,
        user: &str,
        old_hash: Option<&str>,
        new_hash: &str,
    ) -> AuthResult<()> {
        let old_hash = old_hash.filter(|h| !h.is_empty());
        self.credentials
            .set_password(user, old_hash, new_hash)
            .map_err(|e| {
                warn!(user, "rejected password change");
                e
            })
    }

    /// Returns true if the token is well-formed, correctly signed, and
    /// names a known user. Never errors.
    #[must_use]
    pub fn validate_token(&self, token: &str) -> bool {
        match self.signer.parse(token) {
            Some((user, _)) => self.credentials.contains(&user),
            None => false,
        }
    }

    /// Resolves a token to the username it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] for malformed or forged
    /// tokens, or tokens naming a user with no stored credential.
    pub fn resolve_owner(&self, token: &str) -> AuthResult<String> {
        let (user, _issued_at) = self.signer.parse(token).ok_or_else(|| {
            warn!("rejected malformed token");
            AuthError::InvalidToken
        })?;

        if !self.credentials.contains(&user) {
            warn!(user, "token names unknown user");
            return Err(AuthError::InvalidToken);
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(AuthConfig::new(b"test-key".to_vec()))
    }

    #[test]
    fn password_hash_is_salted() {
        let h1 = hash_password("salt-a", "secret");
        let h2 = hash_password("salt-b", "secret");
        assert_ne!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn set_password_then_login() {
        let auth = service();
        let hash = hash_password(auth.salt(), "secret123");

        auth.change_password("alice", None, &hash).unwrap();
        let token = auth.issue_token("alice", &hash).unwrap();

        assert!(auth.validate_token(&token));
        assert_eq!(auth.resolve_owner(&token).unwrap(), "alice");
    }

    #[test]
    fn empty_old_hash_is_first_time_set() {
        let auth = service();
        auth.change_password("alice", Some(""), "h1").unwrap();
        auth.issue_token("alice", "h1").unwrap();
    }

    #[test]
    fn issue_token_with_wrong_hash_fails() {
        let auth = service();
        auth.change_password("alice", None, "h1").unwrap();

        assert_eq!(
            auth.issue_token("alice", "wrong"),
            Err(AuthError::Unauthorized)
        );
    }

    #[test]
    fn issue_token_for_unknown_user_fails() {
        let auth = service();
        assert_eq!(
            auth.issue_token("ghost", "h1"),
            Err(AuthError::Unauthorized)
        );
    }

    #[test]
    fn wrong_old_hash_leaves_password_usable() {
        let auth = service();
        auth.change_password("alice", None, "h1").unwrap();

        let result = auth.change_password("alice", Some("wrong"), "h2");
        assert_eq!(result, Err(AuthError::Unauthorized));

        // Old password still logs in.
        auth.issue_token("alice", "h1").unwrap();
    }

    #[test]
    fn password_change_invalidates_old_login() {
        let auth = service();
        auth.change_password("alice", None, "h1").unwrap();
        auth.change_password("alice", Some("h1"), "h2").unwrap();

        assert_eq!(
            auth.issue_token("alice", "h1"),
            Err(AuthError::Unauthorized)
        );
        auth.issue_token("alice", "h2").unwrap();
    }

    #[test]
    fn validate_token_never_errors() {
        let auth = service();
        assert!(!auth.validate_token(""));
        assert!(!auth.validate_token("zzzz"));
        assert!(!auth.validate_token("deadbeef"));
    }

    #[test]
    fn token_for_unknown_user_does_not_validate() {
        // Signed correctly, but no credential behind it.
        let auth = service();
        let signer = TokenSigner::new(b"test-key".to_vec());
        let token = signer.sign("ghost");

        assert!(!auth.validate_token(&token));
        assert_eq!(auth.resolve_owner(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn resolve_owner_rejects_garbage() {
        let auth = service();
        assert_eq!(auth.resolve_owner("junk"), Err(AuthError::InvalidToken));
    }
}
