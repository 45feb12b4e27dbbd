//! # Roomcast Auth
//!
//! Credential storage and token issuance for roomcast.
//!
//! This crate provides:
//! - [`CredentialStore`] - per-user salted password hashes
//! - [`TokenSigner`] - HMAC-SHA256 token mint and verification
//! - [`AuthService`] - the caller-facing issue/validate/resolve surface
//!
//! Passwords are hashed client-side: callers send
//! `sha256(salt || password)` (see [`hash_password`]) and the service
//! stores and compares only hashes, never plaintext.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod credentials;
mod error;
mod service;
mod token;

pub use credentials::CredentialStore;
pub use error::{AuthError, AuthResult};
pub use service::{hash_password, AuthConfig, AuthService, DEFAULT_SALT};
pub use token::TokenSigner;
