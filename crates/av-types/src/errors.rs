//! Error types and conversions

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Invalid or incomplete client options. Always raised synchronously at
    /// construction; no client instance is produced.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failure or non-2xx response from a backend endpoint.
    #[error("Network error: {0}")]
    Network(String),

    /// Protocol-level failure: CSRF state mismatch, missing PKCE verifier,
    /// or a token response without an access token.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Malformed token structure or non-JSON payload.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

impl From<AuthError> for String {
    fn from(err: AuthError) -> String {
        err.to_string()
    }
}
