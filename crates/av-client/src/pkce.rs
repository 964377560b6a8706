//! PKCE (Proof Key for Code Exchange) utilities
//!
//! Implements PKCE as defined in RFC 7636 with the S256 challenge method.
//! The verifier stays on this client; only the challenge travels in the
//! authorize URL, which binds the authorization code to the client that
//! started the flow.

use std::sync::Arc;

use av_types::{AuthError, AuthResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::platform::Platform;
use crate::storage::{KeyValueStorage, PKCE_STORAGE_KEY};

/// PKCE pair for one flow attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PkcePair {
    /// Code verifier (high-entropy random string, kept client-side)
    pub code_verifier: String,

    /// Code challenge (BASE64URL-NOPAD(SHA256(code_verifier)))
    pub code_challenge: String,
}

/// Generates PKCE pairs and persists the verifier across the redirect.
pub struct PkceHandler {
    storage: Arc<dyn KeyValueStorage>,
    platform: Arc<dyn Platform>,
}

impl PkceHandler {
    pub fn new(storage: Arc<dyn KeyValueStorage>, platform: Arc<dyn Platform>) -> Self {
        Self { storage, platform }
    }

    /// Generate a verifier/challenge pair and persist the verifier.
    ///
    /// A new pair overwrites any unused verifier from a previous attempt.
    pub fn generate(&self) -> AuthResult<PkcePair> {
        let code_verifier = self.platform.random_token()?;
        let code_challenge = URL_SAFE_NO_PAD.encode(self.platform.sha256(code_verifier.as_bytes()));

        self.storage.set(PKCE_STORAGE_KEY, &code_verifier);
        debug!("Generated PKCE pair");

        Ok(PkcePair {
            code_verifier,
            code_challenge,
        })
    }

    /// Verifier persisted by the last `generate` call.
    ///
    /// The stored value is deleted on retrieval: like the CSRF state, the
    /// verifier is write-once per flow and consumed by the attempt that
    /// reads it. Absence is an error rather than an empty value: it means
    /// the flow was started in another session or storage was cleared in
    /// between.
    pub fn code_verifier(&self) -> AuthResult<String> {
        let verifier = self.storage.get(PKCE_STORAGE_KEY);
        self.storage.remove(PKCE_STORAGE_KEY);
        verifier
            .ok_or_else(|| AuthError::Protocol("Code verifier not found in storage".to_string()))
    }
}
