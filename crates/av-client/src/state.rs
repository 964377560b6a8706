//! CSRF state handling
//!
//! The `state` parameter ties a callback to the login flow that produced it:
//! an attacker cannot forge a valid callback without first triggering the
//! flow from the victim's browser context.

use std::sync::Arc;

use av_types::AuthResult;
use tracing::debug;

use crate::platform::Platform;
use crate::storage::{KeyValueStorage, STATE_STORAGE_KEY};

/// Issues and single-use-validates the anti-forgery `state` parameter.
pub struct OAuthStateHandler {
    storage: Arc<dyn KeyValueStorage>,
    platform: Arc<dyn Platform>,
}

impl OAuthStateHandler {
    pub fn new(storage: Arc<dyn KeyValueStorage>, platform: Arc<dyn Platform>) -> Self {
        Self { storage, platform }
    }

    /// Generate a fresh state token and persist it for the redirect round
    /// trip.
    pub fn generate(&self) -> AuthResult<String> {
        let state = self.platform.random_token()?;
        self.storage.set(STATE_STORAGE_KEY, &state);
        debug!("Generated OAuth state token");
        Ok(state)
    }

    /// Compare `candidate` against the stored token.
    ///
    /// The stored value is deleted before returning, whatever the outcome: a
    /// state is valid for exactly one validation attempt. Returns `false`
    /// when nothing was stored.
    pub fn validate(&self, candidate: &str) -> bool {
        let stored = self.storage.get(STATE_STORAGE_KEY);
        self.storage.remove(STATE_STORAGE_KEY);
        match stored {
            Some(stored) => stored == candidate,
            None => false,
        }
    }
}
