//! Host platform capabilities
//!
//! The browser SDK reached for window globals directly (secure random,
//! SubtleCrypto, location). The core depends only on this trait instead, so
//! non-browser hosts can supply their own navigation and tests stay
//! deterministic.

use av_types::{AuthError, AuthResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use parking_lot::Mutex;
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use url::Url;

/// Capabilities the authorization flow needs from its host.
pub trait Platform: Send + Sync {
    /// Generate a cryptographically random URL-safe token.
    fn random_token(&self) -> AuthResult<String>;

    /// SHA-256 digest of `data`.
    fn sha256(&self, data: &[u8]) -> Vec<u8>;

    /// URL the host is currently showing, if any.
    fn current_url(&self) -> Option<Url>;

    /// Perform a full navigation to `url`.
    fn redirect(&self, url: &Url) -> AuthResult<()>;
}

/// Platform implementation for hosts that drive navigation themselves.
///
/// Crypto comes from the system CSPRNG and a real SHA-256; navigation is
/// recorded rather than performed. The host sets the current URL from
/// whatever it is displaying and reads `take_redirect` to navigate however
/// it sees fit. Doubles as the deterministic test platform.
#[derive(Default)]
pub struct MemoryPlatform {
    current_url: Mutex<Option<Url>>,
    redirects: Mutex<Vec<Url>>,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the URL reported by `current_url`, e.g. the callback URL the
    /// identity provider redirected back to.
    pub fn set_current_url(&self, url: Url) {
        *self.current_url.lock() = Some(url);
    }

    /// Pop the most recent redirect target requested by the flow.
    pub fn take_redirect(&self) -> Option<Url> {
        self.redirects.lock().pop()
    }
}

impl Platform for MemoryPlatform {
    fn random_token(&self) -> AuthResult<String> {
        let rng = SystemRandom::new();
        let mut bytes = [0u8; 32];
        rng.fill(&mut bytes)
            .map_err(|_| AuthError::Internal("Failed to generate random bytes".to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    fn sha256(&self, data: &[u8]) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hasher.finalize().to_vec()
    }

    fn current_url(&self) -> Option<Url> {
        self.current_url.lock().clone()
    }

    fn redirect(&self, url: &Url) -> AuthResult<()> {
        self.redirects.lock().push(url.clone());
        Ok(())
    }
}
