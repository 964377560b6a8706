//! Origin-scoped key-value storage
//!
//! The CSRF state and PKCE verifier must survive a full-page redirect round
//! trip, so they live in host-provided persistent storage rather than in the
//! client instance. Browser hosts back this with local storage; native hosts
//! and tests use the in-memory implementation.

use parking_lot::RwLock;
use std::collections::HashMap;

/// Storage key for the CSRF state token.
pub const STATE_STORAGE_KEY: &str = "authVisage:state";

/// Storage key for the PKCE code verifier.
pub const PKCE_STORAGE_KEY: &str = "authVisage:pkce_verifier";

/// Small string store scoped to the application origin.
pub trait KeyValueStorage: Send + Sync {
    /// Get the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Delete the value stored under `key`, if any.
    fn remove(&self, key: &str);
}

/// In-memory storage backend.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k"), None);

        storage.set("k", "v1");
        assert_eq!(storage.get("k"), Some("v1".to_string()));

        storage.set("k", "v2");
        assert_eq!(storage.get("k"), Some("v2".to_string()));

        storage.remove("k");
        assert_eq!(storage.get("k"), None);
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let storage = MemoryStorage::new();
        storage.remove("missing");
        assert_eq!(storage.get("missing"), None);
    }
}
