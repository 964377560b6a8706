//! Listener registration and notification
//!
//! Generic subscribe/notify primitive used to fan out authentication-state
//! changes to registered callbacks.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Identifier returned by `subscribe`, used to deregister.
pub type ListenerId = u64;

/// Set of registered callbacks with synchronous fan-out.
pub struct ListenerManager<T> {
    listeners: RwLock<HashMap<ListenerId, Callback<T>>>,
    next_id: AtomicU64,
}

impl<T> ListenerManager<T> {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register `callback` for future notifications.
    pub fn subscribe<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.write().insert(id, Arc::new(callback));
        id
    }

    /// Deregister a callback; it will never be invoked again.
    pub fn unsubscribe(&self, id: ListenerId) {
        self.listeners.write().remove(&id);
    }

    /// Invoke every currently registered callback with `value` before
    /// returning. No ordering across registrations is promised.
    pub fn notify(&self, value: &T) {
        // Snapshot outside the lock so a callback may subscribe/unsubscribe
        // without deadlocking.
        let callbacks: Vec<Callback<T>> = self.listeners.read().values().cloned().collect();
        for callback in callbacks {
            callback(value);
        }
    }
}

impl<T> Default for ListenerManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_notify_reaches_all_subscribers() {
        let manager = ListenerManager::new();
        let seen_a = Arc::new(Mutex::new(Vec::new()));
        let seen_b = Arc::new(Mutex::new(Vec::new()));

        let a = seen_a.clone();
        manager.subscribe(move |v: &i32| a.lock().push(*v));
        let b = seen_b.clone();
        manager.subscribe(move |v: &i32| b.lock().push(*v));

        manager.notify(&1);
        manager.notify(&2);

        assert_eq!(*seen_a.lock(), vec![1, 2]);
        assert_eq!(*seen_b.lock(), vec![1, 2]);
    }

    #[test]
    fn test_unsubscribed_callback_never_fires_again() {
        let manager = ListenerManager::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let survivor_seen = Arc::new(Mutex::new(Vec::new()));

        let s = seen.clone();
        let id = manager.subscribe(move |v: &i32| s.lock().push(*v));
        let sv = survivor_seen.clone();
        manager.subscribe(move |v: &i32| sv.lock().push(*v));

        manager.notify(&1);
        manager.unsubscribe(id);
        manager.notify(&2);

        assert_eq!(*seen.lock(), vec![1]);
        assert_eq!(*survivor_seen.lock(), vec![1, 2]);
    }

    #[test]
    fn test_unsubscribe_twice_is_noop() {
        let manager = ListenerManager::new();
        let id = manager.subscribe(|_: &i32| {});
        manager.unsubscribe(id);
        manager.unsubscribe(id);
        manager.notify(&1);
    }

    #[test]
    fn test_notify_without_subscribers() {
        let manager: ListenerManager<i32> = ListenerManager::new();
        manager.notify(&42);
    }
}
