//! Session handle shared between concurrent requests.

use crate::store::SessionStore;
use parking_lot::{Mutex, MutexGuard};
use serde_json::Value;
use std::sync::Arc;
use tracing::trace;

/// Cloneable handle to a session store guarded by a mutex.
///
/// Every clone refers to the same store. Holding the guard returned by
/// [`lock`](Self::lock) serializes read-modify-write sequences across all
/// clones, which is what concurrent requests of one session need.
#[derive(Debug)]
pub struct SharedSession<S> {
    inner: Arc<Mutex<S>>,
}

/// Locked access to a [`SharedSession`].
pub type SessionGuard<'a, S> = MutexGuard<'a, S>;

impl<S: SessionStore> SharedSession<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Lock the store for exclusive access.
    ///
    /// Do not hold the guard across an `.await`.
    pub fn lock(&self) -> SessionGuard<'_, S> {
        trace!("Locking shared session");
        self.inner.lock()
    }

    /// Number of live handles to this store.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Recover the store if this is the last handle.
    pub fn try_into_inner(self) -> Result<S, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl<S> Clone for SharedSession<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: SessionStore + Default> Default for SharedSession<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: SessionStore + ?Sized> SessionStore for MutexGuard<'_, S> {
    fn get(&self, key: &str) -> Option<Value> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        (**self).set(key, value)
    }

    fn contains(&self, key: &str) -> bool {
        (**self).contains(key)
    }

    fn remove(&mut self, key: &str) -> Option<Value> {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySession;
    use serde_json::json;

    #[test]
    fn test_clones_share_store() {
        let shared = SharedSession::new(MemorySession::new());
        let other = shared.clone();

        shared.lock().set("k", json!("v"));
        assert_eq!(other.lock().get("k"), Some(json!("v")));
        assert_eq!(shared.handle_count(), 2);
    }

    #[test]
    fn test_try_into_inner() {
        let shared = SharedSession::new(MemorySession::new());
        let other = shared.clone();

        let shared = shared.try_into_inner().unwrap_err();
        drop(other);

        let session = shared.try_into_inner().unwrap();
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_locked_increments_are_not_lost() {
        let shared: SharedSession<MemorySession> = SharedSession::default();
        shared.lock().set("counter", json!(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let session = shared.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    let mut guard = session.lock();
                    let current: u64 = guard.get_as("counter").unwrap().unwrap();
                    guard.set("counter", json!(current + 1));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(shared.lock().get("counter"), Some(json!(800)));
    }
}
