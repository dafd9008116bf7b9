//! Session store trait definition.

use crate::error::{SessionError, SessionResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Key-addressable, mutable storage owned by the host application.
///
/// Consumers hold a handle to a store (usually `&mut S`) and only ever touch
/// the keys they reserve. Implementations must not assume that any single
/// consumer owns the whole store.
///
/// None of the operations are atomic across calls. A read followed by a
/// write is only safe when the caller serializes access to the store, for
/// example through [`SharedSession::lock`](crate::SharedSession::lock).
///
/// # Examples
///
/// ```
/// use formguard_session::{MemorySession, SessionStore};
/// use serde_json::json;
///
/// let mut session = MemorySession::new();
/// session.set("user_id", json!(123));
///
/// assert!(session.contains("user_id"));
/// assert_eq!(session.get("user_id"), Some(json!(123)));
/// ```
pub trait SessionStore {
    /// Get a copy of the value stored at `key`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` at `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: Value);

    /// Check if a key exists.
    fn contains(&self, key: &str) -> bool;

    /// Remove a key, returning its previous value.
    ///
    /// The guard never removes its own key; this is for hosts that manage
    /// the rest of the session through the same store.
    fn remove(&mut self, key: &str) -> Option<Value>;

    // ========== Convenience Methods ==========

    /// Get a value and deserialize it.
    ///
    /// Returns `Ok(None)` if the key is absent and an error if the stored
    /// value does not have the shape of `T`.
    fn get_as<T: DeserializeOwned>(&self, key: &str) -> SessionResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key) {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| SessionError::deserialization(key, e)),
            None => Ok(None),
        }
    }

    /// Serialize a value and store it.
    fn set_as<T: Serialize>(&mut self, key: &str, value: T) -> SessionResult<()>
    where
        Self: Sized,
    {
        let value = serde_json::to_value(value).map_err(|e| SessionError::serialization(key, e))?;
        self.set(key, value);
        Ok(())
    }
}

impl<S: SessionStore + ?Sized> SessionStore for &mut S {
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

impl<S: SessionStore + ?Sized> SessionStore for Box<S> {
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
