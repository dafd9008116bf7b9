//! In-memory session storage.

use crate::store::SessionStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Session data held in a plain map.
///
/// Suitable for tests and for hosts that load the session into memory for
/// the duration of a request and persist it afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySession {
    /// Session data as key-value pairs
    data: HashMap<String, Value>,
}

impl MemorySession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value while building the session.
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Number of keys in the session.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the session holds no keys.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get all keys in the session data.
    pub fn keys(&self) -> Vec<&String> {
        self.data.keys().collect()
    }

    /// Clear all session data.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Consume the session and return the underlying map.
    pub fn into_inner(self) -> HashMap<String, Value> {
        self.data
    }
}

impl From<HashMap<String, Value>> for MemorySession {
    fn from(data: HashMap<String, Value>) -> Self {
        Self { data }
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<Value> {
        self.data.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), value);
    }

    fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }
}
