//! Key/value storage areas backing the credential store
//!
//! The dashboard shell exposes two storage lifetimes: one surviving
//! restarts and one scoped to the current tab/process. Both are plain
//! string key/value stores, so the engine abstracts them behind a single
//! trait and gets the two areas injected at construction. `MemoryArea` is
//! the in-process implementation used by tests and by embedders without a
//! browser-like backend.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// A single string key/value storage area
///
/// Implementations are infallible; a backend that can fail should degrade
/// to "key absent" rather than surface errors here.
pub trait StorageArea {
    /// Returns the value stored under `key`, if any
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str);

    /// Removes `key` if present
    fn remove(&self, key: &str);
}

impl<A: StorageArea + ?Sized> StorageArea for Arc<A> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// In-memory storage area
#[derive(Debug, Default)]
pub struct MemoryArea {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryArea {
    /// Creates an empty area
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageArea for MemoryArea {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.write().insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }
}
