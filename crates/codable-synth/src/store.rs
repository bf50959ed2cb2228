//! Key-value storage behind `#[secure_storage]` accessors.
//!
//! Generated getters call one of the typed reads; setters call [`SecureStore::set`]
//! for `Some` and [`SecureStore::delete`] for `None`.

use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};
use tracing::debug;

/// A value held by a [`SecureStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredValue {
    /// UTF-8 text.
    String(String),
    /// A flag.
    Bool(bool),
    /// Raw bytes.
    Data(Vec<u8>),
}

impl From<String> for StoredValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for StoredValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<bool> for StoredValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<u8>> for StoredValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Data(value)
    }
}

/// Storage for secrets, addressed by string keys.
///
/// Reads return `None` when the key is absent or holds a value of another
/// kind. Writes report whether they succeeded.
pub trait SecureStore {
    /// Reads a text value.
    fn get(&self, key: &str) -> Option<String>;

    /// Reads a flag.
    fn get_bool(&self, key: &str) -> Option<bool>;

    /// Reads raw bytes.
    fn get_data(&self, key: &str) -> Option<Vec<u8>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, value: StoredValue, key: &str) -> bool;

    /// Removes `key`. Returns `false` if nothing was stored.
    fn delete(&self, key: &str) -> bool;
}

impl<S: SecureStore + ?Sized> SecureStore for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        (**self).get_bool(key)
    }

    fn get_data(&self, key: &str) -> Option<Vec<u8>> {
        (**self).get_data(key)
    }

    fn set(&self, value: StoredValue, key: &str) -> bool {
        (**self).set(value, key)
    }

    fn delete(&self, key: &str) -> bool {
        (**self).delete(key)
    }
}

/// Process-local [`SecureStore`].
///
/// Text and bytes are interchangeable on read: bytes that are valid UTF-8
/// read back as text and text reads back as its bytes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoredValue>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &str) -> Option<StoredValue> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl SecureStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.lookup(key)? {
            StoredValue::String(text) => Some(text),
            StoredValue::Data(bytes) => String::from_utf8(bytes).ok(),
            StoredValue::Bool(_) => None,
        }
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.lookup(key)? {
            StoredValue::Bool(flag) => Some(flag),
            _ => None,
        }
    }

    fn get_data(&self, key: &str) -> Option<Vec<u8>> {
        match self.lookup(key)? {
            StoredValue::Data(bytes) => Some(bytes),
            StoredValue::String(text) => Some(text.into_bytes()),
            StoredValue::Bool(_) => None,
        }
    }

    fn set(&self, value: StoredValue, key: &str) -> bool {
        debug!("secure store: set `{key}`");
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        true
    }

    fn delete(&self, key: &str) -> bool {
        debug!("secure store: delete `{key}`");
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }
}

/// The store generated accessors use when none is configured.
pub fn shared() -> &'static MemoryStore {
    static SHARED: OnceLock<MemoryStore> = OnceLock::new();
    SHARED.get_or_init(MemoryStore::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_reads() {
        let store = MemoryStore::new();
        assert!(store.set("secret".into(), "token"));
        assert!(store.set(true.into(), "flag"));
        assert!(store.set(vec![0xff, 0x00].into(), "blob"));

        assert_eq!(store.get("token").as_deref(), Some("secret"));
        assert_eq!(store.get_data("token"), Some(b"secret".to_vec()));
        assert_eq!(store.get_bool("flag"), Some(true));
        assert_eq!(store.get("flag"), None);
        assert_eq!(store.get_data("blob"), Some(vec![0xff, 0x00]));
        assert_eq!(store.get("blob"), None);
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn delete_reports_presence() {
        let store = MemoryStore::new();
        store.set("v".into(), "k");
        assert_eq!(store.len(), 1);
        assert!(store.delete("k"));
        assert!(!store.delete("k"));
        assert!(store.is_empty());
    }

    #[test]
    fn references_are_stores() {
        fn read(store: impl SecureStore) -> Option<String> {
            store.get("k")
        }

        let store = MemoryStore::new();
        store.set("v".into(), "k");
        assert_eq!(read(&store).as_deref(), Some("v"));
    }

    #[test]
    fn shared_is_one_instance() {
        assert!(std::ptr::eq(shared(), shared()));
    }
}
