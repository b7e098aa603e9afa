//! Persistence adapter: JSON-encoded slots in a key-value store.
//!
//! Every committed state change is written back immediately; there is no
//! debouncing or write coalescing. Derived views are never stored.

use std::cell::RefCell;
use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Slot holding the ordered note collection.
pub const NOTES_KEY: &str = "NOTES";
/// Slot holding the ordered tag collection.
pub const TAGS_KEY: &str = "TAGS";
/// Slot holding the sparse options object.
pub const OPTIONS_KEY: &str = "OPTIONS";
/// Slot holding the checklist items.
pub const ITEMS_KEY: &str = "ITEMS";

/// A durable string-to-string map with named slots.
pub trait KeyValueStore {
    /// Returns the stored string for `key`, or `None` if nothing is stored.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Stores several slots so that either all writes land or none do.
    fn set_items(&self, items: &[(&str, String)]) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Non-durable store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the keys currently stored, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.items.borrow().keys().cloned().collect()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_items(&self, items: &[(&str, String)]) -> Result<()> {
        let mut map = self.items.borrow_mut();
        for (key, value) in items {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn set_items(&self, items: &[(&str, String)]) -> Result<()> {
        (**self).set_items(items)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }
}

/// Loads the value stored under `key`.
///
/// Returns `default()` when the slot is empty. Content that no longer parses
/// as `T` is treated the same way, with a warning, so a corrupt slot never
/// prevents startup.
///
/// # Errors
///
/// Returns an error only if the store itself cannot be read.
///
/// # Examples
///
/// ```
/// use getem::storage::{self, KeyValueStore, MemoryStorage};
///
/// # fn main() -> anyhow::Result<()> {
/// let store = MemoryStorage::new();
/// let tags: Vec<String> = storage::load(&store, "TAGS", Vec::new)?;
/// assert!(tags.is_empty());
///
/// store.set_item("TAGS", "not json")?;
/// let tags: Vec<String> = storage::load(&store, "TAGS", || vec!["fallback".to_string()])?;
/// assert_eq!(tags, vec!["fallback"]);
/// # Ok(())
/// # }
/// ```
pub fn load<T, S, F>(store: &S, key: &str, default: F) -> Result<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
    F: FnOnce() -> T,
{
    let Some(json) = store.get_item(key)? else {
        tracing::debug!(slot = key, "slot is empty, using default");
        return Ok(default());
    };

    match serde_json::from_str(&json) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::warn!(slot = key, error = %e, "stored slot is corrupt, falling back to default");
            Ok(default())
        }
    }
}

/// Serializes `value` and writes it under `key`.
pub fn save<T, S>(store: &S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let json = encode(key, value)?;
    store.set_item(key, &json)
}

/// Serializes `value` for a multi-slot write via [`KeyValueStore::set_items`].
pub fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String> {
    serde_json::to_string(value).with_context(|| format!("Failed to encode slot {key}"))
}
