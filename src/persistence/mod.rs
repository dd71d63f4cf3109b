//! Profile-scoped key/value persistence
//!
//! Features:
//! - `KeyValueStore` backend trait (LocalStorage on web, in-memory elsewhere)
//! - JSON values scoped by the active profile id
//! - Corrupt or unreadable entries load as absent and are logged

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorageStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use thiserror::Error;

/// Key prefix shared by every entry the game writes
pub const KEY_NAMESPACE: &str = "sky_hopper";

/// Profile used before anyone logs in
pub const GUEST_PROFILE: &str = "guest";

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Raw string storage backend
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory backend for native builds and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
    reject_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, like a full LocalStorage quota
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.reject_writes.get() {
            return Err(StorageError::Backend("quota exceeded".to_string()));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Typed, profile-scoped view over a backend.
///
/// Callers pass logical key names (`"settings"`, `"pet"`); the store owns the
/// physical layout `sky_hopper:<profile>:<key>`.
#[derive(Debug)]
pub struct ProfileStore<S: KeyValueStore> {
    backend: S,
    profile: String,
}

impl<S: KeyValueStore> ProfileStore<S> {
    pub fn new(backend: S, profile: impl Into<String>) -> Self {
        Self {
            backend,
            profile: profile.into(),
        }
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Switch the active profile; later loads and saves use its keys
    pub fn set_profile(&mut self, profile: impl Into<String>) {
        self.profile = profile.into();
        log::info!("Active profile: {}", self.profile);
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    fn scoped_key(&self, key: &str) -> String {
        format!("{KEY_NAMESPACE}:{}:{key}", self.profile)
    }

    /// Load a value; missing, unreadable or corrupt entries yield `None`
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let scoped = self.scoped_key(key);
        let json = match self.backend.get(&scoped) {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Failed to read {scoped}: {e}");
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Discarding corrupt entry {scoped}: {e}");
                None
            }
        }
    }

    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        self.backend.set(&self.scoped_key(key), &json)
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.backend.remove(&self.scoped_key(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        matches!(self.backend.get(&self.scoped_key(key)), Ok(Some(_)))
    }
}

impl ProfileStore<MemoryStore> {
    /// In-memory store on the guest profile
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new(), GUEST_PROFILE)
    }
}
