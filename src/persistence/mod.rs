//! Durable key-value persistence
//!
//! The simulation never touches storage directly. Everything goes through the
//! [`Storage`] trait so the browser's LocalStorage and the in-memory store used
//! by tests and the native build are interchangeable.

pub mod progress;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use progress::{CURRENCY_KEY, ProgressStore, UPGRADES_KEY};
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

use std::collections::HashMap;
use std::fmt;

/// Storage backend failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No backing store (e.g. LocalStorage disabled by the browser)
    Unavailable,
    /// Backend rejected the operation
    Backend(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage unavailable"),
            Self::Backend(msg) => write!(f, "storage backend error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// String key-value store
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Volatile store for tests and the native build
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_round_trip() {
        let mut storage = MemoryStorage::new();
        assert!(storage.is_empty());
        storage.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));
        storage.remove_item("k").unwrap();
        assert_eq!(storage.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_storage_error_display() {
        assert_eq!(StorageError::Unavailable.to_string(), "storage unavailable");
        assert!(StorageError::Backend("quota".into()).to_string().contains("quota"));
    }
}
