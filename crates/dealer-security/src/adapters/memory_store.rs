//! In-memory session store.
//!
//! Stands in for browser session storage: lives as long as the process and
//! is shared by every component holding a clone of the `Arc`.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::domain::errors::StorageError;
use crate::domain::keys::StorageKey;
use crate::ports::KeyValueStore;

#[derive(Debug)]
pub struct MemoryStore {
    entries: RwLock<HashMap<StorageKey, String>>,
    unavailable: AtomicBool,
    /// Writes left before `QuotaExceeded`; `usize::MAX` means unlimited.
    write_budget: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
            write_budget: AtomicUsize::new(usize::MAX),
        }
    }

    /// A store that rejects every operation, like storage disabled by the browser.
    pub fn unavailable() -> Self {
        let store = Self::new();
        store.set_available(false);
        store
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Allow `writes` more successful writes, then fail with `QuotaExceeded`.
    pub fn limit_writes(&self, writes: usize) {
        self.write_budget.store(writes, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn contains(&self, key: StorageKey) -> bool {
        self.entries.read().contains_key(&key)
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("session storage disabled".into()));
        }
        Ok(())
    }

    fn take_write(&self) -> Result<(), StorageError> {
        self.write_budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                usize::MAX => Some(usize::MAX),
                0 => None,
                n => Some(n - 1),
            })
            .map(|_| ())
            .map_err(|_| StorageError::QuotaExceeded)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        Ok(self.entries.read().get(&key).cloned())
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        self.check_available()?;
        self.take_write()?;
        self.entries.write().insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        self.check_available()?;
        self.entries.write().remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        store.set(StorageKey::UserData, "{}").unwrap();
        assert_eq!(store.get(StorageKey::UserData).unwrap().as_deref(), Some("{}"));
        store.remove(StorageKey::UserData).unwrap();
        store.remove(StorageKey::UserData).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_unavailable() {
        let store = MemoryStore::unavailable();
        assert!(matches!(
            store.get(StorageKey::AuthToken),
            Err(StorageError::Unavailable(_))
        ));
        assert!(store.set(StorageKey::AuthToken, "t").is_err());
        store.set_available(true);
        assert!(store.set(StorageKey::AuthToken, "t").is_ok());
    }

    #[test]
    fn test_write_limit() {
        let store = MemoryStore::new();
        store.limit_writes(1);
        assert!(store.set(StorageKey::AuthToken, "t").is_ok());
        assert_eq!(
            store.set(StorageKey::AuthTokenExpires, "1"),
            Err(StorageError::QuotaExceeded)
        );
        assert_eq!(store.len(), 1);
    }
}
