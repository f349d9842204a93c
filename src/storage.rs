//! Key-value stores for persisted filter selections.
//!
//! The browser build backs [`KeyValueStore`] with `localStorage`; the CLI
//! uses [`FileStore`]. Any store can be wrapped in a [`ResilientStore`] so an
//! unavailable backend degrades to session-only memory instead of failing.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PersistenceError;

/// String-keyed, string-valued store, shared by reference.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove_item(&self, key: &str) -> Result<(), PersistenceError>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), PersistenceError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Store persisted as a flat JSON object in a single file.
///
/// The file is read once at open and rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    items: RefCell<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        let items = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            items: RefCell::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&*self.items.borrow())?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove_item(&self, key: &str) -> Result<(), PersistenceError> {
        let removed = self.items.borrow_mut().remove(key).is_some();
        if removed { self.flush() } else { Ok(()) }
    }
}

/// Wraps a store and switches to memory for the rest of the session after
/// the first backend error.
pub struct ResilientStore<S> {
    primary: Option<S>,
    fallback: MemoryStore,
    degraded: Cell<bool>,
}

impl<S: KeyValueStore> ResilientStore<S> {
    pub fn new(primary: S) -> Self {
        Self {
            primary: Some(primary),
            fallback: MemoryStore::new(),
            degraded: Cell::new(false),
        }
    }

    /// A store whose backend could not be opened at all.
    pub fn unavailable(reason: &PersistenceError) -> Self {
        log::warn!("storage unavailable, keeping filters in memory: {reason}");
        Self {
            primary: None,
            fallback: MemoryStore::new(),
            degraded: Cell::new(true),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.get()
    }

    fn backend(&self) -> Option<&S> {
        if self.degraded.get() {
            None
        } else {
            self.primary.as_ref()
        }
    }

    fn degrade(&self, err: &PersistenceError) {
        if !self.degraded.replace(true) {
            log::warn!("storage failed, keeping filters in memory: {err}");
        }
    }
}

impl<S: KeyValueStore> KeyValueStore for ResilientStore<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        if let Some(store) = self.backend() {
            match store.get_item(key) {
                Ok(value) => return Ok(value),
                Err(e) => self.degrade(&e),
            }
        }
        self.fallback.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        if let Some(store) = self.backend() {
            match store.set_item(key, value) {
                Ok(()) => return Ok(()),
                Err(e) => self.degrade(&e),
            }
        }
        self.fallback.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), PersistenceError> {
        if let Some(store) = self.backend() {
            match store.remove_item(key) {
                Ok(()) => return Ok(()),
                Err(e) => self.degrade(&e),
            }
        }
        self.fallback.remove_item(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store that fails every call, like `localStorage` in some private modes.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
            Err(PersistenceError::Unavailable)
        }
        fn set_item(&self, _key: &str, _value: &str) -> Result<(), PersistenceError> {
            Err(PersistenceError::Backend("quota exceeded".to_string()))
        }
        fn remove_item(&self, _key: &str) -> Result<(), PersistenceError> {
            Err(PersistenceError::Unavailable)
        }
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.set_item("k", "v").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("v"));
        store.remove_item("k").unwrap();
        assert_eq!(store.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("filters.json");

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get_item("filters.district").unwrap(), None);
        store.set_item("filters.district", "\"A\"").unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get_item("filters.district").unwrap().as_deref(),
            Some("\"A\"")
        );
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "not json").unwrap();
        assert!(matches!(
            FileStore::open(file.path()),
            Err(PersistenceError::Serialize(_))
        ));
    }

    #[test]
    fn test_resilient_store_falls_back_to_memory() {
        let store = ResilientStore::new(BrokenStore);
        assert!(!store.is_degraded());

        store.set_item("filters.certified", "true").unwrap();
        assert!(store.is_degraded());
        assert_eq!(
            store.get_item("filters.certified").unwrap().as_deref(),
            Some("true")
        );
    }

    #[test]
    fn test_resilient_store_passes_through_when_healthy() {
        let store = ResilientStore::new(MemoryStore::new());
        store.set_item("a", "1").unwrap();
        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("1"));
        assert!(!store.is_degraded());
    }

    #[test]
    fn test_unavailable_store_is_memory_only() {
        let store: ResilientStore<MemoryStore> =
            ResilientStore::unavailable(&PersistenceError::Unavailable);
        assert!(store.is_degraded());
        store.set_item("a", "1").unwrap();
        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("1"));
    }
}
