//! Mirrors filter selections to a [`KeyValueStore`].
//!
//! Each selection is restored once, when the dataset has loaded, and only
//! then subscribed for write-back. Attaching the writer first would
//! immediately overwrite the stored value with the unset default.

use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::reactive::{Flag, Observable};
use crate::storage::KeyValueStore;

pub const CATEGORY_KEY: &str = "filters.category";
pub const DISTRICT_KEY: &str = "filters.district";
pub const CERTIFIED_KEY: &str = "filters.certified";

/// Read and decode `key`. Missing, unreadable and undecodable values are all
/// `None`.
pub fn restore<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("could not read '{key}': {e}");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("ignoring stored '{key}' = {raw:?}: {e}");
            None
        }
    }
}

/// Encode and write `value` under `key`, logging failures.
pub fn persist<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let encoded = match serde_json::to_string(value) {
        Ok(encoded) => encoded,
        Err(e) => {
            log::warn!("could not encode '{key}': {e}");
            return;
        }
    };
    if let Err(e) = store.set_item(key, &encoded) {
        log::warn!("could not write '{key}': {e}");
    }
}

/// Bind `cell` to `key`: restore when `loaded` is raised, then write back
/// every change.
///
/// A restored value rejected by `accept` falls back to `T::default()`, as does
/// a missing one.
pub fn bind_to_storage<T, A>(
    loaded: &Flag,
    cell: &Observable<T>,
    store: Rc<dyn KeyValueStore>,
    key: &'static str,
    accept: A,
) where
    T: Clone + PartialEq + Default + Serialize + DeserializeOwned + 'static,
    A: Fn(&T) -> bool + 'static,
{
    let cell = cell.downgrade();
    loaded.on_raise(move || {
        let Some(cell) = cell.upgrade() else {
            return;
        };
        let restored = restore::<T>(&*store, key)
            .filter(|value| accept(value))
            .unwrap_or_default();
        cell.set(restored);
        cell.subscribe(move |value| persist(&*store, key, value));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn memory() -> Rc<MemoryStore> {
        Rc::new(MemoryStore::new())
    }

    #[test]
    fn test_restore_before_write_back() {
        let store = memory();
        store.set_item(DISTRICT_KEY, "\"B\"").unwrap();

        let loaded = Flag::new();
        let district: Observable<Option<String>> = Observable::default();
        bind_to_storage(&loaded, &district, store.clone(), DISTRICT_KEY, |_| true);

        // Nothing is read or written before the dataset has loaded.
        district.set(Some("A".to_string()));
        assert_eq!(store.get_item(DISTRICT_KEY).unwrap().as_deref(), Some("\"B\""));

        loaded.raise();
        assert_eq!(district.get().as_deref(), Some("B"));
        assert_eq!(store.get_item(DISTRICT_KEY).unwrap().as_deref(), Some("\"B\""));

        district.set(None);
        assert_eq!(store.get_item(DISTRICT_KEY).unwrap().as_deref(), Some("null"));
    }

    #[test]
    fn test_empty_store_restores_defaults() {
        let store = memory();
        let loaded = Flag::new();
        let category: Observable<Option<String>> = Observable::new(Some("food".to_string()));
        let certified = Observable::new(true);
        bind_to_storage(&loaded, &category, store.clone(), CATEGORY_KEY, |_| true);
        bind_to_storage(&loaded, &certified, store.clone(), CERTIFIED_KEY, |_| true);

        loaded.raise();
        assert_eq!(category.get(), None);
        assert!(!certified.get());
        assert!(store.is_empty());
    }

    #[test]
    fn test_rejected_value_restores_default() {
        let store = memory();
        store.set_item(CATEGORY_KEY, "\"gone\"").unwrap();
        let loaded = Flag::new();
        let category: Observable<Option<String>> = Observable::default();
        bind_to_storage(&loaded, &category, store.clone(), CATEGORY_KEY, |v| {
            v.as_deref() != Some("gone")
        });
        loaded.raise();
        assert_eq!(category.get(), None);
    }

    #[test]
    fn test_undecodable_value_is_ignored() {
        let store = memory();
        store.set_item(CERTIFIED_KEY, "undefined").unwrap();
        assert_eq!(restore::<bool>(&*store, CERTIFIED_KEY), None);
        store.set_item(CERTIFIED_KEY, "true").unwrap();
        assert_eq!(restore::<bool>(&*store, CERTIFIED_KEY), Some(true));
    }

    #[test]
    fn test_persist_encodes_json() {
        let store = memory();
        persist(&*store, CATEGORY_KEY, &Some("food".to_string()));
        persist(&*store, CERTIFIED_KEY, &false);
        assert_eq!(store.get_item(CATEGORY_KEY).unwrap().as_deref(), Some("\"food\""));
        assert_eq!(store.get_item(CERTIFIED_KEY).unwrap().as_deref(), Some("false"));
    }
}
