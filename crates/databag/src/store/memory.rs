//! [`MemoryStore`]: an in-process [`ItemStore`].
//!
//! Mirrors the responses of a Chef server's data bag endpoints: unknown bags
//! and items are 404, creating an existing item is 409. A bag comes into
//! existence with its first item.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{ItemStore, StoreError};
use crate::codec::{item_id, Document};

type Bags = HashMap<String, HashMap<String, Document>>;

/// Thread-safe in-memory item store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bags: RwLock<Bags>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items in `bag`, or `None` if the bag does not exist.
    pub fn item_count(&self, bag: &str) -> Option<usize> {
        self.read().ok()?.get(bag).map(HashMap::len)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Bags>, StoreError> {
        self.bags
            .read()
            .map_err(|_| StoreError::new(500, "item store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Bags>, StoreError> {
        self.bags
            .write()
            .map_err(|_| StoreError::new(500, "item store lock poisoned"))
    }
}

impl ItemStore for MemoryStore {
    fn get_item(&self, bag: &str, item_id: &str) -> Result<Document, StoreError> {
        let bags = self.read()?;
        let items = bags
            .get(bag)
            .ok_or_else(|| StoreError::not_found(format!("data bag '{bag}' not found")))?;
        items.get(item_id).cloned().ok_or_else(|| {
            StoreError::not_found(format!("item '{item_id}' not found in data bag '{bag}'"))
        })
    }

    fn create_item(&self, bag: &str, item: &Document) -> Result<(), StoreError> {
        let id = item_id(item)
            .map_err(|_| StoreError::new(400, "item must have a non-empty string id"))?
            .to_owned();

        let mut bags = self.write()?;
        let items = bags.entry(bag.to_owned()).or_default();
        if items.contains_key(&id) {
            return Err(StoreError::conflict(format!(
                "item '{id}' already exists in data bag '{bag}'"
            )));
        }
        items.insert(id, item.clone());
        Ok(())
    }

    fn delete_item(&self, bag: &str, item_id: &str) -> Result<(), StoreError> {
        let mut bags = self.write()?;
        let items = bags
            .get_mut(bag)
            .ok_or_else(|| StoreError::not_found(format!("data bag '{bag}' not found")))?;
        items.remove(item_id).map(|_| ()).ok_or_else(|| {
            StoreError::not_found(format!("item '{item_id}' not found in data bag '{bag}'"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_document;

    fn doc(text: &str) -> Document {
        parse_document(text).unwrap()
    }

    #[test]
    fn create_get_delete() {
        let store = MemoryStore::new();
        let item = doc(r#"{"id":"a","v":1}"#);
        store.create_item("bag", &item).unwrap();
        assert_eq!(store.item_count("bag"), Some(1));
        assert_eq!(store.get_item("bag", "a").unwrap(), item);

        store.delete_item("bag", "a").unwrap();
        assert!(store.get_item("bag", "a").unwrap_err().is_not_found());
        assert_eq!(store.item_count("bag"), Some(0));
    }

    #[test]
    fn unknown_bag_is_not_found() {
        let store = MemoryStore::new();
        assert!(store.get_item("nope", "a").unwrap_err().is_not_found());
        assert!(store.delete_item("nope", "a").unwrap_err().is_not_found());
        assert_eq!(store.item_count("nope"), None);
    }

    #[test]
    fn duplicate_create_conflicts() {
        let store = MemoryStore::new();
        store.create_item("bag", &doc(r#"{"id":"a"}"#)).unwrap();
        let err = store.create_item("bag", &doc(r#"{"id":"a","v":2}"#)).unwrap_err();
        assert_eq!(err.status, StoreError::CONFLICT);
        // The original item is untouched.
        assert_eq!(store.get_item("bag", "a").unwrap(), doc(r#"{"id":"a"}"#));
    }

    #[test]
    fn delete_twice_reports_not_found() {
        let store = MemoryStore::new();
        store.create_item("bag", &doc(r#"{"id":"a"}"#)).unwrap();
        store.delete_item("bag", "a").unwrap();
        assert!(store.delete_item("bag", "a").unwrap_err().is_not_found());
    }

    #[test]
    fn create_without_id_is_rejected() {
        let store = MemoryStore::new();
        let err = store.create_item("bag", &doc(r#"{"v":1}"#)).unwrap_err();
        assert_eq!(err.status, 400);
    }

    #[test]
    fn same_id_in_different_bags() {
        let store = MemoryStore::new();
        store.create_item("one", &doc(r#"{"id":"a","bag":1}"#)).unwrap();
        store.create_item("two", &doc(r#"{"id":"a","bag":2}"#)).unwrap();
        assert_eq!(store.get_item("one", "a").unwrap()["bag"], 1);
        assert_eq!(store.get_item("two", "a").unwrap()["bag"], 2);
    }
}
