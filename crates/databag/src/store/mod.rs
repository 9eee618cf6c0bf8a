//! The item store: where data bag items live.
//!
//! The store is an external collaborator. This crate only needs the three
//! operations of [`ItemStore`]; transport, authentication, timeouts and
//! retries are the implementation's business.

pub mod memory;

pub use memory::MemoryStore;

use std::sync::Arc;

use thiserror::Error;

use crate::codec::Document;

/// A structured error reported by the item store.
///
/// `status` follows HTTP semantics; 404 is the only status the reconciler
/// treats specially.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("store returned {status}: {message}")]
pub struct StoreError {
    pub status: u16,
    pub message: String,
}

impl StoreError {
    pub const NOT_FOUND: u16 = 404;
    pub const CONFLICT: u16 = 409;

    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Self::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(Self::CONFLICT, message)
    }

    /// Whether the store reported that the bag or item does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status == Self::NOT_FOUND
    }
}

/// Storage interface for data bag items.
#[cfg_attr(test, mockall::automock)]
pub trait ItemStore: Send + Sync {
    /// Read the stored document for `item_id` in `bag`.
    fn get_item(&self, bag: &str, item_id: &str) -> Result<Document, StoreError>;

    /// Store a new item. The item's key is the document's `id`.
    fn create_item(&self, bag: &str, item: &Document) -> Result<(), StoreError>;

    /// Remove `item_id` from `bag`.
    fn delete_item(&self, bag: &str, item_id: &str) -> Result<(), StoreError>;
}

impl<T> ItemStore for Arc<T>
where
    T: ItemStore + ?Sized,
{
    fn get_item(&self, bag: &str, item_id: &str) -> Result<Document, StoreError> {
        (**self).get_item(bag, item_id)
    }

    fn create_item(&self, bag: &str, item: &Document) -> Result<(), StoreError> {
        (**self).create_item(bag, item)
    }

    fn delete_item(&self, bag: &str, item_id: &str) -> Result<(), StoreError> {
        (**self).delete_item(bag, item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_detected_by_status() {
        assert!(StoreError::not_found("gone").is_not_found());
        assert!(StoreError::new(404, "x").is_not_found());
        assert!(!StoreError::conflict("dup").is_not_found());
        assert!(!StoreError::new(500, "boom").is_not_found());
    }

    #[test]
    fn display_includes_status_and_message() {
        let e = StoreError::new(503, "chef server unavailable");
        let s = e.to_string();
        assert!(s.contains("503"));
        assert!(s.contains("chef server unavailable"));
    }

    #[test]
    fn arc_dyn_store_delegates() {
        let store: Arc<dyn ItemStore> = Arc::new(MemoryStore::new());
        let err = store.get_item("bag", "missing").unwrap_err();
        assert!(err.is_not_found());
    }
}
