//! [`Reconciler`]: item lifecycle on top of an [`ItemStore`].
//!
//! The reconciler is the only component that talks to the store. It runs
//! the encoder before writes and the decoder after reads, and maps a store
//! 404 on read to [`Fetched::Absent`] so that an item deleted out of band is
//! an ordinary state rather than a failure.
//!
//! ```text
//! ABSENT --create--> PRESENT --delete--> ABSENT
//! ```
//!
//! `fetch` only observes. No retries happen here; every store error other
//! than a 404 on read reaches the caller unchanged.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::codec::{self, CodecError, Document};
use crate::crypto::SchemeVersion;
use crate::store::{ItemStore, StoreError};

/// Errors returned by [`Reconciler`] operations.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of [`Reconciler::fetch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    /// The store has no such bag or item.
    Absent,
    /// The item exists; fields have been decrypted.
    Present(Document),
}

impl Fetched {
    pub fn exists(&self) -> bool {
        matches!(self, Fetched::Present(_))
    }

    pub fn into_document(self) -> Option<Document> {
        match self {
            Fetched::Absent => None,
            Fetched::Present(document) => Some(document),
        }
    }
}

/// Encrypting, absence-aware front end to an [`ItemStore`].
///
/// Holds no state besides the store handle; secrets are passed per call and
/// not retained.
#[derive(Debug, Clone)]
pub struct Reconciler<S> {
    store: S,
}

impl<S: ItemStore> Reconciler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read and decrypt an item.
    ///
    /// # Errors
    ///
    /// - [`ReconcileError::Store`] for any store error except 404.
    /// - [`ReconcileError::Codec`] if a field fails to decrypt.
    pub fn fetch(&self, bag: &str, item_id: &str, secret: &[u8]) -> Result<Fetched, ReconcileError> {
        let document = match self.store.get_item(bag, item_id) {
            Ok(document) => document,
            Err(e) if e.is_not_found() => {
                info!(bag = %bag, item_id = %item_id, "item not found; treating as absent");
                return Ok(Fetched::Absent);
            }
            Err(e) => {
                warn!(bag = %bag, item_id = %item_id, status = e.status, "item read failed");
                return Err(e.into());
            }
        };

        let decoded = codec::decode(document, secret)?;
        debug!(bag = %bag, item_id = %item_id, "item fetched");
        Ok(Fetched::Present(decoded))
    }

    /// Fetch an item and render it as normalised JSON text.
    ///
    /// Returns `None` when the item is absent.
    pub fn read_content_json(
        &self,
        bag: &str,
        item_id: &str,
        secret: &[u8],
    ) -> Result<Option<String>, ReconcileError> {
        Ok(self
            .fetch(bag, item_id, secret)?
            .into_document()
            .map(codec::render))
    }

    /// Encrypt `content_json` and create it in `bag`. Returns the item id.
    ///
    /// # Errors
    ///
    /// Encoder errors are returned before the store is contacted. Store
    /// rejections (for example 409 for a duplicate id) propagate unchanged and
    /// the item is not created.
    pub fn create(
        &self,
        bag: &str,
        content_json: &str,
        secret: &[u8],
        version: SchemeVersion,
    ) -> Result<String, ReconcileError> {
        let (item_id, document) = codec::encode(content_json, secret, version)?;
        self.store.create_item(bag, &document).map_err(|e| {
            warn!(bag = %bag, item_id = %item_id, status = e.status, "item create failed");
            e
        })?;
        info!(bag = %bag, item_id = %item_id, "item created");
        Ok(item_id)
    }

    /// Delete an item. Every store error, 404 included, is returned.
    pub fn delete(&self, bag: &str, item_id: &str) -> Result<(), ReconcileError> {
        self.store.delete_item(bag, item_id)?;
        info!(bag = %bag, item_id = %item_id, "item deleted");
        Ok(())
    }
}
