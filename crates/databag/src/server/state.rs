//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::crypto::{SchemeVersion, Secret};
use crate::reconciler::Reconciler;
use crate::store::{ItemStore, MemoryStore};

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable so that Axum can clone the state for each
/// request without copying the store or the secret.
#[derive(Clone)]
pub struct AppState {
    /// Reconciler over the configured item store.
    pub reconciler: Reconciler<Arc<dyn ItemStore>>,
    /// Shared secret for item encryption; empty disables encryption.
    pub secret: Arc<Secret>,
    /// Scheme version used for new encryptions.
    pub encryption_version: SchemeVersion,
}

impl AppState {
    /// Create a new [`AppState`] over `store`.
    pub fn new(store: Arc<dyn ItemStore>, secret: Secret, encryption_version: SchemeVersion) -> Self {
        Self {
            reconciler: Reconciler::new(store),
            secret: Arc::new(secret),
            encryption_version,
        }
    }
}

impl Default for AppState {
    /// Creates an [`AppState`] over an empty [`MemoryStore`] with encryption
    /// disabled, suitable for tests.
    fn default() -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            Secret::default(),
            SchemeVersion::LATEST,
        )
    }
}
