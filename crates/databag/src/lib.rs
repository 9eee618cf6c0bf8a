//! Encrypted data bag items.
//!
//! - [`codec`] turns a user-supplied JSON document into an item whose fields
//!   are individually encrypted, and back.
//! - [`reconciler`] creates, reads and deletes items in an [`store::ItemStore`],
//!   treating a missing item as absence rather than failure.
//! - [`server`] exposes both over HTTP for the `databag-svc` binary.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod reconciler;
pub mod server;
pub mod store;
pub mod telemetry;

pub use codec::{decode, encode, CodecError, Document};
pub use crypto::{SchemeVersion, Secret};
pub use reconciler::{Fetched, ReconcileError, Reconciler};
pub use store::{ItemStore, MemoryStore, StoreError};
