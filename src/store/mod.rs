//! Document store boundary
//!
//! The mapper talks to the database through four primitives:
//! - `get`: fetch the live document and its revision
//! - `put`: write a document under a known id, returning the new revision
//! - `create_with_auto_id`: write a document under a store-generated id
//! - `delete`: replace the live document with a tombstone
//!
//! Documents cross this boundary as JSON objects using the CouchDB reserved
//! keys `_id` and `_rev`. A `put` body carrying `_rev` must name the current
//! revision; that check is the store's, not the mapper's.
//!
//! `MemoryStore` is the bundled driver. `Client` selects a driver from
//! configuration and hands out databases by name.

mod client;
mod context;
mod errors;
mod memory;
mod options;
mod revision;

pub use client::{Client, ClientConfig, MEMORY_DRIVER};
pub use context::CallContext;
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use options::ReadOptions;
pub use revision::Revision;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A document snapshot returned by `get`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub id: String,
    pub rev: String,
    /// Full document, `_id` and `_rev` included
    pub doc: Value,
}

impl Row {
    /// Deserialize the document into a caller type
    pub fn scan_doc<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(&self.doc)
    }
}

/// The four primitives of a CouchDB-style document store
pub trait DocumentStore: Send + Sync {
    /// Fetch the live document under `id`
    fn get(&self, ctx: &CallContext, id: &str, options: &ReadOptions) -> StoreResult<Row>;

    /// Write `doc` under `id`, returning the new revision
    fn put(&self, ctx: &CallContext, id: &str, doc: Value) -> StoreResult<String>;

    /// Write `doc` under a store-generated id, returning `(id, rev)`
    fn create_with_auto_id(&self, ctx: &CallContext, doc: Value) -> StoreResult<(String, String)>;

    /// Delete the document at revision `rev`, returning the tombstone revision
    fn delete(&self, ctx: &CallContext, id: &str, rev: &str) -> StoreResult<String>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<S> {
    fn get(&self, ctx: &CallContext, id: &str, options: &ReadOptions) -> StoreResult<Row> {
        (**self).get(ctx, id, options)
    }

    fn put(&self, ctx: &CallContext, id: &str, doc: Value) -> StoreResult<String> {
        (**self).put(ctx, id, doc)
    }

    fn create_with_auto_id(&self, ctx: &CallContext, doc: Value) -> StoreResult<(String, String)> {
        (**self).create_with_auto_id(ctx, doc)
    }

    fn delete(&self, ctx: &CallContext, id: &str, rev: &str) -> StoreResult<String> {
        (**self).delete(ctx, id, rev)
    }
}
