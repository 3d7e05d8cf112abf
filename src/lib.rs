//! corm - a thin object-document mapper for CouchDB-style document stores
//!
//! Records implement [`document::Document`]; [`orm::Orm`] validates them,
//! maps them onto store documents and keeps them consistent across
//! create, read, update and delete under optimistic concurrency.

pub mod cli;
pub mod document;
pub mod observability;
pub mod orm;
pub mod store;

pub use document::{Document, DynamicDocument, ExtractMode};
pub use orm::{
    connect, connect_with_logger, DocumentRef, Orm, OrmConfig, OrmError, OrmResult, UpdatePolicy,
};
pub use store::{CallContext, DocumentStore, MemoryStore, ReadOptions, Row};
