//! Document lifecycle reconciliation
//!
//! `Orm` maps caller records onto store documents for Save, Read, Update
//! and Delete. It keeps no per-document state: each call extracts a fresh
//! descriptor, checks the operation's preconditions, makes the store call
//! and maps the result back onto the record.
//!
//! # Save race
//!
//! Save with an explicit id reads the store first and writes only when the
//! id is absent. Check and write are two calls, so two concurrent Saves of
//! the same id can both pass the check. The store's revision check is the
//! backstop: `MemoryStore` rejects a revision-less `put` on a live document
//! with a conflict, so the second writer fails instead of overwriting.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::config::{OrmConfig, UpdatePolicy};
use super::errors::{OrmError, OrmResult};
use crate::document::{extract, Descriptor, Document, ExtractMode, ID_KEY, REV_KEY};
use crate::observability::{log_event, Event, Logger, MetricsSnapshot, OrmMetrics};
use crate::store::{CallContext, DocumentStore, ReadOptions, Row, StoreError};

/// Identity of a stored document revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRef {
    pub id: String,
    pub rev: String,
}

/// Object-document mapper over a document store
#[derive(Debug, Clone)]
pub struct Orm<S: DocumentStore> {
    store: S,
    extract_mode: ExtractMode,
    update_policy: UpdatePolicy,
    logger: Logger,
    metrics: Arc<OrmMetrics>,
}

impl<S: DocumentStore> Orm<S> {
    /// Wrap a store with default settings
    pub fn new(store: S) -> Self {
        Self {
            store,
            extract_mode: ExtractMode::default(),
            update_policy: UpdatePolicy::default(),
            logger: Logger::default(),
            metrics: Arc::new(OrmMetrics::new()),
        }
    }

    /// Wrap a store with the settings of `config`
    pub fn with_config(store: S, config: &OrmConfig) -> Self {
        Self {
            store,
            extract_mode: config.extract_mode,
            update_policy: config.update_policy,
            logger: Logger::new(config.log_level),
            metrics: Arc::new(OrmMetrics::new()),
        }
    }

    /// Replace the logger, keeping its threshold and sink as given
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn extract_mode(&self) -> ExtractMode {
        self.extract_mode
    }

    pub fn update_policy(&self) -> UpdatePolicy {
        self.update_policy
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Save a new document.
    ///
    /// With an empty id the store assigns one. With an explicit id the
    /// document must not exist yet; Save never overwrites, that is
    /// Update's job. On success the id and revision are written back onto
    /// `record`.
    pub fn save<D: Document>(&self, ctx: &CallContext, record: &mut D) -> OrmResult<DocumentRef> {
        let result = self.try_save(ctx, record);
        self.observe(result, OrmMetrics::increment_saves)
    }

    fn try_save<D: Document>(&self, ctx: &CallContext, record: &mut D) -> OrmResult<DocumentRef> {
        let descriptor = self.descriptor(record)?;
        let body = Self::encode(record, &descriptor)?;

        let saved = if descriptor.id.is_empty() {
            let (id, rev) = self.store.create_with_auto_id(ctx, body)?;
            DocumentRef { id, rev }
        } else {
            match self.store.get(ctx, &descriptor.id, &ReadOptions::new()) {
                Ok(_) => {
                    return Err(OrmError::DuplicateId {
                        id: descriptor.id,
                        type_name: descriptor.type_name,
                    })
                }
                Err(StoreError::NotFound { .. }) => {}
                Err(err) => return Err(err.into()),
            }

            let rev = self.store.put(ctx, &descriptor.id, body)?;
            DocumentRef {
                id: descriptor.id.clone(),
                rev,
            }
        };

        record.set_id(saved.id.clone());
        record.set_rev(saved.rev.clone());
        log_event(
            &self.logger,
            Event::DocumentCreated,
            &[
                ("id", saved.id.as_str()),
                ("rev", saved.rev.as_str()),
                ("type", descriptor.type_name.as_str()),
            ],
        );
        Ok(saved)
    }

    /// Read a document into `record`, returning the raw row.
    ///
    /// `options` is forwarded to the store untouched. Any store failure
    /// other than the caller's own cancellation or deadline is reported as
    /// `DocumentNotFound`.
    pub fn read_into<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        id: &str,
        record: &mut T,
        options: &ReadOptions,
    ) -> OrmResult<Row> {
        let result = self.fetch(ctx, id, options).and_then(|row| {
            *record = row.scan_doc().map_err(|source| OrmError::Decode {
                id: id.to_string(),
                source,
            })?;
            log_event(
                &self.logger,
                Event::DocumentRead,
                &[("id", row.id.as_str()), ("rev", row.rev.as_str())],
            );
            Ok(row)
        });
        self.observe(result, OrmMetrics::increment_reads)
    }

    /// Read a document as a new `T`
    pub fn read<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        id: &str,
        options: &ReadOptions,
    ) -> OrmResult<(T, Row)> {
        let result = self.fetch(ctx, id, options).and_then(|row| {
            let record = row.scan_doc().map_err(|source| OrmError::Decode {
                id: id.to_string(),
                source,
            })?;
            log_event(
                &self.logger,
                Event::DocumentRead,
                &[("id", row.id.as_str()), ("rev", row.rev.as_str())],
            );
            Ok((record, row))
        });
        self.observe(result, OrmMetrics::increment_reads)
    }

    /// Write a new version of an existing document.
    ///
    /// The store checks the record's revision; a stale one fails with
    /// `RevisionConflict`. On success the new revision is written back onto
    /// `record`.
    pub fn update<D: Document>(&self, ctx: &CallContext, record: &mut D) -> OrmResult<DocumentRef> {
        let result = self.try_update(ctx, record);
        self.observe(result, OrmMetrics::increment_updates)
    }

    fn try_update<D: Document>(&self, ctx: &CallContext, record: &mut D) -> OrmResult<DocumentRef> {
        let descriptor = self.descriptor(record)?;

        let rejected = match self.update_policy {
            UpdatePolicy::AllowPartial => descriptor.id.is_empty() && descriptor.rev.is_empty(),
            UpdatePolicy::RequireIdAndRev => descriptor.id.is_empty() || descriptor.rev.is_empty(),
        };
        if rejected {
            return Err(OrmError::MissingIdOrRev);
        }

        let body = Self::encode(record, &descriptor)?;
        let rev = self
            .store
            .put(ctx, &descriptor.id, body)
            .map_err(|err| match err {
                StoreError::Conflict { id } => OrmError::RevisionConflict { id },
                other => other.into(),
            })?;

        record.set_rev(rev.clone());
        log_event(
            &self.logger,
            Event::DocumentUpdated,
            &[
                ("id", descriptor.id.as_str()),
                ("rev", rev.as_str()),
                ("type", descriptor.type_name.as_str()),
            ],
        );
        Ok(DocumentRef {
            id: descriptor.id,
            rev,
        })
    }

    /// Delete a document, returning the tombstone revision.
    ///
    /// Without `rev` the current revision is read first. With `rev` it is
    /// used as-is and a stale value fails with `RevisionConflict`.
    pub fn delete(&self, ctx: &CallContext, id: &str, rev: Option<&str>) -> OrmResult<String> {
        let result = self.try_delete(ctx, id, rev);
        self.observe(result, OrmMetrics::increment_deletes)
    }

    fn try_delete(&self, ctx: &CallContext, id: &str, rev: Option<&str>) -> OrmResult<String> {
        if id.is_empty() {
            return Err(OrmError::MissingId);
        }

        let rev = match rev {
            Some(rev) => rev.to_string(),
            None => self.fetch(ctx, id, &ReadOptions::new())?.rev,
        };

        let tombstone = self
            .store
            .delete(ctx, id, &rev)
            .map_err(|err| match err {
                StoreError::Conflict { id } => OrmError::RevisionConflict { id },
                StoreError::NotFound { id } => OrmError::DocumentNotFound { id },
                other => other.into(),
            })?;

        log_event(
            &self.logger,
            Event::DocumentDeleted,
            &[("id", id), ("rev", tombstone.as_str())],
        );
        Ok(tombstone)
    }

    /// Extract the descriptor and check the type discriminator
    fn descriptor<D: Document + ?Sized>(&self, record: &D) -> OrmResult<Descriptor> {
        let descriptor = extract(record, self.extract_mode)?;
        if descriptor.type_mismatch() {
            return Err(OrmError::TypeMismatch {
                declared: descriptor.declared_type,
                type_name: descriptor.type_name,
            });
        }
        Ok(descriptor)
    }

    /// Serialize a record, normalizing `_id`/`_rev` to the descriptor.
    ///
    /// Empty values are dropped so the store sees "no revision" rather than
    /// an empty one.
    fn encode<D: Document>(record: &D, descriptor: &Descriptor) -> OrmResult<Value> {
        let mut body = serde_json::to_value(record).map_err(OrmError::Encode)?;
        if let Value::Object(fields) = &mut body {
            for (key, value) in [(ID_KEY, &descriptor.id), (REV_KEY, &descriptor.rev)] {
                if value.is_empty() {
                    fields.remove(key);
                } else {
                    fields.insert(key.to_string(), Value::String(value.clone()));
                }
            }
        }
        Ok(body)
    }

    fn fetch(&self, ctx: &CallContext, id: &str, options: &ReadOptions) -> OrmResult<Row> {
        if id.is_empty() {
            return Err(OrmError::MissingId);
        }
        self.store.get(ctx, id, options).map_err(|err| {
            if err.is_context_error() {
                err.into()
            } else {
                OrmError::DocumentNotFound { id: id.to_string() }
            }
        })
    }

    fn observe<T>(&self, result: OrmResult<T>, on_success: fn(&OrmMetrics)) -> OrmResult<T> {
        match &result {
            Ok(_) => on_success(&self.metrics),
            Err(OrmError::RevisionConflict { .. }) => self.metrics.increment_conflicts(),
            Err(err) if err.is_rejection() => self.metrics.increment_rejected(),
            Err(_) => {}
        }
        result
    }
}
