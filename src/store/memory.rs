//! In-memory document store
//!
//! Follows CouchDB write semantics:
//! - a `put` on a live document must carry its current `_rev`
//! - a `put` on an absent id must not carry a `_rev`
//! - a deleted document leaves a tombstone; re-creating it needs no `_rev`
//! - `get` on a tombstone reports not found
//!
//! Clones share state, so one store can back several mappers and threads.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::{Map, Value};
use uuid::Uuid;

use super::context::CallContext;
use super::errors::{StoreError, StoreResult};
use super::options::ReadOptions;
use super::revision::Revision;
use super::{DocumentStore, Row};
use crate::document::{ID_KEY, REV_KEY};

/// Stored state of one id
#[derive(Debug, Clone)]
struct Entry {
    rev: Revision,
    /// Body without `_id`/`_rev`; `None` for a tombstone
    body: Option<Map<String, Value>>,
}

/// Thread-safe in-memory document store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-deleted) documents
    pub fn len(&self) -> StoreResult<usize> {
        let entries = self.read_entries()?;
        Ok(entries.values().filter(|e| e.body.is_some()).count())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    fn read_entries(
        &self,
    ) -> StoreResult<std::sync::RwLockReadGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .read()
            .map_err(|_| StoreError::Internal("store lock poisoned".to_string()))
    }

    fn write_entries(
        &self,
    ) -> StoreResult<std::sync::RwLockWriteGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .write()
            .map_err(|_| StoreError::Internal("store lock poisoned".to_string()))
    }

    /// Split a request body into its parsed `_rev` and the fields to store
    fn split_body(doc: Value) -> StoreResult<(Option<Revision>, Map<String, Value>)> {
        let mut body = match doc {
            Value::Object(body) => body,
            _ => {
                return Err(StoreError::BadRequest(
                    "document body must be a JSON object".to_string(),
                ))
            }
        };

        body.remove(ID_KEY);
        let rev = match body.remove(REV_KEY) {
            None | Some(Value::Null) => None,
            Some(Value::String(rev)) if rev.is_empty() => None,
            Some(Value::String(rev)) => Some(rev.parse()?),
            Some(_) => {
                return Err(StoreError::BadRequest(
                    "document _rev must be a string".to_string(),
                ))
            }
        };

        Ok((rev, body))
    }

    /// Insert or replace under the write lock; the revision check and the
    /// write are one critical section.
    fn write_doc(&self, id: &str, doc: Value) -> StoreResult<String> {
        let (supplied_rev, body) = Self::split_body(doc)?;
        let body_value = Value::Object(body.clone());

        let mut entries = self.write_entries()?;
        let next = match (entries.get(id), supplied_rev) {
            // Fresh id
            (None, None) => Revision::initial(&body_value),
            (None, Some(_)) => return Err(StoreError::Conflict { id: id.to_string() }),

            // Live documents and tombstones: a supplied revision must match
            (Some(entry), Some(rev)) => {
                if entry.rev != rev {
                    return Err(StoreError::Conflict { id: id.to_string() });
                }
                entry.rev.next(&body_value)
            }
            (Some(entry), None) if entry.body.is_some() => {
                return Err(StoreError::Conflict { id: id.to_string() })
            }
            (Some(entry), None) => entry.rev.next(&body_value),
        };

        let rev = next.to_string();
        entries.insert(
            id.to_string(),
            Entry {
                rev: next,
                body: Some(body),
            },
        );
        Ok(rev)
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, ctx: &CallContext, id: &str, options: &ReadOptions) -> StoreResult<Row> {
        ctx.check()?;
        let not_found = || StoreError::NotFound { id: id.to_string() };

        let entries = self.read_entries()?;
        let entry = entries.get(id).ok_or_else(not_found)?;
        let body = entry.body.as_ref().ok_or_else(not_found)?;
        let rev = entry.rev.to_string();

        // Only the current revision is retained
        if let Some(wanted) = options.get("rev").and_then(Value::as_str) {
            if wanted != rev {
                return Err(not_found());
            }
        }

        let mut doc = body.clone();
        doc.insert(ID_KEY.to_string(), Value::String(id.to_string()));
        doc.insert(REV_KEY.to_string(), Value::String(rev.clone()));

        Ok(Row {
            id: id.to_string(),
            rev,
            doc: Value::Object(doc),
        })
    }

    fn put(&self, ctx: &CallContext, id: &str, doc: Value) -> StoreResult<String> {
        ctx.check()?;
        if id.is_empty() {
            return Err(StoreError::BadRequest(
                "document id must not be empty".to_string(),
            ));
        }
        self.write_doc(id, doc)
    }

    fn create_with_auto_id(&self, ctx: &CallContext, doc: Value) -> StoreResult<(String, String)> {
        ctx.check()?;
        let id = Uuid::new_v4().simple().to_string();
        let rev = self.write_doc(&id, doc)?;
        Ok((id, rev))
    }

    fn delete(&self, ctx: &CallContext, id: &str, rev: &str) -> StoreResult<String> {
        ctx.check()?;

        let mut entries = self.write_entries()?;
        let entry = match entries.get_mut(id) {
            Some(entry) if entry.body.is_some() => entry,
            _ => return Err(StoreError::NotFound { id: id.to_string() }),
        };
        if entry.rev != rev.parse::<Revision>()? {
            return Err(StoreError::Conflict { id: id.to_string() });
        }

        entry.rev = entry.rev.tombstone();
        entry.body = None;
        Ok(entry.rev.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> CallContext {
        CallContext::background()
    }

    #[test]
    fn test_put_then_get() {
        let store = MemoryStore::new();
        let rev = store.put(&ctx(), "a", json!({"name": "Foo"})).unwrap();
        assert!(rev.starts_with("1-"));

        let row = store.get(&ctx(), "a", &ReadOptions::new()).unwrap();
        assert_eq!(row.id, "a");
        assert_eq!(row.rev, rev);
        assert_eq!(row.doc["_id"], "a");
        assert_eq!(row.doc["_rev"], json!(rev));
        assert_eq!(row.doc["name"], "Foo");
    }

    #[test]
    fn test_get_missing() {
        let store = MemoryStore::new();
        let err = store.get(&ctx(), "nope", &ReadOptions::new()).unwrap_err();
        assert_eq!(err, StoreError::NotFound { id: "nope".into() });
    }

    #[test]
    fn test_put_requires_current_rev() {
        let store = MemoryStore::new();
        let rev1 = store.put(&ctx(), "a", json!({"n": 1})).unwrap();

        // No rev on a live document
        let err = store.put(&ctx(), "a", json!({"n": 2})).unwrap_err();
        assert_eq!(err, StoreError::Conflict { id: "a".into() });

        let rev2 = store.put(&ctx(), "a", json!({"_rev": rev1, "n": 2})).unwrap();
        assert!(rev2.starts_with("2-"));

        // Stale rev
        let err = store
            .put(&ctx(), "a", json!({"_rev": rev1, "n": 3}))
            .unwrap_err();
        assert_eq!(err, StoreError::Conflict { id: "a".into() });
    }

    #[test]
    fn test_put_with_rev_on_absent_id_conflicts() {
        let store = MemoryStore::new();
        let err = store
            .put(&ctx(), "a", json!({"_rev": "1-aa", "n": 1}))
            .unwrap_err();
        assert_eq!(err, StoreError::Conflict { id: "a".into() });
    }

    #[test]
    fn test_malformed_rev_is_bad_request() {
        let store = MemoryStore::new();
        let rev1 = store.put(&ctx(), "a", json!({"n": 1})).unwrap();

        for bad in ["latest", "0-aa", "1-zz"] {
            assert!(matches!(
                store.put(&ctx(), "a", json!({"_rev": bad, "n": 2})),
                Err(StoreError::BadRequest(_))
            ));
            assert!(matches!(
                store.delete(&ctx(), "a", bad),
                Err(StoreError::BadRequest(_))
            ));
        }
        let row = store.get(&ctx(), "a", &ReadOptions::new()).unwrap();
        assert_eq!(row.rev, rev1);
    }

    #[test]
    fn test_empty_rev_treated_as_absent() {
        let store = MemoryStore::new();
        assert!(store.put(&ctx(), "a", json!({"_rev": "", "n": 1})).is_ok());
    }

    #[test]
    fn test_put_rejects_bad_requests() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.put(&ctx(), "", json!({})),
            Err(StoreError::BadRequest(_))
        ));
        assert!(matches!(
            store.put(&ctx(), "a", json!("text")),
            Err(StoreError::BadRequest(_))
        ));
        assert!(matches!(
            store.put(&ctx(), "a", json!({"_rev": 5})),
            Err(StoreError::BadRequest(_))
        ));
    }

    #[test]
    fn test_auto_ids_are_unique() {
        let store = MemoryStore::new();
        let (id1, rev1) = store.create_with_auto_id(&ctx(), json!({"n": 1})).unwrap();
        let (id2, _) = store.create_with_auto_id(&ctx(), json!({"n": 1})).unwrap();
        assert_eq!(id1.len(), 32);
        assert_ne!(id1, id2);
        assert!(rev1.starts_with("1-"));
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn test_delete_leaves_tombstone() {
        let store = MemoryStore::new();
        let rev1 = store.put(&ctx(), "a", json!({"n": 1})).unwrap();
        let tomb = store.delete(&ctx(), "a", &rev1).unwrap();
        assert!(tomb.starts_with("2-"));
        assert!(store.is_empty().unwrap());

        assert!(matches!(
            store.get(&ctx(), "a", &ReadOptions::new()),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete(&ctx(), "a", &tomb),
            Err(StoreError::NotFound { .. })
        ));

        // Re-create over the tombstone continues the lineage
        let rev3 = store.put(&ctx(), "a", json!({"n": 2})).unwrap();
        assert!(rev3.starts_with("3-"));
    }

    #[test]
    fn test_delete_stale_rev() {
        let store = MemoryStore::new();
        let rev1 = store.put(&ctx(), "a", json!({"n": 1})).unwrap();
        store.put(&ctx(), "a", json!({"_rev": rev1, "n": 2})).unwrap();
        let err = store.delete(&ctx(), "a", &rev1).unwrap_err();
        assert_eq!(err, StoreError::Conflict { id: "a".into() });
    }

    #[test]
    fn test_rev_option() {
        let store = MemoryStore::new();
        let rev1 = store.put(&ctx(), "a", json!({"n": 1})).unwrap();
        let current = ReadOptions::new().with("rev", rev1.clone());
        assert!(store.get(&ctx(), "a", &current).is_ok());

        store.put(&ctx(), "a", json!({"_rev": rev1, "n": 2})).unwrap();
        assert!(store.get(&ctx(), "a", &current).is_err());

        // Unknown keys are ignored
        let other = ReadOptions::new().with("a", "b");
        assert!(store.get(&ctx(), "a", &other).is_ok());
    }

    #[test]
    fn test_cancelled_context() {
        let store = MemoryStore::new();
        let ctx = CallContext::background();
        ctx.cancel();
        assert_eq!(
            store.put(&ctx, "a", json!({})).unwrap_err(),
            StoreError::Cancelled
        );
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_clones_share_state() {
        let store = MemoryStore::new();
        let clone = store.clone();
        store.put(&ctx(), "a", json!({})).unwrap();
        assert!(clone.get(&ctx(), "a", &ReadOptions::new()).is_ok());
    }
}
