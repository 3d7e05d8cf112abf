//! Lifecycle Invariant Tests
//!
//! Tests for the document lifecycle:
//! - Save never overwrites
//! - Revisions advance on every write
//! - Stale revisions are rejected
//! - Deleted documents are not readable

use std::collections::HashSet;

use corm::store::StoreError;
use corm::{CallContext, MemoryStore, Orm, OrmError, ReadOptions, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Product {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "String::is_empty")]
    rev: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    price: u32,
}

corm::impl_document!(Product, id, rev);

fn product(id: &str, name: &str, price: u32) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price,
        ..Default::default()
    }
}

fn generation(rev: &str) -> u64 {
    rev.split('-').next().unwrap().parse().unwrap()
}

fn setup() -> (Orm<MemoryStore>, CallContext) {
    (Orm::new(MemoryStore::new()), CallContext::background())
}

// =============================================================================
// Full Lifecycle
// =============================================================================

/// Save, update, delete, then the document is gone.
#[test]
fn test_save_update_delete_read() {
    let (orm, ctx) = setup();

    let mut record = product("", "Foo", 10);
    let saved = orm.save(&ctx, &mut record).unwrap();
    assert!(!record.id.is_empty());
    assert_eq!(record.rev, saved.rev);

    record.price = 12;
    let updated = orm.update(&ctx, &mut record).unwrap();
    assert_eq!(updated.id, saved.id);
    assert!(generation(&updated.rev) > generation(&saved.rev));

    let (stored, row): (Product, Row) = orm.read(&ctx, &record.id, &ReadOptions::new()).unwrap();
    assert_eq!(stored, record);
    assert_eq!(row.rev, record.rev);

    orm.delete(&ctx, &record.id, None).unwrap();

    let err = orm
        .read::<Product>(&ctx, &record.id, &ReadOptions::new())
        .unwrap_err();
    assert!(matches!(err, OrmError::DocumentNotFound { ref id } if *id == record.id));
}

/// Save returns exactly what a later read reports.
#[test]
fn test_saved_identity_matches_read() {
    let (orm, ctx) = setup();
    let saved = orm.save(&ctx, &mut product("p-7", "Bar", 3)).unwrap();

    let mut record = Product::default();
    let row = orm
        .read_into(&ctx, "p-7", &mut record, &ReadOptions::new())
        .unwrap();
    assert_eq!(row.id, saved.id);
    assert_eq!(row.rev, saved.rev);
    assert_eq!(record.id, "p-7");
    assert_eq!(record.name, "Bar");
}

// =============================================================================
// Save
// =============================================================================

/// Save with an existing explicit id fails and leaves the stored document.
#[test]
fn test_save_never_overwrites() {
    let (orm, ctx) = setup();
    let first = orm.save(&ctx, &mut product("111-222-333", "Liya", 1)).unwrap();

    let err = orm
        .save(&ctx, &mut product("111-222-333", "Serkan", 2))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "doc.Id: 111-222-333 for `Product` document already created"
    );

    let (stored, row): (Product, Row) = orm.read(&ctx, "111-222-333", &ReadOptions::new()).unwrap();
    assert_eq!(stored.name, "Liya");
    assert_eq!(row.rev, first.rev);
}

/// Store-assigned ids are unique.
#[test]
fn test_auto_ids_unique() {
    let (orm, ctx) = setup();
    let ids: HashSet<String> = (0..100)
        .map(|i| orm.save(&ctx, &mut product("", "Item", i)).unwrap().id)
        .collect();
    assert_eq!(ids.len(), 100);
    assert_eq!(orm.store().len().unwrap(), 100);
}

/// A deleted id can be saved again.
#[test]
fn test_save_after_delete() {
    let (orm, ctx) = setup();
    let first = orm.save(&ctx, &mut product("p-1", "Foo", 1)).unwrap();
    let tombstone = orm.delete(&ctx, "p-1", Some(&first.rev)).unwrap();

    let again = orm.save(&ctx, &mut product("p-1", "Foo", 2)).unwrap();
    assert!(generation(&again.rev) > generation(&tombstone));
}

// =============================================================================
// Update
// =============================================================================

/// Update with neither id nor revision never reaches the store.
#[test]
fn test_update_without_identity_rejected() {
    let (orm, ctx) = setup();
    let err = orm.update(&ctx, &mut product("", "Foo", 1)).unwrap_err();
    assert!(matches!(err, OrmError::MissingIdOrRev));
    assert!(err.is_rejection());
    assert!(orm.store().is_empty().unwrap());
}

/// Update with only an id still gets revision checking from the store.
#[test]
fn test_update_without_rev_conflicts() {
    let (orm, ctx) = setup();
    orm.save(&ctx, &mut product("p-1", "Foo", 1)).unwrap();

    let err = orm.update(&ctx, &mut product("p-1", "Bar", 2)).unwrap_err();
    assert!(matches!(err, OrmError::RevisionConflict { .. }));

    let (stored, _): (Product, Row) = orm.read(&ctx, "p-1", &ReadOptions::new()).unwrap();
    assert_eq!(stored.name, "Foo");
}

/// Update with only a revision reaches the store, which rejects it.
#[test]
fn test_update_without_id_reaches_store() {
    let (orm, ctx) = setup();
    let mut record = Product {
        rev: "1-00000000000000000000000000000000".to_string(),
        ..product("", "Foo", 1)
    };
    let err = orm.update(&ctx, &mut record).unwrap_err();
    assert!(matches!(err, OrmError::Store(StoreError::BadRequest(_))));
}

/// Each successful update advances the revision generation.
#[test]
fn test_revisions_increase() {
    let (orm, ctx) = setup();
    let mut record = product("", "Foo", 0);
    let mut last = generation(&orm.save(&ctx, &mut record).unwrap().rev);

    for price in 1..5 {
        record.price = price;
        let rev = orm.update(&ctx, &mut record).unwrap().rev;
        assert!(generation(&rev) > last);
        last = generation(&rev);
    }
    assert_eq!(last, 5);
}

/// Updating with a superseded revision fails without changing the document.
#[test]
fn test_stale_update_conflicts() {
    let (orm, ctx) = setup();
    let mut alice = product("", "Foo", 1);
    orm.save(&ctx, &mut alice).unwrap();
    let mut bob = alice.clone();

    alice.price = 2;
    orm.update(&ctx, &mut alice).unwrap();

    bob.price = 3;
    let err = orm.update(&ctx, &mut bob).unwrap_err();
    assert!(err.is_retryable());

    let (stored, _): (Product, Row) = orm.read(&ctx, &alice.id, &ReadOptions::new()).unwrap();
    assert_eq!(stored.price, 2);

    // Refresh and retry
    let (mut fresh, _): (Product, Row) = orm.read(&ctx, &alice.id, &ReadOptions::new()).unwrap();
    fresh.price = 3;
    orm.update(&ctx, &mut fresh).unwrap();
}

// =============================================================================
// Delete
// =============================================================================

/// Delete with a stale revision fails and keeps the document.
#[test]
fn test_stale_delete_conflicts() {
    let (orm, ctx) = setup();
    let mut record = product("", "Foo", 1);
    let saved = orm.save(&ctx, &mut record).unwrap();
    orm.update(&ctx, &mut record).unwrap();

    let err = orm.delete(&ctx, &saved.id, Some(&saved.rev)).unwrap_err();
    assert!(matches!(err, OrmError::RevisionConflict { .. }));
    assert!(orm
        .read::<Product>(&ctx, &saved.id, &ReadOptions::new())
        .is_ok());
}

/// Deleting twice reports the document as missing.
#[test]
fn test_double_delete() {
    let (orm, ctx) = setup();
    let saved = orm.save(&ctx, &mut product("", "Foo", 1)).unwrap();
    orm.delete(&ctx, &saved.id, None).unwrap();

    assert!(matches!(
        orm.delete(&ctx, &saved.id, None),
        Err(OrmError::DocumentNotFound { .. })
    ));
}

// =============================================================================
// Read Options
// =============================================================================

/// Reading a specific revision only finds the current one.
#[test]
fn test_read_by_revision() {
    let (orm, ctx) = setup();
    let mut record = product("", "Foo", 1);
    let saved = orm.save(&ctx, &mut record).unwrap();
    let updated = orm.update(&ctx, &mut record).unwrap();

    let current = ReadOptions::new().with("rev", updated.rev.as_str());
    assert!(orm.read::<Product>(&ctx, &saved.id, &current).is_ok());

    let old = ReadOptions::new().with("rev", saved.rev.as_str());
    assert!(matches!(
        orm.read::<Product>(&ctx, &saved.id, &old),
        Err(OrmError::DocumentNotFound { .. })
    ));
}

/// An expired deadline is reported as such, not as a missing document.
#[test]
fn test_deadline_surfaces() {
    let (orm, _) = setup();
    let ctx = CallContext::background().with_timeout(std::time::Duration::ZERO);
    std::thread::sleep(std::time::Duration::from_millis(1));

    let err = orm
        .read::<Product>(&ctx, "any", &ReadOptions::new())
        .unwrap_err();
    assert!(matches!(err, OrmError::Store(StoreError::DeadlineExceeded)));
}
