//! Store contract tests, run against every store implementation.

mod concurrency;

use coffeehouse::{CoffeeStore, InMemoryCoffeeStore, StoreError};

pub fn stores() -> Vec<(&'static str, Box<dyn CoffeeStore>)> {
    let mut stores: Vec<(&'static str, Box<dyn CoffeeStore>)> =
        vec![("memory", Box::new(InMemoryCoffeeStore::new()))];
    #[cfg(feature = "sqlite")]
    stores.push((
        "sqlite",
        Box::new(coffeehouse::SqliteCoffeeStore::open_in_memory().unwrap()),
    ));
    stores
}

#[test]
fn ids_strictly_increase() {
    for (label, store) in stores() {
        let mut last = 0;
        for i in 0..5 {
            let created = store.create(&format!("Coffee {}", i)).unwrap();
            assert!(created.id > last, "{}: id {} after {}", label, created.id, last);
            assert_eq!(created.version, 1, "{}", label);
            last = created.id;
        }
    }
}

#[test]
fn version_counts_successful_updates() {
    for (label, store) in stores() {
        let created = store.create("Espresso").unwrap();

        let mut version = created.version;
        for n in 1..=4u64 {
            let updated = store
                .update(created.id, &format!("Espresso v{}", n + 1), version)
                .unwrap();
            assert_eq!(updated.version, 1 + n, "{}", label);
            version = updated.version;
        }

        // Rejected attempts do not count.
        let err = store.update(created.id, "stale", 1).unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { .. }), "{}", label);
        assert_eq!(store.get(created.id).unwrap().version, 5, "{}", label);
    }
}

#[test]
fn mismatched_version_is_rejected_idempotently() {
    for (label, store) in stores() {
        let created = store.create("Macchiato").unwrap();
        store.update(created.id, "Macchiato v2", 1).unwrap();
        let before = store.get(created.id).unwrap();

        for stale in [1, 3, 100] {
            let err = store.update(created.id, "nope", stale).unwrap_err();
            assert_eq!(
                err,
                StoreError::VersionConflict {
                    id: created.id,
                    expected: stale,
                    actual: 2,
                },
                "{}",
                label
            );
            assert_eq!(store.get(created.id).unwrap(), before, "{}", label);
        }
    }
}

#[test]
fn deleted_records_stay_gone() {
    for (label, store) in stores() {
        let created = store.create("Lungo").unwrap();
        store.delete(created.id).unwrap();

        let id = created.id;
        assert_eq!(store.get(id), Err(StoreError::NotFound { id }), "{}", label);
        assert_eq!(
            store.update(id, "Lungo v2", 1),
            Err(StoreError::NotFound { id }),
            "{}",
            label
        );
        assert!(store.list_all().unwrap().is_empty(), "{}", label);

        let next = store.create("Doppio").unwrap();
        assert!(next.id > id, "{}: id {} reused", label, id);
    }
}

#[test]
fn invalid_create_leaves_collection_unchanged() {
    for (label, store) in stores() {
        store.create("Affogato").unwrap();
        let before = store.count().unwrap();

        assert!(
            matches!(store.create(""), Err(StoreError::InvalidInput(_))),
            "{}",
            label
        );
        assert_eq!(store.count().unwrap(), before, "{}", label);
    }
}

#[test]
fn list_is_stable_for_unchanged_state() {
    for (label, store) in stores() {
        for name in ["a", "b", "c"] {
            store.create(name).unwrap();
        }
        let first = store.list_all().unwrap();
        let second = store.list_all().unwrap();
        assert_eq!(first, second, "{}", label);
        let ids: Vec<u64> = first.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3], "{}", label);
    }
}
