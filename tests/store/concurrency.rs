use std::sync::{Arc, Barrier};
use std::thread;

use coffeehouse::{CoffeeStore, InMemoryCoffeeStore, StoreError};

fn racing_updates<S: CoffeeStore + 'static>(store: Arc<S>, contenders: usize) {
    let created = store.create("Contended").unwrap();
    let (id, version) = (created.id, created.version);
    let barrier = Arc::new(Barrier::new(contenders));

    let handles: Vec<_> = (0..contenders)
        .map(|n| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.update(id, &format!("writer {}", n), version)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
    assert_eq!(winners.len(), 1, "exactly one writer may win: {:?}", results);

    for result in &results {
        if let Err(err) = result {
            assert_eq!(
                *err,
                StoreError::VersionConflict {
                    id: created.id,
                    expected: 1,
                    actual: 2,
                }
            );
        }
    }

    let stored = store.get(created.id).unwrap();
    assert_eq!(stored.version, 2);
    assert_eq!(Some(&stored), winners[0].as_ref().ok());
}

#[test]
fn in_memory_same_version_race_has_one_winner() {
    racing_updates(Arc::new(InMemoryCoffeeStore::new()), 8);
}

#[cfg(feature = "sqlite")]
#[test]
fn sqlite_same_version_race_has_one_winner() {
    racing_updates(
        Arc::new(coffeehouse::SqliteCoffeeStore::open_in_memory().unwrap()),
        8,
    );
}

#[test]
fn chained_updates_from_many_threads_never_lose_a_write() {
    let store = Arc::new(InMemoryCoffeeStore::new());
    let id = store.create("Counter").unwrap().id;
    let per_thread = 25;
    let threads = 4;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut applied = 0;
                while applied < per_thread {
                    let current = store.get(id).unwrap();
                    match store.update(id, "Counter", current.version) {
                        Ok(_) => applied += 1,
                        Err(StoreError::VersionConflict { .. }) => continue,
                        Err(e) => panic!("unexpected error: {}", e),
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let expected = 1 + (per_thread * threads) as u64;
    assert_eq!(store.get(id).unwrap().version, expected);
}

#[test]
fn updates_on_different_ids_do_not_conflict() {
    let store = Arc::new(InMemoryCoffeeStore::new());
    let ids: Vec<u64> = (0..4)
        .map(|n| store.create(&format!("Coffee {}", n)).unwrap().id)
        .collect();
    let barrier = Arc::new(Barrier::new(ids.len()));

    let handles: Vec<_> = ids
        .iter()
        .map(|&id| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.update(id, "renamed", 1)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap().version, 2);
    }
}
