use csv_search::{factory, parse_lines, search, Row, Table, TableStore};
use std::io::{BufRead, Cursor};
use std::sync::Arc;
use std::thread;

fn table(text: &str) -> Table<Row> {
    parse_lines(Cursor::new(text.to_string()).lines(), factory::identity).unwrap()
}

#[test]
fn starts_unloaded() {
    let store: TableStore<Row> = TableStore::new();
    assert!(!store.is_loaded());
    assert!(store.snapshot().is_none());
}

#[test]
fn empty_table_still_counts_as_loaded() {
    let store = TableStore::new();
    store.replace(table(""));
    assert!(store.is_loaded());
    assert!(store.snapshot().unwrap().is_empty());

    store.clear();
    assert!(!store.is_loaded());
}

#[test]
fn snapshot_survives_replace() {
    let store = TableStore::new();
    assert!(store.replace(table("a,b")).is_none());
    let old = store.snapshot().unwrap();

    let previous = store.replace(table("c,d\ne,f")).unwrap();
    assert!(Arc::ptr_eq(&old, &previous));
    assert_eq!(old.len(), 1);
    assert_eq!(store.snapshot().unwrap().len(), 2);
}

#[test]
fn readers_and_a_writer_share_the_store() {
    let store = Arc::new(TableStore::new());
    store.replace(table("Name,Hobby\nSarah,Sewing"));

    thread::scope(|s| {
        for _ in 0..4 {
            let store = Arc::clone(&store);
            s.spawn(move || {
                for _ in 0..100 {
                    let snap = store.snapshot().unwrap();
                    let found = search(snap.rows(), true, "Sewing", "Hobby").unwrap();
                    // every snapshot is one whole table, never a mix
                    assert!(found.len() == 1 || found.len() == 2);
                }
            });
        }
        s.spawn(|| {
            for _ in 0..50 {
                store.replace(table("Name,Hobby\nSarah,Sewing\nAmy,Sewing"));
                store.replace(table("Name,Hobby\nSarah,Sewing"));
            }
        });
    });
}
