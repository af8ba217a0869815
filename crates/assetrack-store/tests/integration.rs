use assetrack_store::{
    Document, DocumentStore, Filter, JournalStore, OpContext, Pattern, ReadMode, StoreError,
};
use serde_json::{json, Value};
use std::fs;
use std::io::Write;
use tempfile::TempDir;

fn doc(value: Value) -> Document {
    value.as_object().cloned().unwrap()
}

fn active() -> Filter {
    Filter::missing("__deleted")
}

#[test]
fn test_state_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.atj");
    let ctx = OpContext::background();

    let id = {
        let store = JournalStore::open(&path, ReadMode::Strict).unwrap();
        let id = store
            .insert_one(&ctx, "item", doc(json!({"name": "Box", "item_id": "I1"})))
            .unwrap();
        store
            .insert_one(&ctx, "item", doc(json!({"name": "Crate", "item_id": "I2"})))
            .unwrap();
        store
            .update_one(
                &ctx,
                "item",
                &Filter::equals("item_id", "I2"),
                doc(json!({"__deleted": true})),
            )
            .unwrap();
        id
    };

    let store = JournalStore::open(&path, ReadMode::Strict).unwrap();
    assert_eq!(store.count(&ctx, "item", &Filter::All).unwrap(), 2);
    let visible = store.find_many(&ctx, "item", &active()).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0]["_id"], id.to_hex());
    assert_eq!(visible[0]["name"], "Box");
}

#[test]
fn test_unique_index_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.atj");
    let ctx = OpContext::background();

    {
        let store = JournalStore::open(&path, ReadMode::Strict).unwrap();
        store
            .create_unique_index(&ctx, "sensor", "sensor_id", active())
            .unwrap();
        store
            .insert_one(&ctx, "sensor", doc(json!({"sensor_id": "s1"})))
            .unwrap();
    }

    let store = JournalStore::open(&path, ReadMode::Strict).unwrap();
    assert!(matches!(
        store.insert_one(&ctx, "sensor", doc(json!({"sensor_id": "s1"}))),
        Err(StoreError::DuplicateKey { .. })
    ));
    // Redeclaring the same index is a no-op.
    store
        .create_unique_index(&ctx, "sensor", "sensor_id", active())
        .unwrap();
}

#[test]
fn test_rejected_writes_are_not_journaled() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.atj");
    let ctx = OpContext::background();

    let store = JournalStore::open(&path, ReadMode::Strict).unwrap();
    store
        .create_unique_index(&ctx, "sensor", "sensor_id", Filter::All)
        .unwrap();
    store
        .insert_one(&ctx, "sensor", doc(json!({"sensor_id": "s1"})))
        .unwrap();
    let len_before = fs::metadata(&path).unwrap().len();

    assert!(store
        .insert_one(&ctx, "sensor", doc(json!({"sensor_id": "s1"})))
        .is_err());
    // Unchanged update: matched, not modified, not journaled.
    let outcome = store
        .update_one(
            &ctx,
            "sensor",
            &Filter::equals("sensor_id", "s1"),
            doc(json!({"sensor_id": "s1"})),
        )
        .unwrap();
    assert_eq!(outcome.modified, 0);

    assert_eq!(fs::metadata(&path).unwrap().len(), len_before);
}

#[test]
fn test_truncated_tail_strict_vs_permissive() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.atj");
    let ctx = OpContext::background();

    {
        let store = JournalStore::open(&path, ReadMode::Strict).unwrap();
        store
            .insert_one(&ctx, "event", doc(json!({"event_timestamp": 100})))
            .unwrap();
    }
    {
        // An append cut short before its last bytes.
        let frame = assetrack_journal::frame::encode(br#"{"op":"insert","collection":"event"}"#)
            .unwrap();
        let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&frame[..frame.len() - 4]).unwrap();
    }

    assert!(matches!(
        JournalStore::open(&path, ReadMode::Strict),
        Err(StoreError::Journal(_))
    ));

    {
        let store = JournalStore::open(&path, ReadMode::Permissive).unwrap();
        assert_eq!(store.count(&ctx, "event", &Filter::All).unwrap(), 1);
        store
            .insert_one(&ctx, "event", doc(json!({"event_timestamp": 200})))
            .unwrap();
    }

    // The broken tail was cut before appending, so strict replay works again.
    let store = JournalStore::open(&path, ReadMode::Strict).unwrap();
    let events = store
        .find_many(&ctx, "event", &Filter::between("event_timestamp", 0, 1000))
        .unwrap();
    assert_eq!(events.len(), 2);
}

#[test]
fn test_torn_tail_is_cut_on_permissive_open() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.atj");
    let ctx = OpContext::background();

    {
        let store = JournalStore::open(&path, ReadMode::Strict).unwrap();
        store
            .insert_one(&ctx, "sensor", doc(json!({"sensor_id": "s1"})))
            .unwrap();
    }
    let intact_len = fs::metadata(&path).unwrap().len();
    {
        // Full-length frame whose payload never reached the disk.
        let mut frame = assetrack_journal::frame::encode(br#"{"op":"noop"}"#).unwrap();
        let payload_start = assetrack_journal::frame::PREFIX_LEN;
        frame[payload_start..].fill(0);
        let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&frame).unwrap();
    }

    assert!(matches!(
        JournalStore::open(&path, ReadMode::Strict),
        Err(StoreError::Journal(_))
    ));
    let store = JournalStore::open(&path, ReadMode::Permissive).unwrap();
    assert_eq!(store.count(&ctx, "sensor", &Filter::All).unwrap(), 1);
    assert_eq!(fs::metadata(&path).unwrap().len(), intact_len);
}

#[test]
fn test_search_over_journal_store() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.atj");
    let ctx = OpContext::background();

    let store = JournalStore::open(&path, ReadMode::Strict).unwrap();
    store
        .insert_one(&ctx, "item", doc(json!({"name": "Blue Box", "tags": ["t1"]})))
        .unwrap();
    store
        .insert_one(&ctx, "item", doc(json!({"name": "Pallet", "tags": ["box-9"]})))
        .unwrap();
    store
        .insert_one(&ctx, "item", doc(json!({"name": "Crate"})))
        .unwrap();

    let pattern = Pattern::new("(?i)box").unwrap();
    let filter = Filter::And(vec![
        active(),
        Filter::Or(vec![
            Filter::regex("name", pattern.clone()),
            Filter::regex("tags", pattern),
        ]),
    ]);
    assert_eq!(store.find_many(&ctx, "item", &filter).unwrap().len(), 2);
}

#[test]
fn test_expired_context_rejects_writes() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.atj");

    let store = JournalStore::open(&path, ReadMode::Strict).unwrap();
    let ctx = OpContext::with_deadline(std::time::Instant::now());
    assert!(matches!(
        store.insert_one(&ctx, "item", doc(json!({"name": "Box"}))),
        Err(StoreError::DeadlineExceeded)
    ));
    assert_eq!(
        store
            .count(&OpContext::background(), "item", &Filter::All)
            .unwrap(),
        0
    );
}
