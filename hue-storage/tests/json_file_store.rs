//! End-to-end tests of the store against the JSON file backend.

use std::collections::BTreeMap;

use hue_storage::{JsonFile, KeyValueStore};

#[tokio::test]
async fn test_values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hue.json");

    {
        let store = KeyValueStore::open(JsonFile::new(&path)).await.unwrap();
        let mut groups = BTreeMap::new();
        groups.insert(3u32, "Kitchen".to_string());
        store.set("groups", &groups).unwrap();
        store.set("whitelist", &["user-one"]).unwrap();
        store.flush().await.unwrap();
    }

    let reopened = KeyValueStore::open(JsonFile::new(&path)).await.unwrap();
    let groups: BTreeMap<u32, String> = reopened.get("groups").unwrap().unwrap();
    assert_eq!(groups.get(&3).map(String::as_str), Some("Kitchen"));

    let users: Vec<String> = reopened.get("whitelist").unwrap().unwrap();
    assert_eq!(users, vec!["user-one".to_string()]);
}

#[tokio::test]
async fn test_concurrent_flushes_leave_latest_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hue.json");
    let store = KeyValueStore::open(JsonFile::new(&path)).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..16u32 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.set("counter", &i).unwrap();
            store.flush().await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let in_memory: u32 = store.get("counter").unwrap().unwrap();
    let reopened = KeyValueStore::open(JsonFile::new(&path)).await.unwrap();
    let on_disk: u32 = reopened.get("counter").unwrap().unwrap();
    assert_eq!(in_memory, on_disk);
}
