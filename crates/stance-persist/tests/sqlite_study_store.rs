//! Study store over an in-memory SQLite database

use std::sync::Arc;

use stance_core::{Message, Role};
use stance_persist::{SqliteBackend, StorageBackend, StudyRecord, StudyStore};

fn submission(pid: &str, group: &str) -> StudyRecord {
    serde_json::from_value(serde_json::json!({
        "prolificPid": pid,
        "group": group,
        "thesisId": "1",
        "thesisTitle": "Erneuerbare Energien",
        "thesisText": "Der Ausbau erneuerbarer Energien soll staatlich gefördert werden.",
        "run": 2,
        "initialPosition": 10,
        "initialInformation": 30,
        "initialStatement": "Zu teuer",
        "chatHistory": [
            {"role": "assistant", "content": "PRO:\n..."},
            {"role": "user", "content": "Warum?"},
            {"role": "error", "content": "api_interface Error: Rate limited"}
        ],
        "finalPosition": 25,
        "finalInformation": 60,
        "timestamps": {
            "iframeOpen": 1718000000000i64,
            "chatStart": 1718000060000i64,
            "chatEnd": 1718000360000i64,
            "completion": 1718000400000i64
        },
        "totalTimeSeconds": 400.0,
        "chatTimeSeconds": 300.5
    }))
    .unwrap()
}

#[tokio::test]
async fn records_survive_roundtrip_in_order() {
    let backend = Arc::new(SqliteBackend::new("sqlite::memory:").await.unwrap());
    let store = StudyStore::new(backend.clone());

    for (pid, group) in [("a", "A"), ("b", "B"), ("c", "C")] {
        store.save(submission(pid, group)).await.unwrap();
    }

    assert_eq!(store.count().await.unwrap(), 3);
    let all = store.fetch_all().await.unwrap();
    let groups: Vec<_> = all.iter().map(|r| r.record.group.as_str()).collect();
    assert_eq!(groups, ["A", "B", "C"]);

    let first = &all[0].record;
    assert_eq!(first, &submission("a", "A"));
    assert_eq!(first.chat_history[2].role, Role::Error);
    assert_eq!(first.chat_history[1], Message::user("Warum?"));
    assert_eq!(first.chat_time_seconds, Some(300.5));
}

#[tokio::test]
async fn other_prefixes_are_not_counted() {
    let backend = Arc::new(SqliteBackend::new("sqlite::memory:").await.unwrap());
    backend
        .set_value("unrelated:1", serde_json::json!({"x": 1}))
        .await
        .unwrap();
    let store = StudyStore::new(backend);
    store.save(submission("a", "A")).await.unwrap();

    assert_eq!(store.count().await.unwrap(), 1);
    assert_eq!(store.fetch_all().await.unwrap().len(), 1);
}
