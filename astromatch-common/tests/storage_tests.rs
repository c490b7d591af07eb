//! Integration tests for the on-disk stores
//!
//! Exercises HistoryStore and SessionCache over a real SQLite file, the
//! way the service uses them across restarts.

use astromatch_common::models::HistoryEntry;
use astromatch_common::storage::{keys, HistoryStore, KeyValueStore, SessionCache, SqliteStore};
use astromatch_common::Locale;
use serde_json::json;
use std::sync::Arc;

async fn open(dir: &tempfile::TempDir) -> Arc<SqliteStore> {
    Arc::new(
        SqliteStore::open(&dir.path().join("astromatch.db"))
            .await
            .expect("Should open database"),
    )
}

#[tokio::test]
async fn test_history_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = open(&dir).await;
        let history = HistoryStore::new(store.clone());
        history
            .append(HistoryEntry::new(json!({"overall_score": 40}), "Ana", "Léo"))
            .await
            .unwrap();
        history
            .append(HistoryEntry::new(json!({"overall_score": 90}), "Zoé", "Max"))
            .await
            .unwrap();
        store.pool().close().await;
    }

    let history = HistoryStore::new(open(&dir).await);
    let entries = history.list().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].person1_firstname, "Zoé");
    assert_eq!(entries[1].overall_score, 40.0);
}

#[tokio::test]
async fn test_out_of_order_dates_keep_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let history = HistoryStore::new(open(&dir).await);

    let mut older = HistoryEntry::new(json!({}), "First", "X");
    let mut newer = HistoryEntry::new(json!({}), "Second", "Y");
    // out-of-order dates must not reorder the log
    newer.date = older.date - chrono::Duration::days(1);
    older.date = newer.date + chrono::Duration::days(2);

    history.append(older).await.unwrap();
    history.append(newer).await.unwrap();

    let names: Vec<String> = history
        .list()
        .await
        .into_iter()
        .map(|e| e.person1_firstname)
        .collect();
    assert_eq!(names, vec!["Second", "First"]);
}

#[tokio::test]
async fn test_corrupt_history_in_database_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir).await;
    store.set(keys::HISTORY, "not json at all").await.unwrap();

    let history = HistoryStore::new(store);
    assert!(history.list().await.is_empty());
    assert!(history.get_at(3).await.is_none());
}

#[tokio::test]
async fn test_session_cache_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let cache = SessionCache::new(open(&dir).await);

    cache.set_language(Locale::En).await.unwrap();
    cache
        .save_report(&json!({"overall_score": 58}), "Ana", "Léo")
        .await
        .unwrap();
    cache.mark_premium("cs_test_123").await.unwrap();

    assert_eq!(cache.language().await, Locale::En);
    assert_eq!(cache.load_report().await.unwrap().firstname2, "Léo");
    assert_eq!(cache.premium_session().await.as_deref(), Some("cs_test_123"));
}
