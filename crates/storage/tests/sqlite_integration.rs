use storage::repository::HistoryRepository;
use storage::sqlite::SqliteStore;

#[tokio::test]
async fn history_round_trips_through_sqlite() {
    let store = SqliteStore::open("sqlite::memory:").await.unwrap();

    let sessions = vec![
        vec!["h-11".to_owned(), "h-12".to_owned(), "42".to_owned()],
        vec!["h-21".to_owned()],
    ];
    store.save_recent(&sessions).await.unwrap();

    let loaded = store.load_recent().await.unwrap();
    assert_eq!(loaded, sessions);
}

#[tokio::test]
async fn missing_history_loads_as_empty() {
    let store = SqliteStore::open("sqlite::memory:").await.unwrap();
    assert!(store.load_recent().await.unwrap().is_empty());
}

#[tokio::test]
async fn save_replaces_previous_history() {
    let store = SqliteStore::open("sqlite::memory:").await.unwrap();

    store
        .save_recent(&[vec!["old".to_owned()]])
        .await
        .unwrap();
    store
        .save_recent(&[vec!["new-1".to_owned()], vec!["new-2".to_owned()]])
        .await
        .unwrap();

    let loaded = store.load_recent().await.unwrap();
    assert_eq!(
        loaded,
        vec![vec!["new-1".to_owned()], vec!["new-2".to_owned()]]
    );
}

#[tokio::test]
async fn migrate_is_idempotent() {
    let store = SqliteStore::open("sqlite::memory:").await.unwrap();
    store.migrate().await.unwrap();

    store.save_recent(&[vec!["k".to_owned()]]).await.unwrap();
    assert_eq!(store.load_recent().await.unwrap().len(), 1);
}
