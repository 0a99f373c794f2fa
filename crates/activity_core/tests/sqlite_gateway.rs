use activity_core::{
    ActivityDraft, ActivityStore, LoadOutcome, PersistenceGateway, SqliteGateway, ACTIVITIES_KEY,
};
use chrono::NaiveDate;
use serde_json::json;
use std::sync::Arc;

fn draft(kind: &str, minutes: f64, day: u32) -> ActivityDraft {
    ActivityDraft {
        kind: kind.to_string(),
        duration_minutes: minutes,
        date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn activities_survive_a_new_session_on_the_same_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("activities.sqlite3");

    let first_ids = {
        let gateway = Arc::new(SqliteGateway::new(&path));
        let mut store = ActivityStore::initialize(gateway).await.unwrap();
        store.add(draft("Running", 30.0, 1));
        store.add(draft("Walking", 45.0, 2));
        let ids = store.list().iter().map(|a| a.id).collect::<Vec<_>>();
        store.close().await.unwrap();
        ids
    };

    let gateway = Arc::new(SqliteGateway::new(&path));
    let mut store = ActivityStore::open(gateway).await.unwrap();
    let outcome = store.load().await.unwrap();
    assert_eq!(
        outcome,
        LoadOutcome::Restored {
            restored: 2,
            skipped: 0
        }
    );
    let ids = store.list().iter().map(|a| a.id).collect::<Vec<_>>();
    assert_eq!(ids, first_ids);
    assert_eq!(store.list()[1].kind, "Walking");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn open_is_idempotent_and_values_round_trip() {
    let gateway = SqliteGateway::in_memory();
    gateway.open().await.unwrap();
    gateway.open().await.unwrap();

    assert_eq!(gateway.get(ACTIVITIES_KEY).await.unwrap(), None);
    let value = json!([{"type": "Run", "duration": 12.5, "date": "2024-06-01"}]);
    gateway.set(ACTIVITIES_KEY, value.clone()).await.unwrap();
    assert_eq!(gateway.get(ACTIVITIES_KEY).await.unwrap(), Some(value));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn open_fails_for_unwritable_location() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("nested").join("db.sqlite3");

    let result = ActivityStore::initialize(Arc::new(SqliteGateway::new(&path))).await;
    assert!(result.is_err());
}
