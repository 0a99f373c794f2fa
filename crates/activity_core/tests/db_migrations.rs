use activity_core::db::migrations::{latest_version, schema_version, upgrade_schema};
use activity_core::db::{open_kv_store, DbLocation};
use activity_core::{GatewayError, PersistenceGateway, SqliteGateway};
use rusqlite::Connection;

#[test]
fn in_memory_store_is_created_at_latest_version() {
    let conn = open_kv_store(&DbLocation::Memory).unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    assert_table_exists(&conn, "kv_store");
}

#[test]
fn reopening_a_file_keeps_rows_and_skips_upgrade() {
    let dir = tempfile::tempdir().unwrap();
    let location = DbLocation::File(dir.path().join("activities.db"));

    let first = open_kv_store(&location).unwrap();
    first
        .execute(
            "INSERT INTO kv_store (key, value) VALUES ('activities', '[]');",
            [],
        )
        .unwrap();
    drop(first);

    let mut second = open_kv_store(&location).unwrap();
    let upgrade = upgrade_schema(&mut second).unwrap();
    assert!(upgrade.is_noop());
    assert_eq!(upgrade.to, latest_version());

    let value: String = second
        .query_row(
            "SELECT value FROM kv_store WHERE key = 'activities';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(value, "[]");
}

#[test]
fn upgrade_from_empty_database_reports_versions() {
    let mut conn = Connection::open_in_memory().unwrap();

    let upgrade = upgrade_schema(&mut conn).unwrap();
    assert_eq!(upgrade.from, 0);
    assert_eq!(upgrade.to, latest_version());
    assert!(!upgrade.is_noop());
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_kv_store(&DbLocation::File(path)).unwrap_err() {
        GatewayError::Schema {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn gateway_open_surfaces_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    Connection::open(&path)
        .unwrap()
        .execute_batch("PRAGMA user_version = 999;")
        .unwrap();

    let err = SqliteGateway::new(&path).open().await.unwrap_err();
    assert!(matches!(err, GatewayError::Schema { db_version: 999, .. }));
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
