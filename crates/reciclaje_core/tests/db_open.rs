mod common;

use common::TestStore;
use reciclaje_core::db::{open_connection, DbError};
use reciclaje_core::{Credentials, DepositRecorder, RecordErrorKind, RecorderConfig};
use rust_decimal::Decimal;

#[test]
fn open_connection_enables_foreign_keys_and_busy_timeout() {
    let store = TestStore::seeded();
    let config = store.config().with_timeout_ms(1_234);

    let conn = open_connection(&config).unwrap();

    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);

    let busy_timeout: i64 = conn
        .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(busy_timeout, 1_234);
}

#[test]
fn open_connection_refuses_to_create_a_missing_store() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.db");

    let err = open_connection(&RecorderConfig::new(missing.to_str().unwrap())).unwrap_err();

    assert!(matches!(err, DbError::Sqlite(_)));
    assert!(!missing.exists());
}

#[test]
fn open_connection_accepts_credentials_and_uri_endpoints() {
    let store = TestStore::seeded();
    let endpoint = format!("file:{}?mode=rw", store.path.display());
    let config =
        RecorderConfig::new(endpoint).with_credentials(Credentials::new("sa", "not-logged"));

    let conn = open_connection(&config).unwrap();
    let centers: i64 = conn
        .query_row("SELECT COUNT(*) FROM collection_centers;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(centers, 3);
}

#[test]
fn open_connection_rejects_timeout_beyond_sqlite_range_without_panicking() {
    let store = TestStore::seeded();
    let config = store.config().with_timeout_ms(3_000_000_000);

    let err = open_connection(&config).unwrap_err();

    assert!(matches!(err, DbError::Config(_)));
    assert!(err.to_string().contains("timeout_ms"));
}

#[test]
fn recorder_with_oversized_timeout_reports_data_access() {
    let store = TestStore::seeded();
    let recorder = DepositRecorder::from_config(store.config().with_timeout_ms(u64::MAX));

    let err = recorder
        .record_deposit(common::CENTRO, "Papel", Decimal::ONE)
        .unwrap_err();

    assert_eq!(err.kind(), RecordErrorKind::DataAccess);
    assert_eq!(store.row_count("deposit_records"), 0);
}
