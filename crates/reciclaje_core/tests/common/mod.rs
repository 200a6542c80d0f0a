#![allow(dead_code)]

use reciclaje_core::db::DbResult;
use reciclaje_core::{Connector, DepositRecorder, RecorderConfig, SqliteConnector};
use rusqlite::Connection;
use std::cell::Cell;
use std::path::PathBuf;
use tempfile::TempDir;

pub const SCHEMA_SQL: &str = include_str!("../fixtures/schema.sql");
pub const SEED_SQL: &str = include_str!("../fixtures/seed.sql");

pub const VILLA_URQUIZA: &str = "EcoPunto Villa Urquiza";
pub const CENTRO: &str = "EcoPunto Centro";
pub const PALERMO_INACTIVE: &str = "EcoPunto Palermo";

/// Temp-file SQLite store provisioned with the recycling schema.
pub struct TestStore {
    _dir: TempDir,
    pub path: PathBuf,
}

impl TestStore {
    pub fn seeded() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reciclaje.db");

        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        conn.execute_batch(SEED_SQL).unwrap();
        drop(conn);

        Self { _dir: dir, path }
    }

    pub fn config(&self) -> RecorderConfig {
        RecorderConfig::new(self.path.to_str().unwrap())
    }

    pub fn recorder(&self) -> DepositRecorder {
        DepositRecorder::from_config(self.config())
    }

    pub fn counting_recorder(&self) -> DepositRecorder<CountingConnector> {
        DepositRecorder::new(CountingConnector::new(self.config()))
    }

    /// Direct connection that bypasses the recorder.
    pub fn conn(&self) -> Connection {
        Connection::open(&self.path).unwrap()
    }

    pub fn row_count(&self, table: &str) -> i64 {
        // Table names come from test code only.
        self.conn()
            .query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
                row.get(0)
            })
            .unwrap()
    }

    pub fn table_exists(&self, table: &str) -> bool {
        self.conn()
            .query_row(
                "SELECT EXISTS(
                    SELECT 1
                    FROM sqlite_master
                    WHERE type = 'table' AND name = ?1
                );",
                [table],
                |row| row.get::<_, i64>(0),
            )
            .unwrap()
            == 1
    }

    /// Row counts of every table, used to assert the store is untouched.
    pub fn snapshot(&self) -> Vec<(&'static str, i64)> {
        ["collection_centers", "material_categories", "deposit_records", "users"]
            .into_iter()
            .map(|table| (table, self.row_count(table)))
            .collect()
    }
}

/// Connector wrapper that counts how often the store was contacted.
pub struct CountingConnector {
    inner: SqliteConnector,
    calls: Cell<usize>,
}

impl CountingConnector {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            inner: SqliteConnector::new(config),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Connector for CountingConnector {
    fn connect(&self) -> DbResult<Connection> {
        self.calls.set(self.calls.get() + 1);
        self.inner.connect()
    }
}
