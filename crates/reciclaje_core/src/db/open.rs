//! Connection opening for the configured store endpoint.
//!
//! # Responsibility
//! - Open one read-write SQLite connection per request.
//! - Configure pragmas and lock timeout from `RecorderConfig`.
//!
//! # Invariants
//! - Credentials are never written to logs, only their presence.

use super::DbResult;
use crate::config::RecorderConfig;
use log::{debug, error, info};
use rusqlite::{Connection, OpenFlags};
use std::time::Instant;

/// Opens a connection to the configured database and applies pragmas.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
///
/// # Errors
/// - Returns `DbError::Config` when `config` fails `validate()`; nothing is
///   opened in that case.
/// - Returns `DbError::Sqlite` when the database does not exist, cannot be
///   opened read-write, or a pragma fails.
pub fn open_connection(config: &RecorderConfig) -> DbResult<Connection> {
    let started_at = Instant::now();
    if let Err(err) = config.validate() {
        error!(
            "event=db_open module=db status=error error_code=invalid_config error={}",
            err
        );
        return Err(err.into());
    }
    debug!(
        "event=db_open module=db status=start credentials={} timeout_ms={}",
        if config.credentials.is_some() {
            "present"
        } else {
            "absent"
        },
        config.timeout_ms
    );

    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;

    let conn = Connection::open_with_flags(config.endpoint.as_str(), flags)
        .and_then(|conn| {
            configure_connection(&conn, config)?;
            Ok(conn)
        });

    match conn {
        Ok(conn) => {
            info!(
                "event=db_open module=db status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err.into())
        }
    }
}

fn configure_connection(conn: &Connection, config: &RecorderConfig) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(config.timeout())?;
    Ok(())
}
