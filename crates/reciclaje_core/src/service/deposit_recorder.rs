//! Deposit recording use-case.
//!
//! # Responsibility
//! - Validate caller input before touching the store.
//! - Resolve center and category names, then insert one deposit row, all in
//!   one `IMMEDIATE` transaction on a connection owned by the call.
//!
//! # Invariants
//! - Exactly one row is added on success; none on any failure path.
//! - A failed rollback is logged and never replaces the primary error.
//! - Connection, transaction and statements are released on every exit path
//!   by `Drop`; an unfinished transaction rolls back when dropped.
//! - No retries. Each call is a single attempt.

use crate::config::RecorderConfig;
use crate::db::{open_connection, DbError, DbResult};
use crate::logging::sanitize_for_log;
use crate::model::deposit::{DepositReceipt, DepositRequest, DepositValidationError, NewDeposit};
use crate::repo::deposit_repo::{DepositRepository, RepoError, SqliteDepositRepository};
use log::{error, info, warn};
use rusqlite::{Connection, DropBehavior, Transaction, TransactionBehavior};
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Source of fresh store connections, one per recorded deposit.
pub trait Connector {
    fn connect(&self) -> DbResult<Connection>;
}

/// Opens SQLite connections from injected configuration.
///
/// Settings are validated on every connect, so an out-of-range value is a
/// `DataAccess` failure of that call.
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    config: RecorderConfig,
}

impl SqliteConnector {
    pub fn new(config: RecorderConfig) -> Self {
        Self { config }
    }
}

impl Connector for SqliteConnector {
    fn connect(&self) -> DbResult<Connection> {
        open_connection(&self.config)
    }
}

/// Coarse outcome class of a failed deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordErrorKind {
    InvalidInput,
    CenterNotFound,
    CategoryNotFound,
    InsertFailed,
    DataAccess,
}

/// Errors from `DepositRecorder::record_deposit`.
#[derive(Debug)]
pub enum RecordError {
    /// Rejected before any store access.
    InvalidInput(DepositValidationError),
    /// No active center has exactly this name.
    CenterNotFound(String),
    /// No category has exactly this name.
    CategoryNotFound(String),
    /// The insert statement reported zero affected rows.
    InsertFailed,
    /// Opening, querying, writing or committing failed.
    DataAccess(RepoError),
}

impl RecordError {
    pub fn kind(&self) -> RecordErrorKind {
        match self {
            Self::InvalidInput(_) => RecordErrorKind::InvalidInput,
            Self::CenterNotFound(_) => RecordErrorKind::CenterNotFound,
            Self::CategoryNotFound(_) => RecordErrorKind::CategoryNotFound,
            Self::InsertFailed => RecordErrorKind::InsertFailed,
            Self::DataAccess(_) => RecordErrorKind::DataAccess,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::CenterNotFound(_) => "center_not_found",
            Self::CategoryNotFound(_) => "category_not_found",
            Self::InsertFailed => "insert_failed",
            Self::DataAccess(_) => "data_access",
        }
    }
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "invalid deposit input: {err}"),
            Self::CenterNotFound(name) => {
                write!(f, "collection center not found or inactive: {name}")
            }
            Self::CategoryNotFound(name) => write!(f, "material category not found: {name}"),
            Self::InsertFailed => write!(f, "deposit insert affected no rows"),
            Self::DataAccess(err) => write!(f, "data access failed: {err}"),
        }
    }
}

impl Error for RecordError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::DataAccess(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DepositValidationError> for RecordError {
    fn from(value: DepositValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<RepoError> for RecordError {
    fn from(value: RepoError) -> Self {
        Self::DataAccess(value)
    }
}

impl From<DbError> for RecordError {
    fn from(value: DbError) -> Self {
        Self::DataAccess(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for RecordError {
    fn from(value: rusqlite::Error) -> Self {
        Self::DataAccess(RepoError::from(value))
    }
}

/// Records recycling deposits against the configured store.
pub struct DepositRecorder<C: Connector = SqliteConnector> {
    connector: C,
}

impl DepositRecorder<SqliteConnector> {
    /// Builds a recorder that opens SQLite connections from `config`.
    pub fn from_config(config: RecorderConfig) -> Self {
        Self::new(SqliteConnector::new(config))
    }
}

impl<C: Connector> DepositRecorder<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Records one deposit of `quantity_kg` of `material_name` at `center_name`.
    ///
    /// Names are matched exactly as given (case-sensitive, untrimmed) and are
    /// only ever bound as statement parameters.
    ///
    /// # Errors
    /// - `InvalidInput` when a name is blank or the quantity is not positive.
    /// - `CenterNotFound` / `CategoryNotFound` on a lookup miss.
    /// - `InsertFailed` when the insert affects no rows.
    /// - `DataAccess` for any store fault.
    pub fn record_deposit(
        &self,
        center_name: &str,
        material_name: &str,
        quantity_kg: Decimal,
    ) -> Result<DepositReceipt, RecordError> {
        let started_at = Instant::now();

        let request = match DepositRequest::new(center_name, material_name, quantity_kg) {
            Ok(request) => request,
            Err(err) => {
                warn!(
                    "event=deposit_record module=service status=rejected error_code=invalid_input error={}",
                    err
                );
                return Err(err.into());
            }
        };

        match self.record_validated(&request) {
            Ok(receipt) => {
                info!(
                    "event=deposit_record module=service status=ok deposit_id={} center_id={} category_id={} quantity_kg={} duration_ms={}",
                    receipt.deposit_id,
                    receipt.center_id,
                    receipt.category_id,
                    receipt.quantity_kg,
                    started_at.elapsed().as_millis()
                );
                Ok(receipt)
            }
            Err(err) => {
                let level = match err.kind() {
                    RecordErrorKind::DataAccess | RecordErrorKind::InsertFailed => {
                        log::Level::Error
                    }
                    _ => log::Level::Warn,
                };
                log::log!(
                    level,
                    "event=deposit_record module=service status=error error_code={} center={} material={} duration_ms={} error={}",
                    err.code(),
                    sanitize_for_log(&request.center_name),
                    sanitize_for_log(&request.material_name),
                    started_at.elapsed().as_millis(),
                    sanitize_for_log(&err.to_string())
                );
                Err(err)
            }
        }
    }

    fn record_validated(&self, request: &DepositRequest) -> Result<DepositReceipt, RecordError> {
        let mut conn = self.connector.connect()?;
        let mut tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let receipt = match write_deposit(&tx, request) {
            Ok(receipt) => receipt,
            Err(err) => {
                rollback_best_effort(tx, &err);
                return Err(err);
            }
        };

        // A failed COMMIT can leave the transaction open; roll it back here
        // instead of in `Drop`, which discards the rollback error.
        tx.set_drop_behavior(DropBehavior::Ignore);
        if let Err(commit_err) = tx.commit() {
            let err = RecordError::from(commit_err);
            if !conn.is_autocommit() {
                if let Err(rollback_err) = conn.execute_batch("ROLLBACK;") {
                    log_rollback_failure(&err, &rollback_err);
                }
            }
            return Err(err);
        }

        Ok(receipt)
    }
}

fn write_deposit(
    tx: &Transaction<'_>,
    request: &DepositRequest,
) -> Result<DepositReceipt, RecordError> {
    let repo = SqliteDepositRepository::new(tx);

    let center_id = repo
        .find_active_center_id(&request.center_name)?
        .ok_or_else(|| RecordError::CenterNotFound(request.center_name.clone()))?;

    let category_id = repo
        .find_category_id(&request.material_name)?
        .ok_or_else(|| RecordError::CategoryNotFound(request.material_name.clone()))?;

    let deposit = NewDeposit {
        center_id,
        category_id,
        quantity_kg: request.quantity_kg,
    };
    let (changed, deposit_id) = repo.insert_deposit(&deposit)?;
    if changed == 0 {
        return Err(RecordError::InsertFailed);
    }

    Ok(DepositReceipt {
        deposit_id,
        center_id,
        category_id,
        quantity_kg: request.quantity_kg,
    })
}

fn rollback_best_effort(tx: Transaction<'_>, primary: &RecordError) {
    if let Err(rollback_err) = tx.rollback() {
        log_rollback_failure(primary, &rollback_err);
    }
}

fn log_rollback_failure(primary: &RecordError, rollback_err: &rusqlite::Error) {
    error!(
        "event=deposit_rollback module=service status=error primary_error_code={} error={}",
        primary.code(),
        rollback_err
    );
}
