//! Deposit repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Resolve center/category names to identifiers.
//! - Insert deposit rows and read them back.
//!
//! # Invariants
//! - SQL text is static; names, ids and quantities are always bound
//!   parameters, so hostile strings can only match or miss.
//! - Center lookups only see active centers.
//! - `deposited_at` is never written by this code; the column default
//!   assigns it.

use crate::db::DbError;
use crate::model::deposit::{
    CategoryId, CenterId, DepositId, DepositRecord, Kilograms, NewDeposit,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const FIND_ACTIVE_CENTER_SQL: &str = "SELECT id
FROM collection_centers
WHERE name = ?1 AND is_active = 1;";

const FIND_CATEGORY_SQL: &str = "SELECT id
FROM material_categories
WHERE name = ?1;";

const INSERT_DEPOSIT_SQL: &str = "INSERT INTO deposit_records (
    center_id,
    category_id,
    quantity_kg
) VALUES (?1, ?2, ?3);";

const DEPOSIT_SELECT_SQL: &str = "SELECT
    id,
    center_id,
    category_id,
    quantity_kg,
    deposited_at
FROM deposit_records";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for deposit lookups and writes.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted deposit data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Filter and pagination for deposit listings.
#[derive(Debug, Clone, Default)]
pub struct DepositListQuery {
    pub center_id: Option<CenterId>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for deposit lookups and writes.
pub trait DepositRepository {
    /// Exact, case-sensitive match against active centers.
    fn find_active_center_id(&self, name: &str) -> RepoResult<Option<CenterId>>;
    /// Exact match against category names.
    fn find_category_id(&self, name: &str) -> RepoResult<Option<CategoryId>>;
    /// Returns the affected-row count and the new row id.
    fn insert_deposit(&self, deposit: &NewDeposit) -> RepoResult<(usize, DepositId)>;
    fn get_deposit(&self, id: DepositId) -> RepoResult<Option<DepositRecord>>;
    /// Newest first.
    fn list_deposits(&self, query: &DepositListQuery) -> RepoResult<Vec<DepositRecord>>;
}

/// SQLite-backed deposit repository.
///
/// Borrowing a `Transaction` works too, since it derefs to `Connection`.
pub struct SqliteDepositRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDepositRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DepositRepository for SqliteDepositRepository<'_> {
    fn find_active_center_id(&self, name: &str) -> RepoResult<Option<CenterId>> {
        let mut stmt = self.conn.prepare_cached(FIND_ACTIVE_CENTER_SQL)?;
        let id = stmt
            .query_row([name], |row| row.get::<_, CenterId>(0))
            .optional()?;
        Ok(id)
    }

    fn find_category_id(&self, name: &str) -> RepoResult<Option<CategoryId>> {
        let mut stmt = self.conn.prepare_cached(FIND_CATEGORY_SQL)?;
        let id = stmt
            .query_row([name], |row| row.get::<_, CategoryId>(0))
            .optional()?;
        Ok(id)
    }

    fn insert_deposit(&self, deposit: &NewDeposit) -> RepoResult<(usize, DepositId)> {
        let mut stmt = self.conn.prepare_cached(INSERT_DEPOSIT_SQL)?;
        let changed = stmt.execute(params![
            deposit.center_id,
            deposit.category_id,
            deposit.quantity_kg,
        ])?;
        Ok((changed, DepositId(self.conn.last_insert_rowid())))
    }

    fn get_deposit(&self, id: DepositId) -> RepoResult<Option<DepositRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DEPOSIT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_deposit_row(row)?));
        }

        Ok(None)
    }

    fn list_deposits(&self, query: &DepositListQuery) -> RepoResult<Vec<DepositRecord>> {
        let mut sql = format!("{DEPOSIT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(center_id) = query.center_id {
            sql.push_str(" AND center_id = ?");
            bind_values.push(Value::Integer(center_id.0));
        }

        sql.push_str(" ORDER BY deposited_at DESC, id DESC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut deposits = Vec::new();

        while let Some(row) = rows.next()? {
            deposits.push(parse_deposit_row(row)?);
        }

        Ok(deposits)
    }
}

fn parse_deposit_row(row: &Row<'_>) -> RepoResult<DepositRecord> {
    let id: DepositId = row.get("id")?;

    let quantity_kg: Kilograms = row.get("quantity_kg").map_err(|err| {
        RepoError::InvalidData(format!(
            "unreadable quantity in deposit_records.quantity_kg for id {id}: {err}"
        ))
    })?;

    Ok(DepositRecord {
        id,
        center_id: row.get("center_id")?,
        category_id: row.get("category_id")?,
        quantity_kg,
        deposited_at: row.get("deposited_at")?,
    })
}
