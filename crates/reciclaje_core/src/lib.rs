//! Recycling deposit recording over a relational store.
//!
//! Resolves collection-center and material-category names to identifiers and
//! inserts one deposit row per call inside a single transaction. Every
//! caller-supplied value is passed to SQLite as a bound parameter.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, Credentials, RecorderConfig};
pub use logging::{default_log_level, init_logging, logging_status, sanitize_for_log};
pub use model::deposit::{
    CategoryId, CenterId, DepositId, DepositReceipt, DepositRecord, DepositRequest,
    DepositValidationError, Kilograms, NewDeposit,
};
pub use repo::deposit_repo::{
    DepositListQuery, DepositRepository, RepoError, RepoResult, SqliteDepositRepository,
};
pub use service::deposit_recorder::{
    Connector, DepositRecorder, RecordError, RecordErrorKind, SqliteConnector,
};
