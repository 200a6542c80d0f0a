//! Connection configuration injected into the deposit recorder.
//!
//! # Responsibility
//! - Carry the store endpoint, optional credentials and lock timeout.
//! - Load the same settings from process environment for binaries/tests.
//!
//! # Invariants
//! - `endpoint` is never blank after `validate()`.
//! - `timeout_ms` is in `1..=MAX_TIMEOUT_MS` after `validate()`.
//! - Credential secrets never appear in `Debug` output or logs.
//!
//! # Environment
//! - `RECICLAJE_DB_ENDPOINT` - database path or `file:` URI (required)
//! - `RECICLAJE_DB_USER` / `RECICLAJE_DB_PASSWORD` - optional, both or neither
//! - `RECICLAJE_DB_TIMEOUT_MS` - lock wait bound in milliseconds (default 5000)

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::time::Duration;

pub const ENV_ENDPOINT: &str = "RECICLAJE_DB_ENDPOINT";
pub const ENV_USER: &str = "RECICLAJE_DB_USER";
pub const ENV_PASSWORD: &str = "RECICLAJE_DB_PASSWORD";
pub const ENV_TIMEOUT_MS: &str = "RECICLAJE_DB_TIMEOUT_MS";

pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
/// SQLite takes its busy timeout as an `i32` millisecond count.
pub const MAX_TIMEOUT_MS: u64 = i32::MAX as u64;

/// Configuration loading/validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingEnvVar(&'static str),
    InvalidValue { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEnvVar(key) => write!(f, "missing required environment variable: {key}"),
            Self::InvalidValue { key, message } => write!(f, "invalid value for {key}: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Username/password pair for stores that authenticate.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Settings used to open one store connection per recorded deposit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecorderConfig {
    /// SQLite database path or `file:` URI. The database must already exist.
    pub endpoint: String,
    /// Accepted for parity with authenticating stores; SQLite does not use them.
    #[serde(default)]
    pub credentials: Option<Credentials>,
    /// Upper bound on waiting for a locked database.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl RecorderConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            credentials: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Checks values that would otherwise only fail at connection time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "endpoint",
                message: "must not be blank".to_string(),
            });
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::InvalidValue {
                key: "timeout_ms",
                message: format!(
                    "{} exceeds the maximum of {MAX_TIMEOUT_MS}",
                    self.timeout_ms
                ),
            });
        }
        Ok(())
    }

    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let endpoint = read(ENV_ENDPOINT).ok_or(ConfigError::MissingEnvVar(ENV_ENDPOINT))?;

        let credentials = match (read(ENV_USER), read(ENV_PASSWORD)) {
            (Some(username), Some(password)) => Some(Credentials::new(username, password)),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::MissingEnvVar(ENV_PASSWORD)),
            (None, Some(_)) => return Err(ConfigError::MissingEnvVar(ENV_USER)),
        };

        let timeout_ms = match read(ENV_TIMEOUT_MS) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|err| ConfigError::InvalidValue {
                key: ENV_TIMEOUT_MS,
                message: format!("`{raw}` is not a millisecond count: {err}"),
            })?,
            None => DEFAULT_TIMEOUT_MS,
        };

        let config = Self {
            endpoint,
            credentials,
            timeout_ms,
        };
        config.validate()?;
        Ok(config)
    }
}
