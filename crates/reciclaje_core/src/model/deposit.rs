//! Deposit domain model.
//!
//! # Responsibility
//! - Typed identifiers for centers, categories and deposit rows.
//! - `Kilograms` as an exact decimal that binds as SQL text.
//! - Request validation before any store access.
//!
//! # Invariants
//! - A validated `DepositRequest` has non-blank names and a quantity > 0.
//! - Names are kept exactly as supplied; trimming is only used for checks.

use rust_decimal::Decimal;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Identifier of an active collection center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CenterId(pub i64);

/// Identifier of a material category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CategoryId(pub i64);

/// Store-assigned identifier of a deposit row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DepositId(pub i64);

macro_rules! impl_id_sql {
    ($($name:ident),+) => {
        $(
            impl ToSql for $name {
                fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                    Ok(ToSqlOutput::from(self.0))
                }
            }

            impl FromSql for $name {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    i64::column_result(value).map(Self)
                }
            }

            impl Display for $name {
                fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )+
    };
}

impl_id_sql!(CenterId, CategoryId, DepositId);

/// Deposited weight in kilograms.
///
/// Stored as canonical decimal text so the caller's scale survives a
/// round-trip (`12.50` stays `12.50`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Kilograms(pub Decimal);

impl Kilograms {
    pub fn value(self) -> Decimal {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl Display for Kilograms {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Decimal> for Kilograms {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl ToSql for Kilograms {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Kilograms {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Text(bytes) => {
                let text =
                    std::str::from_utf8(bytes).map_err(|err| FromSqlError::Other(Box::new(err)))?;
                Decimal::from_str(text.trim())
                    .map(Self)
                    .map_err(|err| FromSqlError::Other(Box::new(err)))
            }
            ValueRef::Integer(value) => Ok(Self(Decimal::from(value))),
            ValueRef::Real(value) => Decimal::try_from(value)
                .map(Self)
                .map_err(|err| FromSqlError::Other(Box::new(err))),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// Why a deposit request was rejected before touching the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepositValidationError {
    BlankCenterName,
    BlankMaterialName,
    NonPositiveQuantity(Decimal),
}

impl Display for DepositValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankCenterName => write!(f, "center name must not be blank"),
            Self::BlankMaterialName => write!(f, "material name must not be blank"),
            Self::NonPositiveQuantity(value) => {
                write!(f, "quantity must be greater than 0 kg, got {value}")
            }
        }
    }
}

impl Error for DepositValidationError {}

/// Caller input for one deposit: two lookup names and a quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositRequest {
    pub center_name: String,
    pub material_name: String,
    pub quantity_kg: Kilograms,
}

impl DepositRequest {
    /// Builds and validates a request.
    ///
    /// # Errors
    /// - Returns the first violated constraint, checked in argument order.
    pub fn new(
        center_name: impl Into<String>,
        material_name: impl Into<String>,
        quantity_kg: Decimal,
    ) -> Result<Self, DepositValidationError> {
        let request = Self {
            center_name: center_name.into(),
            material_name: material_name.into(),
            quantity_kg: Kilograms(quantity_kg),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), DepositValidationError> {
        if self.center_name.trim().is_empty() {
            return Err(DepositValidationError::BlankCenterName);
        }
        if self.material_name.trim().is_empty() {
            return Err(DepositValidationError::BlankMaterialName);
        }
        if !self.quantity_kg.is_positive() {
            return Err(DepositValidationError::NonPositiveQuantity(self.quantity_kg.0));
        }
        Ok(())
    }
}

/// Resolved insert payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewDeposit {
    pub center_id: CenterId,
    pub category_id: CategoryId,
    pub quantity_kg: Kilograms,
}

/// Persisted deposit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositRecord {
    pub id: DepositId,
    pub center_id: CenterId,
    pub category_id: CategoryId,
    pub quantity_kg: Kilograms,
    /// Unix epoch milliseconds, assigned by the store.
    pub deposited_at: i64,
}

/// Result of a committed deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositReceipt {
    pub deposit_id: DepositId,
    pub center_id: CenterId,
    pub category_id: CategoryId,
    pub quantity_kg: Kilograms,
}
