//! Domain model for recycling deposits.
//!
//! # Responsibility
//! - Define identifiers and value types shared by repository and service.
//! - Own input validation for deposit requests.
//!
//! # Invariants
//! - Quantities are exact decimals; no binary floating point on the write path.

pub mod deposit;
