//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, transactions and repository calls.
//! - Keep callers decoupled from SQL and connection handling.

pub mod deposit_recorder;
