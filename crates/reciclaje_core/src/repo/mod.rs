//! Repository layer for the recycling store.
//!
//! # Responsibility
//! - Define the lookup/insert contract the recorder depends on.
//! - Keep SQL text and row decoding inside the persistence boundary.
//!
//! # Invariants
//! - Every caller-supplied value reaches SQLite as a bound parameter.
//! - Lookup misses are `Ok(None)`, not errors.

pub mod deposit_repo;
