//! Inventory primitives
//!
//! The two reservation primitives everything else builds on:
//!
//! - [`ledger`]: atomic stock counter mutations (reserve / release /
//!   commit / restock)
//! - [`keys`]: the digital key pool (claim / release / consume / import)
//!
//! Callers never hand-roll locking: every operation here is a single
//! conditional SQL statement, and multi-step flows compose them inside
//! one transaction.

pub mod keys;
pub mod ledger;

use thiserror::Error;

/// Inventory operation errors
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Reservation would push `reserved` past `quantity`
    #[error("insufficient stock for unit {unit_id}")]
    InsufficientStock { unit_id: String },

    /// Key pool has no UNUSED, unlinked key left
    #[error("no digital keys available for unit {unit_id}")]
    NoKeysAvailable { unit_id: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type InventoryResult<T> = Result<T, InventoryError>;
