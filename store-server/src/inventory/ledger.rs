//! Stock Ledger - atomic reservation primitive
//!
//! Each inventory unit carries a `(quantity, reserved)` counter pair
//! with `available = quantity - reserved`. The canonical bug this
//! module exists to prevent: two buyers both read `available = 1` and
//! both succeed. Every mutation here is a single conditional UPDATE
//! whose `rows_affected` decides the outcome, so the check and the
//! increment are one atomic statement no matter how many callers race.
//!
//! All functions take `&mut SqliteConnection` so the caller composes
//! them with its own order mutation inside one transaction - the
//! reservation and the order row change commit or roll back together.

use super::{InventoryError, InventoryResult};
use sqlx::SqliteConnection;

/// Reserve `qty` units of stock
///
/// Fails with [`InventoryError::InsufficientStock`] when `qty` exceeds
/// `quantity - reserved` at execution time.
pub async fn reserve(conn: &mut SqliteConnection, unit_id: &str, qty: i64) -> InventoryResult<()> {
    let result = sqlx::query(
        "UPDATE inventory_unit SET reserved = reserved + ? \
         WHERE id = ? AND quantity - reserved >= ?",
    )
    .bind(qty)
    .bind(unit_id)
    .bind(qty)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(InventoryError::InsufficientStock {
            unit_id: unit_id.to_string(),
        });
    }
    Ok(())
}

/// Release `qty` reserved units back to the pool
///
/// Clamped at zero - a double release never drives `reserved` negative.
pub async fn release(conn: &mut SqliteConnection, unit_id: &str, qty: i64) -> InventoryResult<()> {
    sqlx::query("UPDATE inventory_unit SET reserved = MAX(0, reserved - ?) WHERE id = ?")
        .bind(qty)
        .bind(unit_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Convert a reservation into a permanent deduction (goods shipped)
pub async fn commit(conn: &mut SqliteConnection, unit_id: &str, qty: i64) -> InventoryResult<()> {
    sqlx::query(
        "UPDATE inventory_unit SET quantity = quantity - ?, reserved = MAX(0, reserved - ?) \
         WHERE id = ? AND quantity >= ?",
    )
    .bind(qty)
    .bind(qty)
    .bind(unit_id)
    .bind(qty)
    .execute(conn)
    .await?;
    Ok(())
}

/// Add `qty` units back to on-hand quantity (returned goods)
pub async fn restock(conn: &mut SqliteConnection, unit_id: &str, qty: i64) -> InventoryResult<()> {
    sqlx::query("UPDATE inventory_unit SET quantity = quantity + ? WHERE id = ?")
        .bind(qty)
        .bind(unit_id)
        .execute(conn)
        .await?;
    Ok(())
}
