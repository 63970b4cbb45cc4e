//! Inventory Unit Repository
//!
//! Catalog-side reads plus unit creation. The stock counter columns
//! are mutated exclusively through the stock ledger
//! ([`crate::inventory::ledger`]), never here.

use super::RepoResult;
use shared::models::InventoryUnit;
use sqlx::{SqliteConnection, SqlitePool};

const UNIT_COLUMNS: &str =
    "id, name, price, cost_price, color, is_digital, is_active, quantity, reserved";

/// Create an inventory unit
pub async fn insert(conn: &mut SqliteConnection, unit: &InventoryUnit) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO inventory_unit (id, name, price, cost_price, color, is_digital, \
         is_active, quantity, reserved) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&unit.id)
    .bind(&unit.name)
    .bind(unit.price)
    .bind(unit.cost_price)
    .bind(&unit.color)
    .bind(unit.is_digital)
    .bind(unit.is_active)
    .bind(unit.quantity)
    .bind(unit.reserved)
    .execute(conn)
    .await?;
    Ok(())
}

/// Find a unit by id
pub async fn find(pool: &SqlitePool, unit_id: &str) -> RepoResult<Option<InventoryUnit>> {
    let row = sqlx::query_as::<_, InventoryUnit>(&format!(
        "SELECT {UNIT_COLUMNS} FROM inventory_unit WHERE id = ?"
    ))
    .bind(unit_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Find a unit by id inside an open transaction
pub async fn find_tx(conn: &mut SqliteConnection, unit_id: &str) -> RepoResult<Option<InventoryUnit>> {
    let row = sqlx::query_as::<_, InventoryUnit>(&format!(
        "SELECT {UNIT_COLUMNS} FROM inventory_unit WHERE id = ?"
    ))
    .bind(unit_id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}
