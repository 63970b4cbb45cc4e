//! Digital Key Pool
//!
//! A pool of unique, single-use keys per inventory unit. A key is
//! claimed by linking it to an order item; it only becomes USED when
//! the owning order completes. `quantity` on the unit mirrors the key
//! count, so [`claim_one`] is always called right after a successful
//! `ledger::reserve(unit_id, 1)` in the same transaction, and
//! [`import_keys`] restocks the unit for every key it actually inserts.

use super::{InventoryError, InventoryResult};
use sha2::{Digest, Sha256};
use shared::models::DigitalKey;
use shared::util;
use sqlx::SqliteConnection;

const KEY_COLUMNS: &str = "id, unit_id, status, content_hash, payload, order_id, order_item_id";

/// Claim one unused, unlinked key for the given order item
///
/// The selection and the link happen in a single UPDATE with a
/// sub-select, so two concurrent claims can never pick the same key.
/// Selection order is insertion order; not an observable guarantee.
pub async fn claim_one(
    conn: &mut SqliteConnection,
    unit_id: &str,
    order_id: &str,
    order_item_id: &str,
) -> InventoryResult<DigitalKey> {
    let claimed = sqlx::query_as::<_, DigitalKey>(&format!(
        "UPDATE digital_key SET order_id = ?, order_item_id = ? \
         WHERE id = (SELECT id FROM digital_key \
                     WHERE unit_id = ? AND status = 'UNUSED' AND order_item_id IS NULL \
                     ORDER BY rowid LIMIT 1) \
         RETURNING {KEY_COLUMNS}"
    ))
    .bind(order_id)
    .bind(order_item_id)
    .bind(unit_id)
    .fetch_optional(conn)
    .await?;

    claimed.ok_or_else(|| InventoryError::NoKeysAvailable {
        unit_id: unit_id.to_string(),
    })
}

/// Release a single claimed key back to the pool (status stays UNUSED)
pub async fn release(conn: &mut SqliteConnection, key_id: &str) -> InventoryResult<()> {
    sqlx::query(
        "UPDATE digital_key SET order_id = NULL, order_item_id = NULL \
         WHERE id = ? AND status = 'UNUSED'",
    )
    .bind(key_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Release every key claimed by an order (cancellation / expiry path)
pub async fn release_for_order(conn: &mut SqliteConnection, order_id: &str) -> InventoryResult<u64> {
    let result = sqlx::query(
        "UPDATE digital_key SET order_id = NULL, order_item_id = NULL \
         WHERE order_id = ? AND status = 'UNUSED'",
    )
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Permanently consume a key (order completed; irreversible)
pub async fn consume(conn: &mut SqliteConnection, key_id: &str) -> InventoryResult<()> {
    sqlx::query("UPDATE digital_key SET status = 'USED' WHERE id = ?")
        .bind(key_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Consume every key claimed by an order
pub async fn consume_for_order(conn: &mut SqliteConnection, order_id: &str) -> InventoryResult<u64> {
    let result = sqlx::query("UPDATE digital_key SET status = 'USED' WHERE order_id = ?")
        .bind(order_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Keys claimed by an order
pub async fn find_for_order(
    conn: &mut SqliteConnection,
    order_id: &str,
) -> InventoryResult<Vec<DigitalKey>> {
    let rows = sqlx::query_as::<_, DigitalKey>(&format!(
        "SELECT {KEY_COLUMNS} FROM digital_key WHERE order_id = ?"
    ))
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

/// Bulk-import encrypted key payloads for a unit
///
/// Duplicates (same plaintext hash within the unit) are skipped via
/// `INSERT OR IGNORE` on the UNIQUE `(unit_id, content_hash)` index.
/// Every key actually inserted restocks the unit's quantity by one so
/// the stock counter keeps mirroring the pool size. Returns the number
/// of keys added.
pub async fn import_keys(
    conn: &mut SqliteConnection,
    unit_id: &str,
    keys: &[(String, String)], // (plaintext_for_hash, encrypted_payload)
) -> InventoryResult<u64> {
    let mut inserted = 0u64;
    for (plaintext, payload) in keys {
        let content_hash = hex::encode(Sha256::digest(plaintext.as_bytes()));
        let result = sqlx::query(
            "INSERT OR IGNORE INTO digital_key (id, unit_id, status, content_hash, payload) \
             VALUES (?, ?, 'UNUSED', ?, ?)",
        )
        .bind(util::new_id())
        .bind(unit_id)
        .bind(content_hash)
        .bind(payload)
        .execute(&mut *conn)
        .await?;
        inserted += result.rows_affected();
    }

    if inserted > 0 {
        sqlx::query("UPDATE inventory_unit SET quantity = quantity + ? WHERE id = ?")
            .bind(inserted as i64)
            .bind(unit_id)
            .execute(conn)
            .await?;
    }
    Ok(inserted)
}
