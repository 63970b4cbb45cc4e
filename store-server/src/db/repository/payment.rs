//! Payment Repository

use super::RepoResult;
use shared::models::Payment;
use sqlx::{SqliteConnection, SqlitePool};

/// Insert the payment record for an order (within the caller's
/// transaction). The UNIQUE constraint on `order_id` enforces one
/// payment per order; a violation maps to [`super::RepoError::Duplicate`].
pub async fn insert(conn: &mut SqliteConnection, payment: &Payment) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO payment (id, order_id, method, amount, transaction_id, paid_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&payment.id)
    .bind(&payment.order_id)
    .bind(payment.method)
    .bind(payment.amount)
    .bind(&payment.transaction_id)
    .bind(payment.paid_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Find the payment for an order, if any
pub async fn find_by_order(pool: &SqlitePool, order_id: &str) -> RepoResult<Option<Payment>> {
    let row = sqlx::query_as::<_, Payment>(
        "SELECT id, order_id, method, amount, transaction_id, paid_at FROM payment WHERE order_id = ?",
    )
    .bind(order_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
