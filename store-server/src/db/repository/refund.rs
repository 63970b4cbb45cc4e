//! Refund Repository

use super::RepoResult;
use shared::models::{Refund, RefundRequest, RefundStatus};
use sqlx::{SqliteConnection, SqlitePool};

const REQUEST_COLUMNS: &str = "id, order_id, status, requester_id, reviewer_id, finalizer_id, \
     reason, created_at, reviewed_at, finalized_at";

/// Insert a refund request. The UNIQUE constraint on `order_id`
/// enforces one request per order.
pub async fn insert_request(pool: &SqlitePool, request: &RefundRequest) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO refund_request (id, order_id, status, requester_id, reviewer_id, \
         finalizer_id, reason, created_at, reviewed_at, finalized_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&request.id)
    .bind(&request.order_id)
    .bind(request.status)
    .bind(&request.requester_id)
    .bind(&request.reviewer_id)
    .bind(&request.finalizer_id)
    .bind(&request.reason)
    .bind(request.created_at)
    .bind(request.reviewed_at)
    .bind(request.finalized_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Find a refund request by id
pub async fn find_request(pool: &SqlitePool, request_id: &str) -> RepoResult<Option<RefundRequest>> {
    let row = sqlx::query_as::<_, RefundRequest>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM refund_request WHERE id = ?"
    ))
    .bind(request_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Conditionally move a request out of PENDING (review step)
///
/// Returns `false` when the request was no longer PENDING.
pub async fn review_request(
    pool: &SqlitePool,
    request_id: &str,
    reviewer_id: &str,
    to: RefundStatus,
    now: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE refund_request SET status = ?, reviewer_id = ?, reviewed_at = ? \
         WHERE id = ? AND status = 'PENDING'",
    )
    .bind(to)
    .bind(reviewer_id)
    .bind(now)
    .bind(request_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Conditionally complete an APPROVED request (finalize step, within
/// the caller's transaction)
pub async fn complete_request(
    conn: &mut SqliteConnection,
    request_id: &str,
    finalizer_id: &str,
    now: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE refund_request SET status = 'COMPLETED', finalizer_id = ?, finalized_at = ? \
         WHERE id = ? AND status = 'APPROVED'",
    )
    .bind(finalizer_id)
    .bind(now)
    .bind(request_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Insert the realized refund record (within the caller's transaction)
pub async fn insert_refund(conn: &mut SqliteConnection, refund: &Refund) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO refund (id, refund_request_id, order_id, amount, created_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&refund.id)
    .bind(&refund.refund_request_id)
    .bind(&refund.order_id)
    .bind(refund.amount)
    .bind(refund.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Find the realized refund for a request, if finalized
pub async fn find_refund(pool: &SqlitePool, request_id: &str) -> RepoResult<Option<Refund>> {
    let row = sqlx::query_as::<_, Refund>(
        "SELECT id, refund_request_id, order_id, amount, created_at FROM refund \
         WHERE refund_request_id = ?",
    )
    .bind(request_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
