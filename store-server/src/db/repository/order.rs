//! Order Repository

use super::RepoResult;
use shared::models::{Order, OrderItem, OrderStatus};
use sqlx::{SqliteConnection, SqlitePool};

const ORDER_COLUMNS: &str = "id, user_id, order_type, payment_method, status, sub_total, \
     discount_amount, shipping_fee, total_amount, shipping_address, tracking_code, \
     expired_at, cancelled_at, completed_at, created_at";

/// Insert a new order row (within the caller's transaction)
pub async fn insert(conn: &mut SqliteConnection, order: &Order) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO orders (id, user_id, order_type, payment_method, status, sub_total, \
         discount_amount, shipping_fee, total_amount, shipping_address, tracking_code, \
         expired_at, cancelled_at, completed_at, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&order.id)
    .bind(&order.user_id)
    .bind(order.order_type)
    .bind(order.payment_method)
    .bind(order.status)
    .bind(order.sub_total)
    .bind(order.discount_amount)
    .bind(order.shipping_fee)
    .bind(order.total_amount)
    .bind(&order.shipping_address)
    .bind(&order.tracking_code)
    .bind(order.expired_at)
    .bind(order.cancelled_at)
    .bind(order.completed_at)
    .bind(order.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Insert an order line item (within the caller's transaction)
pub async fn insert_item(conn: &mut SqliteConnection, item: &OrderItem) -> RepoResult<()> {
    sqlx::query("INSERT INTO order_item (id, order_id, unit_id, quantity, price) VALUES (?, ?, ?, ?, ?)")
        .bind(&item.id)
        .bind(&item.order_id)
        .bind(&item.unit_id)
        .bind(item.quantity)
        .bind(item.price)
        .execute(conn)
        .await?;
    Ok(())
}

/// Find an order by id
pub async fn find(pool: &SqlitePool, order_id: &str) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"))
        .bind(order_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Find an order by id inside an open transaction
pub async fn find_tx(conn: &mut SqliteConnection, order_id: &str) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"))
        .bind(order_id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

/// List items of an order
pub async fn find_items(pool: &SqlitePool, order_id: &str) -> RepoResult<Vec<OrderItem>> {
    let rows = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, unit_id, quantity, price FROM order_item WHERE order_id = ?",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// List items of an order inside an open transaction
pub async fn find_items_tx(conn: &mut SqliteConnection, order_id: &str) -> RepoResult<Vec<OrderItem>> {
    let rows = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, unit_id, quantity, price FROM order_item WHERE order_id = ?",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

/// Conditionally transition an order's status
///
/// Returns `true` only when the row still held `from` at execution
/// time. This is the race guard: check-then-transition collapses into
/// one atomic statement, so a concurrently committed transition (e.g.
/// payment callback vs sweeper) makes this a clean no-op instead of a
/// lost update. `cancelled_at`/`completed_at` are stamped when the
/// target status warrants it.
pub async fn transition_status(
    conn: &mut SqliteConnection,
    order_id: &str,
    from: OrderStatus,
    to: OrderStatus,
    now: i64,
) -> RepoResult<bool> {
    let cancelled_at = matches!(to, OrderStatus::Canceled).then_some(now);
    let completed_at = matches!(to, OrderStatus::Completed).then_some(now);
    let result = sqlx::query(
        "UPDATE orders SET status = ?, \
         cancelled_at = COALESCE(?, cancelled_at), \
         completed_at = COALESCE(?, completed_at) \
         WHERE id = ? AND status = ?",
    )
    .bind(to)
    .bind(cancelled_at)
    .bind(completed_at)
    .bind(order_id)
    .bind(from)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Record the carrier tracking code on an order
pub async fn set_tracking_code(
    conn: &mut SqliteConnection,
    order_id: &str,
    tracking_code: &str,
) -> RepoResult<()> {
    sqlx::query("UPDATE orders SET tracking_code = ? WHERE id = ?")
        .bind(tracking_code)
        .bind(order_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Ids of unpaid orders whose payment deadline has passed
pub async fn list_expired(pool: &SqlitePool, now: i64) -> RepoResult<Vec<String>> {
    let ids = sqlx::query_scalar::<_, String>(
        "SELECT id FROM orders WHERE status = 'PENDING_PAYMENT' AND expired_at < ?",
    )
    .bind(now)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}
