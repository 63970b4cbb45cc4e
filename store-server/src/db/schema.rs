//! Schema bootstrap
//!
//! # Tables
//!
//! | Table | Purpose |
//! |-------|---------|
//! | `inventory_unit` | variant + stock counter `(quantity, reserved)` |
//! | `digital_key` | single-use key pool, UNIQUE content hash per unit |
//! | `orders` | order aggregate (append-only history via status) |
//! | `order_item` | immutable line items with price snapshot |
//! | `payment` | one payment per order (UNIQUE order_id) |
//! | `refund_request` | one refund request per order (UNIQUE order_id) |
//! | `refund` | realized refund amount, written on finalize |
//!
//! The `CHECK (reserved >= 0 AND reserved <= quantity)` constraint is a
//! backstop; the stock ledger's conditional updates never violate it.

use sqlx::SqlitePool;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS inventory_unit (
        id              TEXT PRIMARY KEY,
        name            TEXT NOT NULL,
        price           REAL NOT NULL,
        cost_price      REAL NOT NULL DEFAULT 0,
        color           TEXT,
        is_digital      INTEGER NOT NULL DEFAULT 0,
        is_active       INTEGER NOT NULL DEFAULT 1,
        quantity        INTEGER NOT NULL DEFAULT 0,
        reserved        INTEGER NOT NULL DEFAULT 0,
        CHECK (reserved >= 0 AND reserved <= quantity)
    )",
    "CREATE TABLE IF NOT EXISTS digital_key (
        id              TEXT PRIMARY KEY,
        unit_id         TEXT NOT NULL REFERENCES inventory_unit(id),
        status          TEXT NOT NULL DEFAULT 'UNUSED',
        content_hash    TEXT NOT NULL,
        payload         TEXT NOT NULL,
        order_id        TEXT,
        order_item_id   TEXT,
        UNIQUE (unit_id, content_hash)
    )",
    "CREATE INDEX IF NOT EXISTS idx_digital_key_pool
        ON digital_key (unit_id, status, order_item_id)",
    "CREATE TABLE IF NOT EXISTS orders (
        id               TEXT PRIMARY KEY,
        user_id          TEXT NOT NULL,
        order_type       TEXT NOT NULL,
        payment_method   TEXT NOT NULL,
        status           TEXT NOT NULL,
        sub_total        REAL NOT NULL,
        discount_amount  REAL NOT NULL DEFAULT 0,
        shipping_fee     REAL NOT NULL DEFAULT 0,
        total_amount     REAL NOT NULL,
        shipping_address TEXT,
        tracking_code    TEXT,
        expired_at       INTEGER,
        cancelled_at     INTEGER,
        completed_at     INTEGER,
        created_at       INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_orders_status_expired
        ON orders (status, expired_at)",
    "CREATE TABLE IF NOT EXISTS order_item (
        id              TEXT PRIMARY KEY,
        order_id        TEXT NOT NULL REFERENCES orders(id),
        unit_id         TEXT NOT NULL REFERENCES inventory_unit(id),
        quantity        INTEGER NOT NULL,
        price           REAL NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_order_item_order ON order_item (order_id)",
    "CREATE TABLE IF NOT EXISTS payment (
        id              TEXT PRIMARY KEY,
        order_id        TEXT NOT NULL UNIQUE REFERENCES orders(id),
        method          TEXT NOT NULL,
        amount          REAL NOT NULL,
        transaction_id  TEXT NOT NULL,
        paid_at         INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS refund_request (
        id              TEXT PRIMARY KEY,
        order_id        TEXT NOT NULL UNIQUE REFERENCES orders(id),
        status          TEXT NOT NULL DEFAULT 'PENDING',
        requester_id    TEXT NOT NULL,
        reviewer_id     TEXT,
        finalizer_id    TEXT,
        reason          TEXT NOT NULL,
        created_at      INTEGER NOT NULL,
        reviewed_at     INTEGER,
        finalized_at    INTEGER
    )",
    "CREATE TABLE IF NOT EXISTS refund (
        id                TEXT PRIMARY KEY,
        refund_request_id TEXT NOT NULL UNIQUE REFERENCES refund_request(id),
        order_id          TEXT NOT NULL,
        amount            REAL NOT NULL,
        created_at        INTEGER NOT NULL
    )",
];

/// Create all tables and indexes if they don't exist
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
