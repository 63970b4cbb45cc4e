//! Expiration sweeper
//!
//! Periodically cancels PENDING_PAYMENT orders whose payment deadline
//! has passed and returns their holds to the pool. Expiry is enforced
//! here only; a late gateway callback racing the sweep loses cleanly
//! through the conditional status transition, whichever side commits
//! first wins.

use crate::db::repository::order as order_repo;
use crate::inventory::{keys, ledger};
use crate::orders::error::OrderResult;
use shared::models::OrderStatus;
use shared::util;
use sqlx::SqlitePool;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Cancel every expired unpaid order; returns how many were canceled
///
/// Each order gets its own transaction so one poisoned row never
/// blocks the rest of the sweep.
pub async fn sweep(pool: &SqlitePool) -> OrderResult<usize> {
    let now = util::now_millis();
    let expired = order_repo::list_expired(pool, now).await?;
    let mut canceled = 0usize;

    for order_id in expired {
        match cancel_expired(pool, &order_id, now).await {
            Ok(true) => canceled += 1,
            Ok(false) => {} // paid or canceled in the meantime
            Err(e) => {
                tracing::error!(order_id = %order_id, error = %e, "Failed to cancel expired order");
            }
        }
    }

    if canceled > 0 {
        tracing::info!(count = canceled, "Expired orders canceled");
    }
    Ok(canceled)
}

async fn cancel_expired(pool: &SqlitePool, order_id: &str, now: i64) -> OrderResult<bool> {
    let mut tx = pool.begin().await?;
    let moved = order_repo::transition_status(
        &mut tx,
        order_id,
        OrderStatus::PendingPayment,
        OrderStatus::Canceled,
        now,
    )
    .await?;
    if !moved {
        return Ok(false);
    }
    let items = order_repo::find_items_tx(&mut tx, order_id).await?;
    for item in &items {
        ledger::release(&mut tx, &item.unit_id, item.quantity).await?;
    }
    keys::release_for_order(&mut tx, order_id).await?;
    tx.commit().await?;
    Ok(true)
}

/// Sweep loop for the background task manager
pub async fn run(pool: SqlitePool, interval: Duration, token: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                tracing::info!("Expiration sweeper stopped");
                break;
            }
            _ = ticker.tick() => {
                if let Err(e) = sweep(&pool).await {
                    tracing::error!(error = %e, "Expiration sweep failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::db::repository::unit as unit_repo;
    use crate::orders::checkout::tests::{seed_keys, seed_unit, test_address};
    use crate::orders::checkout::{self, CartLine, CheckoutConfig};
    use crate::services::Collaborators;
    use shared::models::PaymentMethod;

    fn expired_config() -> CheckoutConfig {
        // Deadline already in the past when the order is created
        CheckoutConfig {
            order_ttl_ms: -1000,
            flat_shipping_fee: 5.0,
        }
    }

    #[tokio::test]
    async fn test_sweep_cancels_expired_and_releases_holds() {
        let pool = db::connect_in_memory().await.unwrap();
        seed_unit(&pool, "game", 20.0, 0, true).await;
        seed_keys(&pool, "game", 1).await;
        let collab = Collaborators::logging();
        let order = checkout::buy_now_digital(&pool, &collab, &expired_config(), "alice", "game")
            .await
            .unwrap();

        assert_eq!(sweep(&pool).await.unwrap(), 1);

        let swept = order_repo::find(&pool, &order.id).await.unwrap().unwrap();
        assert_eq!(swept.status, OrderStatus::Canceled);
        assert!(swept.cancelled_at.is_some());

        // Key and stock back in the pool
        let unit = unit_repo::find(&pool, "game").await.unwrap().unwrap();
        assert_eq!((unit.quantity, unit.reserved), (1, 0));
        let mut conn = pool.acquire().await.unwrap();
        let linked = keys::find_for_order(&mut conn, &order.id).await.unwrap();
        assert!(linked.is_empty());
    }

    #[tokio::test]
    async fn test_sweep_skips_unexpired_orders() {
        let pool = db::connect_in_memory().await.unwrap();
        seed_unit(&pool, "mug", 8.0, 5, false).await;
        let collab = Collaborators::logging();
        let cfg = CheckoutConfig {
            order_ttl_ms: 60 * 60 * 1000,
            flat_shipping_fee: 5.0,
        };
        let lines = vec![CartLine { unit_id: "mug".into(), quantity: 1 }];
        let order = checkout::checkout_physical(
            &pool, &collab, &cfg, "bob",
            PaymentMethod::Wallet, &lines, &test_address(),
        )
        .await
        .unwrap();

        assert_eq!(sweep(&pool).await.unwrap(), 0);
        let untouched = order_repo::find(&pool, &order.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, OrderStatus::PendingPayment);
    }

    #[tokio::test]
    async fn test_sweep_released_stock_is_sellable_again() {
        let pool = db::connect_in_memory().await.unwrap();
        seed_unit(&pool, "game", 20.0, 0, true).await;
        seed_keys(&pool, "game", 1).await;
        let collab = Collaborators::logging();

        checkout::buy_now_digital(&pool, &collab, &expired_config(), "alice", "game")
            .await
            .unwrap();
        // Sole key is held by the expired order
        assert!(
            checkout::buy_now_digital(&pool, &collab, &expired_config(), "bob", "game")
                .await
                .is_err()
        );

        sweep(&pool).await.unwrap();

        let order = checkout::buy_now_digital(&pool, &collab, &expired_config(), "bob", "game")
            .await
            .unwrap();
        assert_eq!(order.user_id, "bob");
    }
}
