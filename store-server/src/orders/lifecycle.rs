//! Order state machine
//!
//! # Transition table
//!
//! | From | Event | To |
//! |------|-------|----|
//! | (new, COD) | created | PENDING_CONFIRMATION |
//! | (new, WALLET) | created | PENDING_PAYMENT |
//! | PENDING_PAYMENT | gateway success | PAID (physical) / COMPLETED (digital) |
//! | PENDING_PAYMENT | gateway failure | FAILED |
//! | PENDING_PAYMENT | deadline passed | CANCELED |
//! | PENDING_CONFIRMATION | shop confirms | CONFIRMED |
//! | PAID | shop confirms | CONFIRMED |
//! | CONFIRMED | dispatched | SHIPPED |
//! | SHIPPED | delivery confirmed | DELIVERED |
//! | DELIVERED | settlement | COMPLETED |
//! | PAID / CONFIRMED / SHIPPED | refund finalized | CANCELED |
//! | COMPLETED | refund finalized (COD settled) | RETURNED |
//!
//! Anything not in the table is an [`OrderError::InvalidTransition`],
//! never a silent no-op. Persisted transitions additionally go through
//! [`repository::order::transition_status`], whose conditional UPDATE
//! re-validates the `from` status at commit time.

use super::error::{OrderError, OrderResult};
use crate::db::repository::order as order_repo;
use crate::inventory::ledger;
use crate::services::Collaborators;
use shared::models::{Order, OrderStatus, OrderType, PaymentMethod};
use shared::util;
use sqlx::SqlitePool;

/// Status a freshly created order starts in
pub fn initial_status(payment_method: PaymentMethod) -> OrderStatus {
    match payment_method {
        PaymentMethod::Cod => OrderStatus::PendingConfirmation,
        PaymentMethod::Wallet => OrderStatus::PendingPayment,
    }
}

/// Validate a transition against the table
pub fn check_transition(from: OrderStatus, to: OrderStatus) -> OrderResult<()> {
    use OrderStatus::*;
    let allowed = matches!(
        (from, to),
        (PendingConfirmation, Confirmed)
            | (PendingPayment, Paid)
            | (PendingPayment, Completed)
            | (PendingPayment, Failed)
            | (PendingPayment, Canceled)
            | (Paid, Confirmed)
            | (Paid, Canceled)
            | (Confirmed, Shipped)
            | (Confirmed, Canceled)
            | (Shipped, Delivered)
            | (Shipped, Canceled)
            | (Delivered, Completed)
            | (Completed, Returned)
    );
    if allowed {
        Ok(())
    } else {
        Err(OrderError::InvalidTransition { from, to })
    }
}

async fn load(pool: &SqlitePool, order_id: &str) -> OrderResult<Order> {
    order_repo::find(pool, order_id)
        .await?
        .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
}

/// Apply a simple guarded transition and return the refreshed order
async fn apply(pool: &SqlitePool, order_id: &str, to: OrderStatus) -> OrderResult<Order> {
    let order = load(pool, order_id).await?;
    check_transition(order.status, to)?;

    let mut tx = pool.begin().await?;
    let moved =
        order_repo::transition_status(&mut tx, order_id, order.status, to, util::now_millis())
            .await?;
    if !moved {
        // Lost the race to a concurrent transition; report against the
        // status that actually won.
        drop(tx);
        let current = load(pool, order_id).await?;
        return Err(OrderError::InvalidTransition {
            from: current.status,
            to,
        });
    }
    tx.commit().await?;

    tracing::info!(order_id = %order_id, from = ?order.status, to = ?to, "Order transitioned");
    load(pool, order_id).await
}

/// Shop confirms the order (PENDING_CONFIRMATION or PAID -> CONFIRMED)
pub async fn confirm_order(pool: &SqlitePool, order_id: &str) -> OrderResult<Order> {
    apply(pool, order_id, OrderStatus::Confirmed).await
}

/// Dispatch a confirmed physical order (CONFIRMED -> SHIPPED)
///
/// Books the shipment with the carrier first, then commits the stock
/// (reservation becomes a permanent deduction) and records the
/// tracking code in the same transaction as the status change.
pub async fn ship_order(
    pool: &SqlitePool,
    collaborators: &Collaborators,
    order_id: &str,
) -> OrderResult<Order> {
    let order = load(pool, order_id).await?;
    check_transition(order.status, OrderStatus::Shipped)?;
    if order.order_type != OrderType::Physical {
        return Err(OrderError::InvalidOperation(
            "only physical orders can be shipped".into(),
        ));
    }

    let tracking_code = collaborators
        .carrier
        .create_shipment(&order)
        .await
        .map_err(|e| OrderError::InvalidOperation(format!("carrier rejected shipment: {e}")))?;

    let mut tx = pool.begin().await?;
    let moved = order_repo::transition_status(
        &mut tx,
        order_id,
        order.status,
        OrderStatus::Shipped,
        util::now_millis(),
    )
    .await?;
    if !moved {
        drop(tx);
        // Shipment is already booked; undo it best-effort before
        // reporting the lost race.
        if let Err(e) = collaborators.carrier.cancel_shipment(&tracking_code).await {
            tracing::warn!(order_id = %order_id, error = %e, "Shipment cancellation failed");
        }
        let current = load(pool, order_id).await?;
        return Err(OrderError::InvalidTransition {
            from: current.status,
            to: OrderStatus::Shipped,
        });
    }
    let items = order_repo::find_items_tx(&mut tx, order_id).await?;
    for item in &items {
        ledger::commit(&mut tx, &item.unit_id, item.quantity).await?;
    }
    order_repo::set_tracking_code(&mut tx, order_id, &tracking_code).await?;
    tx.commit().await?;

    tracing::info!(order_id = %order_id, tracking_code = %tracking_code, "Order shipped");
    load(pool, order_id).await
}

/// Carrier reported delivery (SHIPPED -> DELIVERED)
pub async fn deliver_order(pool: &SqlitePool, order_id: &str) -> OrderResult<Order> {
    apply(pool, order_id, OrderStatus::Delivered).await
}

/// Settlement: money fully collected (DELIVERED -> COMPLETED)
pub async fn settle_order(
    pool: &SqlitePool,
    collaborators: &Collaborators,
    order_id: &str,
) -> OrderResult<Order> {
    let order = apply(pool, order_id, OrderStatus::Completed).await?;
    collaborators.dispatch_order_completed(&order);
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::orders::checkout::tests::{seed_unit, test_address, test_config};
    use crate::orders::checkout::{self, CartLine};
    use crate::services::{LogNotifier, LogPaymentGateway, ShippingCarrier};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Carrier that cancels the order while the shipment is being
    /// booked, standing in for a refund finalization winning the race.
    struct RacingCarrier {
        pool: SqlitePool,
        canceled: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ShippingCarrier for RacingCarrier {
        async fn create_shipment(&self, order: &Order) -> anyhow::Result<String> {
            let mut conn = self.pool.acquire().await?;
            order_repo::transition_status(
                &mut conn,
                &order.id,
                OrderStatus::Confirmed,
                OrderStatus::Canceled,
                util::now_millis(),
            )
            .await?;
            Ok(format!("trk-{}", order.id))
        }

        async fn cancel_shipment(&self, tracking_code: &str) -> anyhow::Result<()> {
            self.canceled.lock().unwrap().push(tracking_code.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_lost_ship_race_cancels_booked_shipment() {
        let pool = db::connect_in_memory().await.unwrap();
        seed_unit(&pool, "mug", 8.0, 5, false).await;
        let collab = Collaborators::logging();
        let lines = vec![CartLine { unit_id: "mug".into(), quantity: 1 }];
        let order = checkout::checkout_physical(
            &pool, &collab, &test_config(), "bob",
            PaymentMethod::Cod, &lines, &test_address(),
        )
        .await
        .unwrap();
        confirm_order(&pool, &order.id).await.unwrap();

        let canceled = Arc::new(Mutex::new(Vec::new()));
        let racing = Collaborators {
            gateway: Arc::new(LogPaymentGateway),
            carrier: Arc::new(RacingCarrier {
                pool: pool.clone(),
                canceled: canceled.clone(),
            }),
            notifier: Arc::new(LogNotifier),
        };

        let err = ship_order(&pool, &racing, &order.id).await.unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidTransition { from: OrderStatus::Canceled, to: OrderStatus::Shipped }
        ));
        // The booked shipment was compensated
        assert_eq!(canceled.lock().unwrap().as_slice(), [format!("trk-{}", order.id)]);
    }

    #[test]
    fn test_initial_status_by_method() {
        assert_eq!(
            initial_status(PaymentMethod::Cod),
            OrderStatus::PendingConfirmation
        );
        assert_eq!(
            initial_status(PaymentMethod::Wallet),
            OrderStatus::PendingPayment
        );
    }

    #[test]
    fn test_happy_path_transitions_allowed() {
        use OrderStatus::*;
        for (from, to) in [
            (PendingPayment, Paid),
            (Paid, Confirmed),
            (Confirmed, Shipped),
            (Shipped, Delivered),
            (Delivered, Completed),
        ] {
            assert!(check_transition(from, to).is_ok(), "{from:?} -> {to:?}");
        }
    }

    #[test]
    fn test_terminal_states_reject_everything_but_cod_return() {
        use OrderStatus::*;
        for from in [Canceled, Failed, Returned] {
            for to in [Paid, Confirmed, Shipped, Delivered, Completed, Canceled] {
                assert!(check_transition(from, to).is_err(), "{from:?} -> {to:?}");
            }
        }
        // The one exception: a settled COD order can be returned
        assert!(check_transition(Completed, Returned).is_ok());
        assert!(check_transition(Completed, Canceled).is_err());
    }

    #[test]
    fn test_illegal_jumps_rejected() {
        use OrderStatus::*;
        assert!(check_transition(PendingPayment, Shipped).is_err());
        assert!(check_transition(PendingConfirmation, Paid).is_err());
        assert!(check_transition(Shipped, Completed).is_err());
        assert!(check_transition(Delivered, Canceled).is_err());
        assert!(check_transition(Failed, PendingPayment).is_err());
    }
}
