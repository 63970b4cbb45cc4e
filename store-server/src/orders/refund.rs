//! Refund workflow
//!
//! Three steps, three actors: the customer requests, a reviewer
//! approves or rejects, a finalizer completes. Money moves and stock
//! reconciles only at finalization.
//!
//! Eligibility is asymmetric by payment method. A COD order has no
//! money to return before settlement (the courier simply isn't paid),
//! so only COMPLETED is refundable. A wallet order was charged up
//! front, so PAID, CONFIRMED, and SHIPPED all qualify.
//!
//! Stock reconciliation at finalization depends on where the order
//! stood:
//! - PAID / CONFIRMED: reservation released, order canceled
//! - SHIPPED: stock restocked (already committed at ship time), order
//!   canceled, shipment cancellation attempted best-effort
//! - COMPLETED (COD return): no stock action, order returned

use super::error::{OrderError, OrderResult};
use super::money;
use crate::db::repository::{
    RepoError, order as order_repo, payment as payment_repo, refund as refund_repo,
};
use crate::inventory::ledger;
use crate::services::Collaborators;
use shared::models::{Order, OrderStatus, PaymentMethod, Refund, RefundRequest, RefundStatus};
use shared::util;
use sqlx::SqlitePool;

fn check_eligibility(order: &Order) -> OrderResult<()> {
    let eligible = match order.payment_method {
        PaymentMethod::Cod => order.status == OrderStatus::Completed,
        PaymentMethod::Wallet => matches!(
            order.status,
            OrderStatus::Paid | OrderStatus::Confirmed | OrderStatus::Shipped
        ),
    };
    if eligible {
        Ok(())
    } else {
        let reason = match order.payment_method {
            PaymentMethod::Cod => "COD orders are refundable only after settlement",
            PaymentMethod::Wallet => "wallet orders are refundable only between payment and delivery",
        };
        Err(OrderError::IneligibleForRefund {
            order_id: order.id.clone(),
            reason: reason.to_string(),
        })
    }
}

/// Customer files a refund request for an order
pub async fn create_request(
    pool: &SqlitePool,
    requester_id: &str,
    order_id: &str,
    reason: &str,
) -> OrderResult<RefundRequest> {
    let order = order_repo::find(pool, order_id)
        .await?
        .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;
    check_eligibility(&order)?;

    let request = RefundRequest {
        id: util::new_id(),
        order_id: order_id.to_string(),
        status: RefundStatus::Pending,
        requester_id: requester_id.to_string(),
        reviewer_id: None,
        finalizer_id: None,
        reason: reason.to_string(),
        created_at: util::now_millis(),
        reviewed_at: None,
        finalized_at: None,
    };
    match refund_repo::insert_request(pool, &request).await {
        Ok(()) => {
            tracing::info!(order_id = %order_id, request_id = %request.id, "Refund requested");
            Ok(request)
        }
        Err(RepoError::Duplicate(_)) => Err(OrderError::DuplicateRefundRequest(order_id.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// Reviewer approves or rejects a pending request
pub async fn review(
    pool: &SqlitePool,
    reviewer_id: &str,
    request_id: &str,
    approve: bool,
) -> OrderResult<RefundRequest> {
    let to = if approve {
        RefundStatus::Approved
    } else {
        RefundStatus::Rejected
    };
    let moved =
        refund_repo::review_request(pool, request_id, reviewer_id, to, util::now_millis()).await?;
    if !moved {
        let request = refund_repo::find_request(pool, request_id)
            .await?
            .ok_or_else(|| OrderError::RefundNotFound(request_id.to_string()))?;
        return Err(OrderError::InvalidOperation(format!(
            "refund request {request_id} is {:?}, not pending",
            request.status
        )));
    }

    tracing::info!(request_id = %request_id, outcome = ?to, "Refund request reviewed");
    refund_repo::find_request(pool, request_id)
        .await?
        .ok_or_else(|| OrderError::RefundNotFound(request_id.to_string()))
}

/// Finalizer completes an approved request: moves the money, settles
/// the order status, and reconciles stock, all in one transaction.
pub async fn finalize(
    pool: &SqlitePool,
    collaborators: &Collaborators,
    finalizer_id: &str,
    request_id: &str,
) -> OrderResult<Refund> {
    let request = refund_repo::find_request(pool, request_id)
        .await?
        .ok_or_else(|| OrderError::RefundNotFound(request_id.to_string()))?;
    let order = order_repo::find(pool, &request.order_id)
        .await?
        .ok_or_else(|| OrderError::OrderNotFound(request.order_id.clone()))?;

    // A wallet refund must hand back what the gateway collected; drift
    // against the recorded payment means the order rows were tampered
    // with and a human needs to look.
    if order.payment_method == PaymentMethod::Wallet
        && let Some(payment) = payment_repo::find_by_order(pool, &order.id).await?
        && !money::approx_eq(payment.amount, order.total_amount)
    {
        tracing::warn!(
            order_id = %order.id,
            paid = payment.amount,
            total = order.total_amount,
            "Refund amount differs from recorded payment"
        );
    }

    let now = util::now_millis();
    let mut tx = pool.begin().await?;
    let moved = refund_repo::complete_request(&mut tx, request_id, finalizer_id, now).await?;
    if !moved {
        return Err(OrderError::InvalidOperation(format!(
            "refund request {request_id} is {:?}, not approved",
            request.status
        )));
    }

    // Re-read inside the transaction; the order may have moved since
    // eligibility was checked at request time.
    let order = order_repo::find_tx(&mut tx, &order.id)
        .await?
        .ok_or_else(|| OrderError::OrderNotFound(order.id.clone()))?;
    let items = order_repo::find_items_tx(&mut tx, &order.id).await?;

    let target = match order.status {
        OrderStatus::Paid | OrderStatus::Confirmed => {
            // Reservation still held, give it back
            for item in &items {
                ledger::release(&mut tx, &item.unit_id, item.quantity).await?;
            }
            OrderStatus::Canceled
        }
        OrderStatus::Shipped => {
            // Stock was committed at ship time; the goods come back
            for item in &items {
                ledger::restock(&mut tx, &item.unit_id, item.quantity).await?;
            }
            OrderStatus::Canceled
        }
        // Post-settlement COD return keeps the goods movement as-is
        OrderStatus::Completed => OrderStatus::Returned,
        other => {
            return Err(OrderError::InvalidTransition {
                from: other,
                to: OrderStatus::Canceled,
            });
        }
    };
    let transitioned =
        order_repo::transition_status(&mut tx, &order.id, order.status, target, now).await?;
    if !transitioned {
        return Err(OrderError::InvalidTransition {
            from: order.status,
            to: target,
        });
    }

    let refund = Refund {
        id: util::new_id(),
        refund_request_id: request_id.to_string(),
        order_id: order.id.clone(),
        amount: order.total_amount,
        created_at: now,
    };
    refund_repo::insert_refund(&mut tx, &refund).await?;
    tx.commit().await?;

    tracing::info!(
        request_id = %request_id,
        order_id = %order.id,
        amount = refund.amount,
        "Refund finalized"
    );

    // Best-effort: a shipped order in transit needs the carrier told
    if let Some(tracking) = &order.tracking_code
        && target == OrderStatus::Canceled
        && let Err(e) = collaborators.carrier.cancel_shipment(tracking).await
    {
        tracing::warn!(order_id = %order.id, error = %e, "Shipment cancellation failed");
    }
    collaborators.dispatch_refund_processed(&order, refund.amount);
    Ok(refund)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::db::repository::unit as unit_repo;
    use crate::orders::checkout::tests::{seed_unit, test_address, test_config};
    use crate::orders::checkout::{self, CartLine};
    use crate::orders::{confirm, lifecycle};
    use shared::models::PaymentOutcome;

    const SECRET: &[u8] = b"test-callback-secret";

    async fn paid_wallet_order(pool: &SqlitePool, collab: &Collaborators) -> Order {
        seed_unit(pool, "mug", 8.0, 5, false).await;
        let lines = vec![CartLine { unit_id: "mug".into(), quantity: 2 }];
        let order = checkout::checkout_physical(
            pool, collab, &test_config(), "bob",
            PaymentMethod::Wallet, &lines, &test_address(),
        )
        .await
        .unwrap();
        let cb = confirm::PaymentCallback {
            order_id: order.id.clone(),
            outcome: PaymentOutcome::Success,
            transaction_id: "txn-1".into(),
            signature: confirm::sign(SECRET, &order.id, "txn-1", PaymentOutcome::Success),
        };
        confirm::on_payment_result(pool, collab, SECRET, &cb).await.unwrap()
    }

    async fn completed_cod_order(pool: &SqlitePool, collab: &Collaborators) -> Order {
        seed_unit(pool, "mug", 8.0, 5, false).await;
        let lines = vec![CartLine { unit_id: "mug".into(), quantity: 2 }];
        let order = checkout::checkout_physical(
            pool, collab, &test_config(), "bob",
            PaymentMethod::Cod, &lines, &test_address(),
        )
        .await
        .unwrap();
        lifecycle::confirm_order(pool, &order.id).await.unwrap();
        lifecycle::ship_order(pool, collab, &order.id).await.unwrap();
        lifecycle::deliver_order(pool, &order.id).await.unwrap();
        lifecycle::settle_order(pool, collab, &order.id).await.unwrap()
    }

    #[tokio::test]
    async fn test_cod_refund_requires_settlement() {
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

        let err = create_request(&pool, "bob", &order.id, "changed my mind")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::IneligibleForRefund { .. }));
    }

    #[tokio::test]
    async fn test_wallet_refund_from_paid_releases_reservation() {
        let pool = db::connect_in_memory().await.unwrap();
        let collab = Collaborators::logging();
        let order = paid_wallet_order(&pool, &collab).await;
        assert_eq!(order.status, OrderStatus::Paid);

        let request = create_request(&pool, "bob", &order.id, "wrong size").await.unwrap();
        review(&pool, "reviewer-1", &request.id, true).await.unwrap();
        let refund = finalize(&pool, &collab, "finalizer-1", &request.id).await.unwrap();
        assert_eq!(refund.amount, order.total_amount);

        let refunded = order_repo::find(&pool, &order.id).await.unwrap().unwrap();
        assert_eq!(refunded.status, OrderStatus::Canceled);
        let unit = unit_repo::find(&pool, "mug").await.unwrap().unwrap();
        assert_eq!((unit.quantity, unit.reserved), (5, 0));
    }

    #[tokio::test]
    async fn test_wallet_refund_from_shipped_restocks() {
        let pool = db::connect_in_memory().await.unwrap();
        let collab = Collaborators::logging();
        let order = paid_wallet_order(&pool, &collab).await;
        lifecycle::confirm_order(&pool, &order.id).await.unwrap();
        lifecycle::ship_order(&pool, &collab, &order.id).await.unwrap();

        // Shipment committed the stock
        let unit = unit_repo::find(&pool, "mug").await.unwrap().unwrap();
        assert_eq!((unit.quantity, unit.reserved), (3, 0));

        let request = create_request(&pool, "bob", &order.id, "damaged").await.unwrap();
        review(&pool, "reviewer-1", &request.id, true).await.unwrap();
        finalize(&pool, &collab, "finalizer-1", &request.id).await.unwrap();

        let refunded = order_repo::find(&pool, &order.id).await.unwrap().unwrap();
        assert_eq!(refunded.status, OrderStatus::Canceled);
        let unit = unit_repo::find(&pool, "mug").await.unwrap().unwrap();
        assert_eq!((unit.quantity, unit.reserved), (5, 0));
    }

    #[tokio::test]
    async fn test_cod_return_keeps_stock_as_is() {
        let pool = db::connect_in_memory().await.unwrap();
        let collab = Collaborators::logging();
        let order = completed_cod_order(&pool, &collab).await;
        assert_eq!(order.status, OrderStatus::Completed);

        let request = create_request(&pool, "bob", &order.id, "defective").await.unwrap();
        review(&pool, "reviewer-1", &request.id, true).await.unwrap();
        let refund = finalize(&pool, &collab, "finalizer-1", &request.id).await.unwrap();
        assert_eq!(refund.amount, order.total_amount);

        let returned = order_repo::find(&pool, &order.id).await.unwrap().unwrap();
        assert_eq!(returned.status, OrderStatus::Returned);
        // No restock on a post-settlement return
        let unit = unit_repo::find(&pool, "mug").await.unwrap().unwrap();
        assert_eq!((unit.quantity, unit.reserved), (3, 0));
    }

    #[tokio::test]
    async fn test_second_request_for_same_order_rejected() {
        let pool = db::connect_in_memory().await.unwrap();
        let collab = Collaborators::logging();
        let order = paid_wallet_order(&pool, &collab).await;

        create_request(&pool, "bob", &order.id, "first").await.unwrap();
        let err = create_request(&pool, "bob", &order.id, "second").await.unwrap_err();
        assert!(matches!(err, OrderError::DuplicateRefundRequest(_)));
    }

    #[tokio::test]
    async fn test_rejected_request_cannot_finalize() {
        let pool = db::connect_in_memory().await.unwrap();
        let collab = Collaborators::logging();
        let order = paid_wallet_order(&pool, &collab).await;

        let request = create_request(&pool, "bob", &order.id, "nah").await.unwrap();
        review(&pool, "reviewer-1", &request.id, false).await.unwrap();
        let err = finalize(&pool, &collab, "finalizer-1", &request.id).await.unwrap_err();
        assert!(matches!(err, OrderError::InvalidOperation(_)));

        // Order untouched
        let untouched = order_repo::find(&pool, &order.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn test_double_review_rejected() {
        let pool = db::connect_in_memory().await.unwrap();
        let collab = Collaborators::logging();
        let order = paid_wallet_order(&pool, &collab).await;

        let request = create_request(&pool, "bob", &order.id, "dup review").await.unwrap();
        review(&pool, "reviewer-1", &request.id, true).await.unwrap();
        let err = review(&pool, "reviewer-2", &request.id, false).await.unwrap_err();
        assert!(matches!(err, OrderError::InvalidOperation(_)));
    }

    #[tokio::test]
    async fn test_double_finalize_rejected() {
        let pool = db::connect_in_memory().await.unwrap();
        let collab = Collaborators::logging();
        let order = paid_wallet_order(&pool, &collab).await;

        let request = create_request(&pool, "bob", &order.id, "dup finalize").await.unwrap();
        review(&pool, "reviewer-1", &request.id, true).await.unwrap();
        finalize(&pool, &collab, "finalizer-1", &request.id).await.unwrap();
        let err = finalize(&pool, &collab, "finalizer-1", &request.id).await.unwrap_err();
        assert!(matches!(err, OrderError::InvalidOperation(_)));
    }
}
