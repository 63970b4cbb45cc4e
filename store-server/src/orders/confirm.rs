//! Payment gateway callback handling
//!
//! The gateway calls back with an order id, an outcome, a transaction
//! reference, and an HMAC-SHA256 signature over the canonical string
//! `"{order_id}.{transaction_id}.{outcome}"` (hex encoded). Signature
//! verification happens before any database work; a bad signature is
//! rejected outright, never treated as a failure outcome.
//!
//! Replays and races (a second callback, or a callback racing the
//! expiration sweeper) resolve through the conditional status
//! transition: if the order already left PENDING_PAYMENT the callback
//! is acknowledged as a no-op, so the gateway can retry safely.

use super::error::{OrderError, OrderResult};
use crate::db::repository::{RepoError, order as order_repo, payment as payment_repo};
use crate::inventory::{keys, ledger};
use crate::services::Collaborators;
use ring::hmac;
use serde::{Deserialize, Serialize};
use shared::models::{Order, OrderStatus, OrderType, Payment, PaymentOutcome};
use shared::util;
use sqlx::SqlitePool;

/// Callback payload as posted by the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCallback {
    pub order_id: String,
    pub outcome: PaymentOutcome,
    pub transaction_id: String,
    /// Hex-encoded HMAC-SHA256 over the canonical callback string
    pub signature: String,
}

fn canonical_string(order_id: &str, transaction_id: &str, outcome: PaymentOutcome) -> String {
    format!("{order_id}.{transaction_id}.{}", outcome.as_str())
}

/// Sign a callback the way the gateway does (dev tooling and tests)
pub fn sign(secret: &[u8], order_id: &str, transaction_id: &str, outcome: PaymentOutcome) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret);
    let tag = hmac::sign(&key, canonical_string(order_id, transaction_id, outcome).as_bytes());
    hex::encode(tag.as_ref())
}

fn verify_signature(secret: &[u8], callback: &PaymentCallback) -> OrderResult<()> {
    let provided = hex::decode(&callback.signature).map_err(|_| OrderError::InvalidSignature)?;
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret);
    let message =
        canonical_string(&callback.order_id, &callback.transaction_id, callback.outcome);
    hmac::verify(&key, message.as_bytes(), &provided).map_err(|_| OrderError::InvalidSignature)
}

/// Settle a verified gateway callback against the order
///
/// Success on a digital order completes it immediately (keys are
/// consumed and delivered); success on a physical order parks it at
/// PAID for the shop to confirm. Failure releases every hold. All of
/// it happens in one transaction keyed on the PENDING_PAYMENT guard.
pub async fn on_payment_result(
    pool: &SqlitePool,
    collaborators: &Collaborators,
    secret: &[u8],
    callback: &PaymentCallback,
) -> OrderResult<Order> {
    verify_signature(secret, callback)?;

    let order = order_repo::find(pool, &callback.order_id)
        .await?
        .ok_or_else(|| OrderError::OrderNotFound(callback.order_id.clone()))?;
    if order.status != OrderStatus::PendingPayment {
        // Replay or lost race; acknowledge without touching anything
        tracing::info!(
            order_id = %order.id,
            status = ?order.status,
            "Payment callback ignored for non-pending order"
        );
        return Ok(order);
    }

    let now = util::now_millis();
    let mut tx = pool.begin().await?;
    match callback.outcome {
        PaymentOutcome::Success => {
            let target = match order.order_type {
                OrderType::Digital => OrderStatus::Completed,
                OrderType::Physical => OrderStatus::Paid,
            };
            let moved = order_repo::transition_status(
                &mut tx,
                &order.id,
                OrderStatus::PendingPayment,
                target,
                now,
            )
            .await?;
            if !moved {
                drop(tx);
                return ignore_raced(pool, &order.id).await;
            }
            let payment = Payment {
                id: util::new_id(),
                order_id: order.id.clone(),
                method: order.payment_method,
                amount: order.total_amount,
                transaction_id: callback.transaction_id.clone(),
                paid_at: now,
            };
            // UNIQUE(order_id) backstop: the status guard above makes a
            // second insert unreachable through this path, but a payment
            // row written by any other means must not be overwritten.
            match payment_repo::insert(&mut tx, &payment).await {
                Ok(()) => {}
                Err(RepoError::Duplicate(_)) => {
                    return Err(OrderError::PaymentAlreadyRecorded(order.id.clone()));
                }
                Err(e) => return Err(e.into()),
            }

            let mut key_count = 0usize;
            if order.order_type == OrderType::Digital {
                key_count = keys::consume_for_order(&mut tx, &order.id).await? as usize;
                let items = order_repo::find_items_tx(&mut tx, &order.id).await?;
                for item in &items {
                    ledger::commit(&mut tx, &item.unit_id, item.quantity).await?;
                }
            }
            tx.commit().await?;

            tracing::info!(order_id = %order.id, to = ?target, "Payment confirmed");
            if order.order_type == OrderType::Digital {
                collaborators.dispatch_keys_ready(&order, key_count);
            }
        }
        PaymentOutcome::Failure => {
            let moved = order_repo::transition_status(
                &mut tx,
                &order.id,
                OrderStatus::PendingPayment,
                OrderStatus::Failed,
                now,
            )
            .await?;
            if !moved {
                drop(tx);
                return ignore_raced(pool, &order.id).await;
            }
            let items = order_repo::find_items_tx(&mut tx, &order.id).await?;
            for item in &items {
                ledger::release(&mut tx, &item.unit_id, item.quantity).await?;
            }
            keys::release_for_order(&mut tx, &order.id).await?;
            tx.commit().await?;

            tracing::info!(order_id = %order.id, "Payment failed, holds released");
        }
    }

    let refreshed = order_repo::find(pool, &order.id)
        .await?
        .ok_or_else(|| OrderError::OrderNotFound(order.id.clone()))?;
    Ok(refreshed)
}

async fn ignore_raced(pool: &SqlitePool, order_id: &str) -> OrderResult<Order> {
    tracing::info!(order_id = %order_id, "Payment callback lost a transition race, ignored");
    order_repo::find(pool, order_id)
        .await?
        .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
}
