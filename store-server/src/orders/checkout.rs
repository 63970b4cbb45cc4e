//! Checkout orchestration
//!
//! Two entry points:
//! - [`buy_now_digital`]: single-unit digital purchase, wallet only.
//!   Reserves one stock slot and claims one key from the pool inside
//!   the creation transaction, so a pending order already owns a
//!   concrete key.
//! - [`checkout_physical`]: multi-line physical cart, COD or wallet.
//!   All lines reserve or none do.
//!
//! Stock reservation is all-or-nothing per order: any failed reserve
//! aborts the transaction and every already-taken hold rolls back with
//! it.

use super::error::{OrderError, OrderResult};
use super::{lifecycle, money};
use crate::db::repository::{order as order_repo, unit as unit_repo};
use crate::inventory::{keys, ledger};
use crate::services::Collaborators;
use shared::models::{
    InventoryUnit, Order, OrderItem, OrderStatus, OrderType, PaymentMethod, ShippingAddress,
};
use shared::util;
use sqlx::SqlitePool;

/// Checkout tunables, loaded from configuration at startup
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Payment deadline for wallet orders, in milliseconds
    pub order_ttl_ms: i64,
    /// Flat shipping fee applied to physical orders
    pub flat_shipping_fee: f64,
}

/// One cart line as submitted by the client
#[derive(Debug, Clone)]
pub struct CartLine {
    pub unit_id: String,
    pub quantity: i64,
}

async fn load_sellable_unit(pool: &SqlitePool, unit_id: &str) -> OrderResult<InventoryUnit> {
    let unit = unit_repo::find(pool, unit_id)
        .await?
        .ok_or_else(|| OrderError::UnitNotFound(unit_id.to_string()))?;
    if !unit.is_active {
        return Err(OrderError::InactiveProduct(unit.id.clone()));
    }
    money::validate_price(unit.price)?;
    Ok(unit)
}

fn build_order(
    user_id: &str,
    order_type: OrderType,
    payment_method: PaymentMethod,
    sub_total: f64,
    shipping_fee: f64,
    shipping_address: Option<String>,
    ttl_ms: i64,
    now: i64,
) -> Order {
    let status = lifecycle::initial_status(payment_method);
    let expired_at = (status == OrderStatus::PendingPayment).then_some(now + ttl_ms);
    Order {
        id: util::new_id(),
        user_id: user_id.to_string(),
        order_type,
        payment_method,
        status,
        sub_total,
        discount_amount: 0.0,
        shipping_fee,
        total_amount: money::order_total(sub_total, 0.0, shipping_fee),
        shipping_address,
        tracking_code: None,
        expired_at,
        cancelled_at: None,
        completed_at: None,
        created_at: now,
    }
}

/// Buy-now purchase of one digital key
///
/// The reservation, the key claim, and the order rows commit or roll
/// back as a unit; a pending digital order therefore always has
/// exactly one key linked to it. Payment initiation is dispatched
/// after commit so a gateway hiccup never poisons the transaction.
pub async fn buy_now_digital(
    pool: &SqlitePool,
    collaborators: &Collaborators,
    config: &CheckoutConfig,
    user_id: &str,
    unit_id: &str,
) -> OrderResult<Order> {
    let unit = load_sellable_unit(pool, unit_id).await?;
    if !unit.is_digital {
        return Err(OrderError::InvalidOperation(format!(
            "unit {unit_id} is not a digital product"
        )));
    }

    let now = util::now_millis();
    let order = build_order(
        user_id,
        OrderType::Digital,
        PaymentMethod::Wallet,
        unit.price,
        0.0,
        None,
        config.order_ttl_ms,
        now,
    );
    let item = OrderItem {
        id: util::new_id(),
        order_id: order.id.clone(),
        unit_id: unit.id.clone(),
        quantity: 1,
        price: unit.price,
    };

    let mut tx = pool.begin().await?;
    ledger::reserve(&mut tx, &unit.id, 1).await?;
    keys::claim_one(&mut tx, &unit.id, &order.id, &item.id).await?;
    order_repo::insert(&mut tx, &order).await?;
    order_repo::insert_item(&mut tx, &item).await?;
    tx.commit().await?;

    tracing::info!(order_id = %order.id, unit_id = %unit.id, "Digital buy-now order created");
    collaborators.dispatch_payment_initiation(&order.id, order.total_amount);
    Ok(order)
}

/// Cart checkout for physical goods
pub async fn checkout_physical(
    pool: &SqlitePool,
    collaborators: &Collaborators,
    config: &CheckoutConfig,
    user_id: &str,
    payment_method: PaymentMethod,
    lines: &[CartLine],
    address: &ShippingAddress,
) -> OrderResult<Order> {
    if lines.is_empty() {
        return Err(OrderError::EmptyCart);
    }
    for line in lines {
        money::validate_quantity(line.quantity)?;
    }

    // Validate the catalog side before touching any counter
    let mut units = Vec::with_capacity(lines.len());
    for line in lines {
        let unit = load_sellable_unit(pool, &line.unit_id).await?;
        if unit.is_digital {
            return Err(OrderError::InvalidOperation(format!(
                "unit {} is digital and cannot ship",
                unit.id
            )));
        }
        units.push(unit);
    }

    let sub_total = lines
        .iter()
        .zip(&units)
        .map(|(line, unit)| money::line_total(unit.price, line.quantity))
        .sum();

    let now = util::now_millis();
    let snapshot = serde_json::to_string(address)
        .map_err(|e| OrderError::InvalidOperation(format!("bad shipping address: {e}")))?;
    let order = build_order(
        user_id,
        OrderType::Physical,
        payment_method,
        sub_total,
        config.flat_shipping_fee,
        Some(snapshot),
        config.order_ttl_ms,
        now,
    );

    let mut tx = pool.begin().await?;
    order_repo::insert(&mut tx, &order).await?;
    for (line, unit) in lines.iter().zip(&units) {
        ledger::reserve(&mut tx, &unit.id, line.quantity).await?;
        let item = OrderItem {
            id: util::new_id(),
            order_id: order.id.clone(),
            unit_id: unit.id.clone(),
            quantity: line.quantity,
            price: unit.price,
        };
        order_repo::insert_item(&mut tx, &item).await?;
    }
    tx.commit().await?;

    tracing::info!(
        order_id = %order.id,
        lines = lines.len(),
        method = ?payment_method,
        "Physical order created"
    );
    if payment_method == PaymentMethod::Wallet {
        collaborators.dispatch_payment_initiation(&order.id, order.total_amount);
    }
    Ok(order)
}
