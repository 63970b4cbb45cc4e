//! Order Model

use serde::{Deserialize, Serialize};

use super::ShippingAddress;

/// Order status
///
/// The full lifecycle of an order. Transitions between statuses are
/// validated by the server's lifecycle module; anything not in its
/// transition table is rejected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderStatus {
    /// COD order waiting for the shop to confirm
    PendingConfirmation,
    /// Wallet order waiting for the gateway callback
    PendingPayment,
    /// Payment received, not yet confirmed by the shop
    Paid,
    /// Confirmed by the shop, ready to dispatch
    Confirmed,
    /// Physically dispatched (stock committed)
    Shipped,
    /// Carrier reported delivery
    Delivered,
    /// Settled - money fully collected
    Completed,
    /// Canceled before settlement (expiry, failed checkout, pre-ship refund)
    Canceled,
    /// Payment gateway reported failure
    Failed,
    /// Returned after settlement (post-completion refund)
    Returned,
}

impl OrderStatus {
    /// Terminal statuses admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Canceled | Self::Failed | Self::Returned
        )
    }
}

/// Order type - an order is homogeneous, physical or digital
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderType {
    Physical,
    Digital,
}

/// Payment method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentMethod {
    /// Cash on delivery - settled when the courier collects
    Cod,
    /// Online wallet - settled on gateway success callback
    Wallet,
}

/// Outcome reported by the payment gateway callback
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentOutcome {
    Success,
    Failure,
}

impl PaymentOutcome {
    /// Canonical wire form, as signed by the gateway
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }
}

/// Order entity
///
/// Never deleted; history is append-only via status and timestamps.
/// `shipping_address` is a denormalized JSON snapshot taken at checkout
/// so later address edits never alter a placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub order_type: OrderType,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    /// Sum of item price × quantity, in currency units
    pub sub_total: f64,
    /// Discount amount in currency units
    pub discount_amount: f64,
    /// Shipping fee in currency units (0 for digital orders)
    pub shipping_fee: f64,
    /// Derived: sub_total - discount_amount + shipping_fee
    pub total_amount: f64,
    /// JSON-serialized [`ShippingAddress`] snapshot (physical orders)
    pub shipping_address: Option<String>,
    /// Carrier tracking code once a shipment is booked
    pub tracking_code: Option<String>,
    /// Payment deadline (epoch ms) for PENDING_PAYMENT orders
    pub expired_at: Option<i64>,
    pub cancelled_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub created_at: i64,
}

impl Order {
    /// Parse the denormalized address snapshot, if any
    pub fn address(&self) -> Option<ShippingAddress> {
        self.shipping_address
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }
}

/// Order line item
///
/// `price` is the unit price snapshotted at purchase time, decoupled
/// from the live catalog price. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub unit_id: String,
    pub quantity: i64,
    /// Unit price in currency units, snapshot at purchase time
    pub price: f64,
}

/// Payment record - exactly one per order (UNIQUE on order_id)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub method: PaymentMethod,
    /// Amount in currency units
    pub amount: f64,
    /// Gateway transaction reference
    pub transaction_id: String,
    pub paid_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_screaming_snake() {
        let s = serde_json::to_string(&OrderStatus::PendingPayment).unwrap();
        assert_eq!(s, "\"PENDING_PAYMENT\"");
        let s = serde_json::to_string(&PaymentMethod::Cod).unwrap();
        assert_eq!(s, "\"COD\"");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Canceled.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
        assert!(OrderStatus::Returned.is_terminal());
        assert!(!OrderStatus::Paid.is_terminal());
        assert!(!OrderStatus::PendingPayment.is_terminal());
    }

    #[test]
    fn test_address_snapshot_roundtrip() {
        let addr = ShippingAddress {
            recipient: "Alice".into(),
            phone: "600123456".into(),
            line1: "Calle Mayor 1".into(),
            line2: None,
            city: "Madrid".into(),
            postal_code: "28001".into(),
            country: "ES".into(),
        };
        let order = Order {
            id: "o1".into(),
            user_id: "u1".into(),
            order_type: OrderType::Physical,
            payment_method: PaymentMethod::Wallet,
            status: OrderStatus::PendingPayment,
            sub_total: 10.0,
            discount_amount: 0.0,
            shipping_fee: 5.0,
            total_amount: 15.0,
            shipping_address: Some(serde_json::to_string(&addr).unwrap()),
            tracking_code: None,
            expired_at: None,
            cancelled_at: None,
            completed_at: None,
            created_at: 0,
        };
        assert_eq!(order.address().unwrap().city, "Madrid");
    }
}
