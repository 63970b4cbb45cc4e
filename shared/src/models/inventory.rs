//! Inventory Models

use serde::{Deserialize, Serialize};

/// Inventory unit (product variant + stock counter)
///
/// The stock counter invariant `0 <= reserved <= quantity` is enforced
/// by the server's stock ledger; these fields are never mutated
/// directly by handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct InventoryUnit {
    pub id: String,
    pub name: String,
    /// Sale price in currency units
    pub price: f64,
    /// Cost price in currency units
    pub cost_price: f64,
    /// Optional variant attribute (color, edition, ...)
    pub color: Option<String>,
    /// Whether this unit sells digital keys instead of physical stock
    pub is_digital: bool,
    /// Inactive units are not sellable
    pub is_active: bool,
    /// Total on-hand quantity (mirrors key count for digital units)
    pub quantity: i64,
    /// Quantity held by not-yet-settled orders
    pub reserved: i64,
}

impl InventoryUnit {
    /// Stock available to new reservations
    pub fn available(&self) -> i64 {
        self.quantity - self.reserved
    }
}

/// Digital key status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum KeyStatus {
    /// Claimable (may still be linked to a pending order)
    Unused,
    /// Permanently consumed by a completed order
    Used,
}

/// Single-use digital key belonging to one inventory unit
///
/// Lifecycle: imported in bulk → claimed (linked to an order item while
/// the owning order is pending) → consumed on order completion, or
/// released back to the pool on cancellation/expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DigitalKey {
    pub id: String,
    pub unit_id: String,
    pub status: KeyStatus,
    /// SHA-256 of the plaintext code, for duplicate detection on import
    pub content_hash: String,
    /// Encrypted redeemable code
    pub payload: String,
    /// Owning order while claimed (cleared on release)
    pub order_id: Option<String>,
    /// Claiming order item (cleared on release)
    pub order_item_id: Option<String>,
}

impl DigitalKey {
    /// A key is claimed when it is linked to an order item
    pub fn is_claimed(&self) -> bool {
        self.order_item_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_stock() {
        let unit = InventoryUnit {
            id: "u1".into(),
            name: "Widget".into(),
            price: 10.0,
            cost_price: 4.0,
            color: None,
            is_digital: false,
            is_active: true,
            quantity: 5,
            reserved: 2,
        };
        assert_eq!(unit.available(), 3);
    }

    #[test]
    fn test_key_status_wire_form() {
        assert_eq!(serde_json::to_string(&KeyStatus::Unused).unwrap(), "\"UNUSED\"");
        assert_eq!(serde_json::to_string(&KeyStatus::Used).unwrap(), "\"USED\"");
    }
}
