//! Shipping address snapshot

use serde::{Deserialize, Serialize};

/// Denormalized shipping address
///
/// Serialized to JSON and stored on the order row at checkout time.
/// Not a live reference - the user editing their address book never
/// changes a placed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShippingAddress {
    pub recipient: String,
    pub phone: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}
