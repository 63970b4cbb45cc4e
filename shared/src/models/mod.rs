//! Domain models
//!
//! Row-level entities shared between the server crate and any future
//! client. SQLx derives are gated behind the `db` feature so pure
//! consumers don't pull the database stack.

mod address;
mod inventory;
mod order;
mod refund;

pub use address::ShippingAddress;
pub use inventory::{DigitalKey, InventoryUnit, KeyStatus};
pub use order::{Order, OrderItem, OrderStatus, OrderType, Payment, PaymentMethod, PaymentOutcome};
pub use refund::{Refund, RefundRequest, RefundStatus};
