//! Order lifecycle core
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | `checkout` | order creation: digital buy-now, physical cart |
//! | `lifecycle` | transition table + manual progression (confirm/ship/deliver/settle) |
//! | `confirm` | signed payment gateway callback |
//! | `sweeper` | payment-deadline expiry loop |
//! | `refund` | request / review / finalize workflow |
//! | `money` | decimal-backed monetary arithmetic |

pub mod checkout;
pub mod confirm;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod refund;
pub mod sweeper;

pub use error::{OrderError, OrderResult};
