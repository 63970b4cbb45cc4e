//! Refund Models

use serde::{Deserialize, Serialize};

/// Refund request status
///
/// `PENDING -> APPROVED -> COMPLETED`, or `PENDING -> REJECTED`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum RefundStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

/// Refund request - at most one per order
///
/// Created by the customer, reviewed by a reviewer role, finalized by
/// a finalizer role. Finalization is the point money moves and stock
/// is reconciled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RefundRequest {
    pub id: String,
    pub order_id: String,
    pub status: RefundStatus,
    pub requester_id: String,
    pub reviewer_id: Option<String>,
    pub finalizer_id: Option<String>,
    pub reason: String,
    pub created_at: i64,
    pub reviewed_at: Option<i64>,
    pub finalized_at: Option<i64>,
}

/// Realized refund - written once when the request completes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Refund {
    pub id: String,
    pub refund_request_id: String,
    pub order_id: String,
    /// Refunded amount in currency units
    pub amount: f64,
    pub created_at: i64,
}
