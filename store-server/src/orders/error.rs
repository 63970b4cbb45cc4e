//! Order domain errors

use crate::db::repository::RepoError;
use crate::inventory::InventoryError;
use shared::error::{AppError, ErrorCode};
use shared::models::OrderStatus;
use thiserror::Error;

/// Errors surfaced by the order lifecycle modules
///
/// Domain rule violations carry their specific kind all the way to the
/// HTTP layer; only genuinely unexpected failures collapse into the
/// opaque database/internal variants.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("inventory unit not found: {0}")]
    UnitNotFound(String),

    #[error("product {0} is not sellable")]
    InactiveProduct(String),

    #[error("cart is empty")]
    EmptyCart,

    #[error("invalid transition {from:?} -> {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("invalid callback signature")]
    InvalidSignature,

    #[error("payment already recorded for order {0}")]
    PaymentAlreadyRecorded(String),

    #[error("refund request not found: {0}")]
    RefundNotFound(String),

    #[error("refund request already exists for order {0}")]
    DuplicateRefundRequest(String),

    #[error("order {order_id} is not eligible for refund: {reason}")]
    IneligibleForRefund { order_id: String, reason: String },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::OrderNotFound(id) => {
                AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", id)
            }
            OrderError::UnitNotFound(id) => {
                AppError::new(ErrorCode::UnitNotFound).with_detail("unit_id", id)
            }
            OrderError::InactiveProduct(id) => {
                AppError::new(ErrorCode::InactiveProduct).with_detail("unit_id", id)
            }
            OrderError::EmptyCart => AppError::new(ErrorCode::EmptyCart),
            OrderError::InvalidTransition { from, to } => {
                AppError::new(ErrorCode::InvalidStateTransition)
                    .with_detail("from", format!("{from:?}"))
                    .with_detail("to", format!("{to:?}"))
            }
            OrderError::InvalidSignature => AppError::new(ErrorCode::InvalidSignature),
            OrderError::PaymentAlreadyRecorded(id) => {
                AppError::new(ErrorCode::PaymentAlreadyRecorded).with_detail("order_id", id)
            }
            OrderError::RefundNotFound(id) => {
                AppError::new(ErrorCode::RefundNotFound).with_detail("refund_id", id)
            }
            OrderError::DuplicateRefundRequest(id) => {
                AppError::new(ErrorCode::DuplicateRefundRequest).with_detail("order_id", id)
            }
            OrderError::IneligibleForRefund { order_id, reason } => {
                AppError::with_message(ErrorCode::IneligibleForRefund, reason)
                    .with_detail("order_id", order_id)
            }
            OrderError::InvalidOperation(msg) => AppError::validation(msg),
            OrderError::Inventory(inv) => match inv {
                InventoryError::InsufficientStock { unit_id } => {
                    AppError::new(ErrorCode::InsufficientStock).with_detail("unit_id", unit_id)
                }
                InventoryError::NoKeysAvailable { unit_id } => {
                    AppError::new(ErrorCode::NoKeysAvailable).with_detail("unit_id", unit_id)
                }
                InventoryError::Database(e) => {
                    tracing::error!(error = %e, "Inventory database error");
                    AppError::database(e.to_string())
                }
            },
            OrderError::Repo(repo) => match repo {
                RepoError::NotFound(what) => AppError::not_found(what),
                RepoError::Duplicate(what) => {
                    AppError::with_message(ErrorCode::AlreadyExists, what)
                }
                RepoError::Database(msg) => {
                    tracing::error!(error = %msg, "Repository database error");
                    AppError::database(msg)
                }
            },
            OrderError::Database(e) => {
                tracing::error!(error = %e, "Order database error");
                AppError::database(e.to_string())
            }
        }
    }
}
