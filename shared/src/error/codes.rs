//! Unified error codes for the Shoal storefront
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 2xxx: Inventory errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Refund errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient
/// serialization and cross-language compatibility (Rust, TypeScript).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 2xxx: Inventory ====================
    /// Not enough available stock to satisfy the reservation
    InsufficientStock = 2001,
    /// No unused digital key left in the unit's pool
    NoKeysAvailable = 2002,
    /// Inventory unit not found
    UnitNotFound = 2003,
    /// Product is not currently sellable
    InactiveProduct = 2004,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Requested status transition is not in the transition table
    InvalidStateTransition = 4002,
    /// Checkout submitted with no items
    EmptyCart = 4003,

    // ==================== 5xxx: Payment ====================
    /// Gateway callback signature did not verify
    InvalidSignature = 5001,
    /// A payment record already exists for this order
    PaymentAlreadyRecorded = 5002,

    // ==================== 6xxx: Refund ====================
    /// A refund request already exists for this order
    DuplicateRefundRequest = 6001,
    /// Order is not eligible for refund in its current state
    IneligibleForRefund = 6002,
    /// Refund request not found
    RefundNotFound = 6003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    /// Get the default human-readable message for this error code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",

            Self::InsufficientStock => "Insufficient stock",
            Self::NoKeysAvailable => "No digital keys available",
            Self::UnitNotFound => "Inventory unit not found",
            Self::InactiveProduct => "Product is not sellable",

            Self::OrderNotFound => "Order not found",
            Self::InvalidStateTransition => "Invalid order state transition",
            Self::EmptyCart => "Cart is empty",

            Self::InvalidSignature => "Invalid callback signature",
            Self::PaymentAlreadyRecorded => "Payment already recorded for this order",

            Self::DuplicateRefundRequest => "Refund request already exists for this order",
            Self::IneligibleForRefund => "Order is not eligible for refund",
            Self::RefundNotFound => "Refund request not found",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::ConfigError => "Configuration error",
        }
    }

    /// Get the numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code as u16
    }
}

/// Error returned when deserializing an unknown numeric error code
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,

            2001 => Self::InsufficientStock,
            2002 => Self::NoKeysAvailable,
            2003 => Self::UnitNotFound,
            2004 => Self::InactiveProduct,

            4001 => Self::OrderNotFound,
            4002 => Self::InvalidStateTransition,
            4003 => Self::EmptyCart,

            5001 => Self::InvalidSignature,
            5002 => Self::PaymentAlreadyRecorded,

            6001 => Self::DuplicateRefundRequest,
            6002 => Self::IneligibleForRefund,
            6003 => Self::RefundNotFound,

            9001 => Self::InternalError,
            9002 => Self::DatabaseError,
            9003 => Self::ConfigError,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}
