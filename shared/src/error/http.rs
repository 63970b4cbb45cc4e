//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound | Self::OrderNotFound | Self::UnitNotFound | Self::RefundNotFound => {
                StatusCode::NOT_FOUND
            }

            // 409 Conflict (contention and duplicates)
            Self::AlreadyExists
            | Self::InsufficientStock
            | Self::NoKeysAvailable
            | Self::InvalidStateTransition
            | Self::PaymentAlreadyRecorded
            | Self::DuplicateRefundRequest => StatusCode::CONFLICT,

            // 401 Unauthorized (unverifiable callback)
            Self::InvalidSignature => StatusCode::UNAUTHORIZED,

            // 422 Unprocessable (business rule violations)
            Self::IneligibleForRefund | Self::InactiveProduct => StatusCode::UNPROCESSABLE_ENTITY,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError | Self::ConfigError | Self::Unknown => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation errors)
            Self::ValidationFailed | Self::InvalidRequest | Self::EmptyCart => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}
