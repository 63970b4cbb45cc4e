//! Shared types for the Shoal storefront
//!
//! Common types used across crates: domain models, the unified error
//! taxonomy, API response envelope, and small utilities.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
