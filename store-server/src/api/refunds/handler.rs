//! Refund API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::core::ServerState;
use crate::orders::refund;
use shared::error::{ApiResponse, AppError, AppResult};
use shared::models::{Refund, RefundRequest};

/// POST /refunds/{id}/review 请求体
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewBody {
    #[validate(length(min = 1))]
    pub reviewer_id: String,
    pub approve: bool,
}

/// POST /refunds/{id}/review - 审核退款申请
pub async fn review(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ReviewBody>,
) -> AppResult<Json<ApiResponse<RefundRequest>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let request = refund::review(&state.pool, &payload.reviewer_id, &id, payload.approve).await?;
    Ok(Json(ApiResponse::success(request)))
}

/// POST /refunds/{id}/finalize 请求体
#[derive(Debug, Deserialize, Validate)]
pub struct FinalizeBody {
    #[validate(length(min = 1))]
    pub finalizer_id: String,
}

/// POST /refunds/{id}/finalize - 执行退款
pub async fn finalize(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<FinalizeBody>,
) -> AppResult<Json<ApiResponse<Refund>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let refund =
        refund::finalize(&state.pool, &state.collaborators, &payload.finalizer_id, &id).await?;
    Ok(Json(ApiResponse::success(refund)))
}
