//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::ServerState;
use crate::db::repository::order as order_repo;
use crate::orders::{lifecycle, refund};
use shared::error::{ApiResponse, AppError, AppResult};
use shared::models::{Order, OrderItem, RefundRequest};

/// 订单详情 (含明细)
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// GET /orders/{id} - 查询订单
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let order = order_repo::find(&state.pool, &id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Order {id}")))?;
    let items = order_repo::find_items(&state.pool, &id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(ApiResponse::success(OrderDetail { order, items })))
}

/// POST /orders/{id}/confirm - 确认订单
pub async fn confirm(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = lifecycle::confirm_order(&state.pool, &id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// POST /orders/{id}/ship - 发货
pub async fn ship(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = lifecycle::ship_order(&state.pool, &state.collaborators, &id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// POST /orders/{id}/deliver - 确认送达
pub async fn deliver(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = lifecycle::deliver_order(&state.pool, &id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// POST /orders/{id}/settle - 结算完成
pub async fn settle(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = lifecycle::settle_order(&state.pool, &state.collaborators, &id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// POST /orders/{id}/refund 请求体
#[derive(Debug, Deserialize, Validate)]
pub struct RefundRequestBody {
    #[validate(length(min = 1))]
    pub requester_id: String,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// POST /orders/{id}/refund - 发起退款申请
pub async fn request_refund(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<RefundRequestBody>,
) -> AppResult<Json<ApiResponse<RefundRequest>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let request =
        refund::create_request(&state.pool, &payload.requester_id, &id, &payload.reason).await?;
    Ok(Json(ApiResponse::success(request)))
}
