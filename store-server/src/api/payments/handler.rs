//! Payment API Handlers

use axum::{Json, extract::State};

use crate::core::ServerState;
use crate::orders::confirm::{self, PaymentCallback};
use shared::error::{ApiResponse, AppResult};
use shared::models::Order;

/// POST /payments/callback - 支付网关回调
///
/// 验签失败返回 401；订单已离开待支付状态时幂等返回当前订单。
pub async fn callback(
    State(state): State<ServerState>,
    Json(payload): Json<PaymentCallback>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = confirm::on_payment_result(
        &state.pool,
        &state.collaborators,
        state.callback_key(),
        &payload,
    )
    .await?;
    Ok(Json(ApiResponse::success(order)))
}
