//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`checkout`] - 结账接口 (买即付 / 购物车)
//! - [`orders`] - 订单查询与人工推进
//! - [`payments`] - 支付网关回调
//! - [`refunds`] - 退款审核与执行

pub mod checkout;
pub mod health;
pub mod orders;
pub mod payments;
pub mod refunds;

use crate::core::ServerState;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Assemble the full application router
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(checkout::router())
        .merge(orders::router())
        .merge(payments::router())
        .merge(refunds::router())
        .layer(TraceLayer::new_for_http())
}
