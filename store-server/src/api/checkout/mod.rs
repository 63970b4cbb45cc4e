//! Checkout API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /checkout/buy-now | POST | 数字商品买即付 |
//! | /checkout/cart | POST | 实体商品购物车结账 |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/checkout/buy-now", post(handler::buy_now))
        .route("/checkout/cart", post(handler::cart))
}
