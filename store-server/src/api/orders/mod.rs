//! Order API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /orders/{id} | GET | 查询订单与明细 |
//! | /orders/{id}/confirm | POST | 确认订单 |
//! | /orders/{id}/ship | POST | 发货 (扣减库存) |
//! | /orders/{id}/deliver | POST | 确认送达 |
//! | /orders/{id}/settle | POST | 结算完成 |
//! | /orders/{id}/refund | POST | 发起退款申请 |

mod handler;

use axum::{Router, routing::{get, post}};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/orders/{id}", get(handler::get_by_id))
        .route("/orders/{id}/confirm", post(handler::confirm))
        .route("/orders/{id}/ship", post(handler::ship))
        .route("/orders/{id}/deliver", post(handler::deliver))
        .route("/orders/{id}/settle", post(handler::settle))
        .route("/orders/{id}/refund", post(handler::request_refund))
}
