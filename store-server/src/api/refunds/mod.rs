//! Refund API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /refunds/{id}/review | POST | 审核退款申请 (通过/驳回) |
//! | /refunds/{id}/finalize | POST | 执行退款 (退钱 + 库存回补) |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/refunds/{id}/review", post(handler::review))
        .route("/refunds/{id}/finalize", post(handler::finalize))
}
