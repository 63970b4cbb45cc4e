//! Checkout API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::ServerState;
use crate::orders::checkout::{self, CartLine};
use shared::error::{ApiResponse, AppError, AppResult};
use shared::models::{Order, PaymentMethod, ShippingAddress};

/// POST /checkout/buy-now 请求体
#[derive(Debug, Deserialize, Validate)]
pub struct BuyNowRequest {
    #[validate(length(min = 1))]
    pub user_id: String,
    #[validate(length(min = 1))]
    pub unit_id: String,
}

/// POST /checkout/cart 请求体
#[derive(Debug, Deserialize, Validate)]
pub struct CartRequest {
    #[validate(length(min = 1))]
    pub user_id: String,
    pub payment_method: PaymentMethod,
    #[validate(length(min = 1), nested)]
    pub lines: Vec<CartLineRequest>,
    #[validate(nested)]
    pub shipping_address: AddressRequest,
}

// Serialize: validator's length check on `Vec<CartLineRequest>`
// records the offending value as a validation param.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CartLineRequest {
    #[validate(length(min = 1))]
    pub unit_id: String,
    #[validate(range(min = 1))]
    pub quantity: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddressRequest {
    #[validate(length(min = 1))]
    pub recipient: String,
    #[validate(length(min = 1))]
    pub phone: String,
    #[validate(length(min = 1))]
    pub line1: String,
    pub line2: Option<String>,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub postal_code: String,
    #[validate(length(min = 1))]
    pub country: String,
}

impl From<AddressRequest> for ShippingAddress {
    fn from(req: AddressRequest) -> Self {
        Self {
            recipient: req.recipient,
            phone: req.phone,
            line1: req.line1,
            line2: req.line2,
            city: req.city,
            postal_code: req.postal_code,
            country: req.country,
        }
    }
}

/// POST /checkout/buy-now - 数字商品买即付
pub async fn buy_now(
    State(state): State<ServerState>,
    Json(payload): Json<BuyNowRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let order = checkout::buy_now_digital(
        &state.pool,
        &state.collaborators,
        &state.checkout_config(),
        &payload.user_id,
        &payload.unit_id,
    )
    .await?;
    Ok(Json(ApiResponse::success(order)))
}

/// POST /checkout/cart - 实体商品购物车结账
///
/// 请求体经 validator 校验：至少一个明细行、数量为正、地址字段非空。
pub async fn cart(
    State(state): State<ServerState>,
    Json(payload): Json<CartRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let lines: Vec<CartLine> = payload
        .lines
        .iter()
        .map(|l| CartLine {
            unit_id: l.unit_id.clone(),
            quantity: l.quantity,
        })
        .collect();
    let address: ShippingAddress = payload.shipping_address.into();
    let order = checkout::checkout_physical(
        &state.pool,
        &state.collaborators,
        &state.checkout_config(),
        &payload.user_id,
        payload.payment_method,
        &lines,
        &address,
    )
    .await?;
    Ok(Json(ApiResponse::success(order)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_cart() -> CartRequest {
        CartRequest {
            user_id: "alice".into(),
            payment_method: PaymentMethod::Cod,
            lines: vec![CartLineRequest {
                unit_id: "mug".into(),
                quantity: 2,
            }],
            shipping_address: AddressRequest {
                recipient: "Alice".into(),
                phone: "600123456".into(),
                line1: "Calle Mayor 1".into(),
                line2: None,
                city: "Madrid".into(),
                postal_code: "28001".into(),
                country: "ES".into(),
            },
        }
    }

    #[test]
    fn test_valid_cart_passes_validation() {
        assert!(valid_cart().validate().is_ok());
    }

    #[test]
    fn test_empty_lines_fail_validation() {
        let mut cart = valid_cart();
        cart.lines.clear();
        assert!(cart.validate().is_err());
    }

    #[test]
    fn test_zero_quantity_line_fails_validation() {
        let mut cart = valid_cart();
        cart.lines[0].quantity = 0;
        assert!(cart.validate().is_err());
    }

    #[test]
    fn test_blank_address_field_fails_validation() {
        let mut cart = valid_cart();
        cart.shipping_address.recipient.clear();
        assert!(cart.validate().is_err());
    }
}
