//! Payment gateway collaborator

use async_trait::async_trait;

/// Outbound payment gateway
///
/// `initiate` is always dispatched fire-and-forget after the checkout
/// transaction commits; a slow gateway can never stall a checkout.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Ask the gateway to start collecting `amount` for the order.
    /// Returns the gateway's payment reference (redirect URL, QR id...).
    async fn initiate(&self, order_id: &str, amount: f64) -> anyhow::Result<String>;
}

/// Development gateway that only logs
pub struct LogPaymentGateway;

#[async_trait]
impl PaymentGateway for LogPaymentGateway {
    async fn initiate(&self, order_id: &str, amount: f64) -> anyhow::Result<String> {
        tracing::info!(order_id = %order_id, amount = %amount, "payment initiation requested");
        Ok(format!("dev-payment-{order_id}"))
    }
}
