//! Shipping carrier collaborator

use async_trait::async_trait;
use shared::models::Order;

/// Outbound shipping carrier
#[async_trait]
pub trait ShippingCarrier: Send + Sync {
    /// Book a shipment for a confirmed order, returning the tracking code
    async fn create_shipment(&self, order: &Order) -> anyhow::Result<String>;

    /// Cancel a previously booked shipment. Best-effort: refund
    /// finalization logs failures here and carries on.
    async fn cancel_shipment(&self, tracking_code: &str) -> anyhow::Result<()>;
}

/// Development carrier that only logs
pub struct LogShippingCarrier;

#[async_trait]
impl ShippingCarrier for LogShippingCarrier {
    async fn create_shipment(&self, order: &Order) -> anyhow::Result<String> {
        tracing::info!(order_id = %order.id, "shipment booked");
        Ok(format!("dev-tracking-{}", order.id))
    }

    async fn cancel_shipment(&self, tracking_code: &str) -> anyhow::Result<()> {
        tracing::info!(tracking_code = %tracking_code, "shipment canceled");
        Ok(())
    }
}
