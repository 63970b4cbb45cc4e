//! Notification collaborator (email / push)

use async_trait::async_trait;
use shared::models::Order;

/// Outbound notification sender
///
/// Every method is fire-and-forget from the core's point of view:
/// failures are logged, never allowed to block an order transition.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// "Your order is complete"
    async fn order_completed(&self, order: &Order) -> anyhow::Result<()>;

    /// "Your digital keys are ready" (digital orders, on completion)
    async fn keys_ready(&self, order: &Order, key_count: usize) -> anyhow::Result<()>;

    /// "Your refund has been processed"
    async fn refund_processed(&self, order: &Order, amount: f64) -> anyhow::Result<()>;
}

/// Development notifier that only logs
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn order_completed(&self, order: &Order) -> anyhow::Result<()> {
        tracing::info!(order_id = %order.id, user_id = %order.user_id, "notify: order completed");
        Ok(())
    }

    async fn keys_ready(&self, order: &Order, key_count: usize) -> anyhow::Result<()> {
        tracing::info!(order_id = %order.id, user_id = %order.user_id, key_count, "notify: keys ready");
        Ok(())
    }

    async fn refund_processed(&self, order: &Order, amount: f64) -> anyhow::Result<()> {
        tracing::info!(order_id = %order.id, user_id = %order.user_id, amount, "notify: refund processed");
        Ok(())
    }
}
