//! External collaborator seams
//!
//! The order core depends on three outbound collaborators - payment
//! gateway, shipping carrier, and a notification sender - behind
//! `async_trait` seams. Production wiring plugs real clients in here;
//! development and tests use the logging implementations.
//!
//! Side effects that must never stall a checkout/confirmation
//! transaction (payment initiation, notifications) go through the
//! `dispatch_*` helpers, which spawn the call and log failures.

mod notify;
mod payment;
mod shipping;

pub use notify::{LogNotifier, Notifier};
pub use payment::{LogPaymentGateway, PaymentGateway};
pub use shipping::{LogShippingCarrier, ShippingCarrier};

use shared::models::Order;
use std::sync::Arc;

/// Shared handles to all outbound collaborators
#[derive(Clone)]
pub struct Collaborators {
    pub gateway: Arc<dyn PaymentGateway>,
    pub carrier: Arc<dyn ShippingCarrier>,
    pub notifier: Arc<dyn Notifier>,
}

impl Collaborators {
    /// Logging-only collaborators for development and tests
    pub fn logging() -> Self {
        Self {
            gateway: Arc::new(LogPaymentGateway),
            carrier: Arc::new(LogShippingCarrier),
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Fire-and-forget payment initiation for a freshly created order
    pub fn dispatch_payment_initiation(&self, order_id: &str, amount: f64) {
        let gateway = self.gateway.clone();
        let order_id = order_id.to_string();
        tokio::spawn(async move {
            match gateway.initiate(&order_id, amount).await {
                Ok(reference) => {
                    tracing::debug!(order_id = %order_id, reference = %reference, "Payment initiated")
                }
                Err(e) => {
                    tracing::warn!(order_id = %order_id, error = %e, "Payment initiation failed")
                }
            }
        });
    }

    /// Fire-and-forget "your keys are ready" notification
    pub fn dispatch_keys_ready(&self, order: &Order, key_count: usize) {
        let notifier = self.notifier.clone();
        let order = order.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.keys_ready(&order, key_count).await {
                tracing::warn!(order_id = %order.id, error = %e, "Keys-ready notification failed");
            }
        });
    }

    /// Fire-and-forget order-completed notification
    pub fn dispatch_order_completed(&self, order: &Order) {
        let notifier = self.notifier.clone();
        let order = order.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.order_completed(&order).await {
                tracing::warn!(order_id = %order.id, error = %e, "Completion notification failed");
            }
        });
    }

    /// Fire-and-forget refund-processed notification
    pub fn dispatch_refund_processed(&self, order: &Order, amount: f64) {
        let notifier = self.notifier.clone();
        let order = order.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.refund_processed(&order, amount).await {
                tracing::warn!(order_id = %order.id, error = %e, "Refund notification failed");
            }
        });
    }
}
