use std::fmt::Debug;

use log::*;
use payfast_tools::{ItnNotification, PaymentStatus};

use crate::{
    db_types::{Order, OrderStatusType},
    events::{EventProducers, OrderStatusChangedEvent},
    sfe_api::{errors::WebhookError, order_objects::NotificationOutcome, payment_gateway::PaymentGatewayAdapter},
    traits::{NotificationValidator, OrderManagement},
};

/// `WebhookApi` reconciles order status with the payment notifications (ITNs) sent by the gateway.
///
/// A notification is processed in this order:
/// 1. The signature is checked against the configured passphrase. A missing or wrong signature is rejected.
/// 2. The `m_payment_id` reference is resolved. Unknown references are acknowledged without further work.
/// 3. Orders that are no longer pending are acknowledged without contacting the gateway.
/// 4. The gateway is asked to confirm the notification. Unconfirmed notifications are rejected.
/// 5. `COMPLETE` and `CANCELLED` move the order out of `pending`. Any other status is ignored.
///
/// The status update is conditional on the order still being pending, so duplicate and concurrent deliveries of the
/// same notification change the order at most once.
pub struct WebhookApi<B, V> {
    db: B,
    gateway: PaymentGatewayAdapter<V>,
    producers: EventProducers,
}

impl<B, V> Debug for WebhookApi<B, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WebhookApi")
    }
}

impl<B, V> WebhookApi<B, V> {
    pub fn new(db: B, gateway: PaymentGatewayAdapter<V>, producers: EventProducers) -> Self {
        Self { db, gateway, producers }
    }
}

impl<B, V> WebhookApi<B, V>
where
    B: OrderManagement,
    V: NotificationValidator,
{
    pub async fn process_notification(&self, body: &[u8]) -> Result<NotificationOutcome, WebhookError> {
        let notification = ItnNotification::parse(body);
        if notification.signature().is_none() {
            warn!("🪝 Payment notification without a signature rejected");
            return Err(WebhookError::InvalidSignature);
        }
        if !self.gateway.signature_matches(&notification) {
            warn!("🪝 Payment notification with an incorrect signature rejected");
            return Err(WebhookError::InvalidSignature);
        }
        let reference = notification.payment_id().map(String::from);
        let Some(order) = self.resolve_order(reference.as_deref()).await? else {
            info!("🪝 Payment notification for unknown order reference {reference:?} acknowledged and ignored");
            return Ok(NotificationOutcome::UnknownOrder { reference });
        };
        if order.status.is_terminal() {
            debug!("🪝 Order #{} is already {}. Notification acknowledged", order.id, order.status);
            return Ok(NotificationOutcome::AlreadyFinal { order_id: order.id, status: order.status });
        }
        if !self.gateway.verify_with_gateway(notification.raw()).await {
            warn!("🪝 The gateway did not confirm the notification for order #{}", order.id);
            return Err(WebhookError::InvalidNotification);
        }
        let new_status = match notification.payment_status() {
            PaymentStatus::Complete => OrderStatusType::Completed,
            PaymentStatus::Cancelled => OrderStatusType::Cancelled,
            PaymentStatus::Other(status) => {
                info!("🪝 Payment status '{status}' for order #{} does not change the order", order.id);
                return Ok(NotificationOutcome::Ignored { order_id: order.id, payment_status: status });
            },
        };
        self.transition(order, new_status).await
    }

    async fn resolve_order(&self, reference: Option<&str>) -> Result<Option<Order>, WebhookError> {
        let Some(order_id) = reference.and_then(|r| r.parse::<i64>().ok()) else {
            return Ok(None);
        };
        let order = self.db.fetch_order(order_id).await?;
        Ok(order)
    }

    async fn transition(&self, order: Order, new_status: OrderStatusType) -> Result<NotificationOutcome, WebhookError> {
        let order_id = order.id;
        let old_status = order.status;
        match self.db.transition_order_status(order_id, new_status).await? {
            Some(updated) => {
                info!("🪝 Order #{order_id} moved from {old_status} to {new_status}");
                self.producers.publish_order_status_changed(OrderStatusChangedEvent::new(updated, old_status)).await;
                Ok(NotificationOutcome::Transitioned { order_id, from: old_status, to: new_status })
            },
            None => {
                // Another delivery won the race.
                let status = self.db.fetch_order(order_id).await?.map(|o| o.status).unwrap_or(new_status);
                debug!("🪝 Order #{order_id} was already moved to {status} by a concurrent notification");
                Ok(NotificationOutcome::AlreadyFinal { order_id, status })
            },
        }
    }
}
