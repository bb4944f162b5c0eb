use std::fmt::Debug;

use log::*;
use payfast_tools::{ItnNotification, PayfastApiError, PayfastConfig, PaymentRequestBuilder};

use crate::{
    db_types::{Customer, Order, PaymentDetails},
    traits::NotificationValidator,
};

/// `PaymentGatewayAdapter` is the engine's only point of contact with the payment gateway.
///
/// Outbound, it builds and signs payment requests. Inbound, it checks notification signatures and asks the gateway,
/// via the injected [`NotificationValidator`], to confirm notifications.
#[derive(Clone)]
pub struct PaymentGatewayAdapter<V> {
    config: PayfastConfig,
    validator: V,
}

impl<V> Debug for PaymentGatewayAdapter<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentGatewayAdapter ({})", self.config.base_url())
    }
}

impl<V> PaymentGatewayAdapter<V> {
    pub fn new(config: PayfastConfig, validator: V) -> Self {
        Self { config, validator }
    }

    pub fn config(&self) -> &PayfastConfig {
        &self.config
    }

    /// Builds the signed payment request for the order. The payment method recorded on the order is carried over.
    pub fn build_payment_request(&self, order: &Order, customer: &Customer) -> Result<PaymentDetails, PayfastApiError> {
        let request = PaymentRequestBuilder::new(order.id.to_string(), order.total_amount)
            .item_name(format!("Order #{}", order.id))
            .customer(customer.username.as_str(), customer.email.as_str())
            .build(&self.config)?;
        trace!("💳️ Payment request for order #{}: {:?}", order.id, request.fields);
        Ok(PaymentDetails {
            payment_method: order.payment_details.payment_method.clone(),
            payment_url: Some(request.payment_url),
            payment_data: Some(request.fields),
        })
    }

    pub fn signature_matches(&self, notification: &ItnNotification) -> bool {
        notification.signature_matches(self.config.passphrase.reveal())
    }
}

impl<V> PaymentGatewayAdapter<V>
where V: NotificationValidator
{
    /// Asks the gateway to confirm the untouched notification body. Errors and timeouts count as "not confirmed".
    pub async fn verify_with_gateway(&self, raw_body: &[u8]) -> bool {
        match self.validator.validate_notification(raw_body).await {
            Ok(valid) => {
                if !valid {
                    warn!("💳️ The gateway rejected a payment notification");
                }
                valid
            },
            Err(e) => {
                warn!("💳️ Could not confirm a payment notification with the gateway: {e}");
                false
            },
        }
    }
}
