use serde::{Deserialize, Serialize};
use sf_common::Cents;

use crate::{
    signature::{sign, SIGNATURE_FIELD},
    FieldSet,
    PayfastApiError,
    PayfastConfig,
};

/// A signed payment form, ready to be posted to [`PaymentRequest::payment_url`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub payment_url: String,
    pub fields: FieldSet,
}

/// Assembles the outbound payment request fields in the order the gateway expects them.
#[derive(Debug, Clone, Default)]
pub struct PaymentRequestBuilder {
    payment_id: String,
    amount: Cents,
    item_name: Option<String>,
    name_first: String,
    email_address: String,
}

impl PaymentRequestBuilder {
    pub fn new<S: Into<String>>(payment_id: S, amount: Cents) -> Self {
        Self { payment_id: payment_id.into(), amount, ..Default::default() }
    }

    pub fn item_name<S: Into<String>>(mut self, item_name: S) -> Self {
        self.item_name = Some(item_name.into());
        self
    }

    pub fn customer<S1: Into<String>, S2: Into<String>>(mut self, name_first: S1, email_address: S2) -> Self {
        self.name_first = name_first.into();
        self.email_address = email_address.into();
        self
    }

    pub fn build(self, config: &PayfastConfig) -> Result<PaymentRequest, PayfastApiError> {
        if config.merchant_id.trim().is_empty() || config.merchant_key.trim().is_empty() {
            return Err(PayfastApiError::Configuration("Merchant id and key must both be set".into()));
        }
        if !self.amount.is_positive() {
            return Err(PayfastApiError::Configuration(format!("Cannot request a payment of {}", self.amount)));
        }
        let item_name = self.item_name.unwrap_or_else(|| format!("Order #{}", self.payment_id));
        let mut fields = FieldSet::new()
            .with("merchant_id", config.merchant_id.as_str())
            .with("merchant_key", config.merchant_key.as_str())
            .with("return_url", config.return_url.as_str())
            .with("cancel_url", config.cancel_url.as_str())
            .with("notify_url", config.notify_url.as_str())
            .with("m_payment_id", self.payment_id)
            .with("amount", self.amount.to_string())
            .with("item_name", item_name)
            .with("name_first", self.name_first)
            .with("email_address", self.email_address);
        let signature = sign(&fields, config.passphrase.reveal());
        fields.push(SIGNATURE_FIELD, signature);
        Ok(PaymentRequest { payment_url: config.process_url(), fields })
    }
}
