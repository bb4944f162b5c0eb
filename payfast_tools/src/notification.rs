use std::fmt::Display;

use crate::{
    signature::{verify, SIGNATURE_FIELD},
    FieldSet,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Complete,
    Cancelled,
    Other(String),
}

impl From<&str> for PaymentStatus {
    fn from(value: &str) -> Self {
        match value.trim() {
            "COMPLETE" => Self::Complete,
            "CANCELLED" => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete => write!(f, "COMPLETE"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// An instant transaction notification, as posted by the gateway to the merchant's `notify_url`.
///
/// The `signature` field is split off from the rest of the fields. The raw body is retained untouched, since that is
/// what must be echoed back to the gateway for validation.
#[derive(Debug, Clone)]
pub struct ItnNotification {
    raw: Vec<u8>,
    fields: FieldSet,
    signature: Option<String>,
}

impl ItnNotification {
    pub fn parse(body: &[u8]) -> Self {
        let raw = body.to_vec();
        let mut fields = FieldSet::from_urlencoded(body);
        let signature = fields.remove(SIGNATURE_FIELD).filter(|s| !s.trim().is_empty());
        Self { raw, fields, signature }
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The notification's fields, without the signature.
    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// The merchant's payment reference. This is the id of the order the payment is for.
    pub fn payment_id(&self) -> Option<&str> {
        self.fields.get("m_payment_id").map(str::trim).filter(|s| !s.is_empty())
    }

    /// The gateway's own transaction id.
    pub fn gateway_payment_id(&self) -> Option<&str> {
        self.fields.get("pf_payment_id")
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.fields.get("payment_status").map(PaymentStatus::from).unwrap_or_else(|| PaymentStatus::Other(String::new()))
    }

    /// `false` if the signature is missing or does not match the recomputed one.
    pub fn signature_matches(&self, passphrase: &str) -> bool {
        self.signature.as_deref().map(|s| verify(&self.fields, s, passphrase)).unwrap_or(false)
    }
}
