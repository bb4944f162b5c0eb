use serde::{Deserialize, Serialize};

use crate::db_types::{Cents, CartLine, OrderStatusType, ShippingAddress};

/// A customer's cart, priced at current product prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    pub items: Vec<CartLine>,
    pub total: Cents,
}

impl CartSummary {
    /// Returns `None` if the cart total cannot be represented.
    pub fn new(items: Vec<CartLine>) -> Option<Self> {
        let total = Cents::checked_sum(items.iter().map(|l| l.line_total))?;
        Some(Self { items, total })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
}

/// What processing a payment notification did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NotificationOutcome {
    /// The order moved from `from` to `to`.
    Transitioned { order_id: i64, from: OrderStatusType, to: OrderStatusType },
    /// The order had already left `pending`. Nothing changed.
    AlreadyFinal { order_id: i64, status: OrderStatusType },
    /// The payment status does not correspond to a transition. Nothing changed.
    Ignored { order_id: i64, payment_status: String },
    /// The notification does not reference a known order. Nothing changed.
    UnknownOrder { reference: Option<String> },
}

impl NotificationOutcome {
    pub fn changed_state(&self) -> bool {
        matches!(self, Self::Transitioned { .. })
    }
}
