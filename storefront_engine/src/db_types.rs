use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::*;
use payfast_tools::FieldSet;
use serde::{Deserialize, Serialize};
pub use sf_common::Cents;
use sqlx::{types::Json, FromRow, Type};
use thiserror::Error;

//--------------------------------------       Customer       ---------------------------------------------------------
/// The authenticated principal on whose behalf cart and order operations are carried out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl Customer {
    pub fn new<S1: Into<String>, S2: Into<String>>(id: i64, username: S1, email: S2) -> Self {
        Self { id, username: username.into(), email: email.into() }
    }
}

//--------------------------------------        Product       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Cents,
    pub stock: i64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Cents,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewProduct {
    pub fn new<S: Into<String>>(name: S, price: Cents, stock: i64) -> Self {
        Self { name: name.into(), description: String::default(), price, stock, image_url: None }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }
}

/// A partial update to a product. Fields left as `None` are unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Cents>,
    pub stock: Option<i64>,
    pub image_url: Option<String>,
}

impl ProductUpdate {
    pub fn with_price(mut self, price: Cents) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = Some(stock);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() &&
            self.description.is_none() &&
            self.price.is_none() &&
            self.stock.is_none() &&
            self.image_url.is_none()
    }
}

//--------------------------------------       CartItem       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

/// A cart item joined with its product, priced at the product's *current* price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: Cents,
    pub quantity: i64,
    pub line_total: Cents,
}

#[derive(Debug, Clone, FromRow)]
pub struct CartLineRow {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: Cents,
    pub quantity: i64,
}

impl CartLineRow {
    /// Prices the line. Returns `None` if the line total cannot be represented.
    pub fn priced(self) -> Option<CartLine> {
        let line_total = self.unit_price.checked_mul(self.quantity)?;
        Some(CartLine {
            id: self.id,
            product_id: self.product_id,
            product_name: self.product_name,
            unit_price: self.unit_price,
            quantity: self.quantity,
            line_total,
        })
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The order has been created and is awaiting payment.
    Pending,
    /// The gateway confirmed the payment.
    Completed,
    /// The customer or the gateway cancelled the payment.
    Cancelled,
}

impl OrderStatusType {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// The transition table. Only pending orders move, and only to a terminal state.
    pub fn can_transition_to(&self, next: OrderStatusType) -> bool {
        matches!((self, next), (Self::Pending, Self::Completed) | (Self::Pending, Self::Cancelled))
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "pending"),
            OrderStatusType::Completed => write!(f, "completed"),
            OrderStatusType::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------   ShippingAddress     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
}

impl ShippingAddress {
    /// The names of any blank fields.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("country", &self.country),
            ("postal_code", &self.postal_code),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect()
    }
}

//--------------------------------------    PaymentDetails     ---------------------------------------------------------
/// Payment information attached to an order.
///
/// `payment_url` and `payment_data` stay empty until a signed payment request has been built for the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub payment_method: String,
    pub payment_url: Option<String>,
    pub payment_data: Option<FieldSet>,
}

impl PaymentDetails {
    pub fn unrequested<S: Into<String>>(payment_method: S) -> Self {
        Self { payment_method: payment_method.into(), payment_url: None, payment_data: None }
    }

    pub fn is_requested(&self) -> bool {
        self.payment_url.is_some() && self.payment_data.is_some()
    }
}

//--------------------------------------        Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub total_amount: Cents,
    pub status: OrderStatusType,
    pub shipping_address: ShippingAddress,
    pub payment_details: PaymentDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The storage representation of an [`Order`]. The structured fields are stored as JSON text.
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub user_id: i64,
    pub total_amount: Cents,
    pub status: OrderStatusType,
    pub shipping_address: Json<ShippingAddress>,
    pub payment_details: Json<PaymentDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            total_amount: row.total_amount,
            status: row.status,
            shipping_address: row.shipping_address.0,
            payment_details: row.payment_details.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

//--------------------------------------      OrderItem       ---------------------------------------------------------
/// A line of an order. `price` is the unit price at the moment of checkout.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub price: Cents,
}

impl OrderItem {
    pub fn line_total(&self) -> Option<Cents> {
        self.price.checked_mul(self.quantity)
    }
}

/// An order together with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl OrderDetails {
    pub fn new(order: Order, items: Vec<OrderItem>) -> Self {
        let details = Self { order, items };
        if !details.totals_match() {
            error!(
                "🗃️ Order #{} has a total of {} but its items add up to {}",
                details.order.id,
                details.order.total_amount,
                details.items_total().map(|t| t.to_string()).unwrap_or_else(|| "an unrepresentable amount".into())
            );
        }
        details
    }

    pub fn items_total(&self) -> Option<Cents> {
        self.items.iter().try_fold(Cents::default(), |total, item| total.checked_add(item.line_total()?))
    }

    pub fn totals_match(&self) -> bool {
        self.items_total() == Some(self.order.total_amount)
    }
}
