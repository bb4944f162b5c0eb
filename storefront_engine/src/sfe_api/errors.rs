use thiserror::Error;

use crate::{db_types::OrderStatusType, traits::OrderManagementError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderFlowError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The cart is empty")]
    EmptyCart,
    #[error("Insufficient stock for product {product_id}. Requested {requested}, but only {available} available")]
    InsufficientStock { product_id: i64, requested: i64, available: i64 },
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Order {order_id} is {status} and cannot be paid for")]
    OrderNotPayable { order_id: i64, status: OrderStatusType },
    #[error("Invalid checkout request: {0}")]
    InvalidRequest(String),
    #[error("Could not create a payment request: {0}")]
    PaymentRequestError(String),
    #[error("The order total is too large to be represented: {0}")]
    AmountTooLarge(String),
}

impl From<OrderManagementError> for OrderFlowError {
    fn from(e: OrderManagementError) -> Self {
        match e {
            OrderManagementError::DatabaseError(s) => Self::DatabaseError(s),
            OrderManagementError::EmptyCart => Self::EmptyCart,
            OrderManagementError::ProductNotFound(id) => Self::ProductNotFound(id),
            OrderManagementError::InsufficientStock { product_id, requested, available } => {
                Self::InsufficientStock { product_id, requested, available }
            },
            OrderManagementError::AmountTooLarge(s) => Self::AmountTooLarge(s),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The notification signature is missing or incorrect")]
    InvalidSignature,
    #[error("The payment gateway did not confirm the notification")]
    InvalidNotification,
}

impl From<OrderManagementError> for WebhookError {
    fn from(e: OrderManagementError) -> Self {
        Self::DatabaseError(e.to_string())
    }
}
