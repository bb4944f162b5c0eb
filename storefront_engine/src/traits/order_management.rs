use thiserror::Error;

use crate::db_types::{Order, OrderItem, OrderStatusType, PaymentDetails, ShippingAddress};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderManagementError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The cart is empty")]
    EmptyCart,
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Insufficient stock for product {product_id}. Requested {requested}, but only {available} available")]
    InsufficientStock { product_id: i64, requested: i64, available: i64 },
    #[error("The order total is too large to be represented: {0}")]
    AmountTooLarge(String),
}

impl From<sqlx::Error> for OrderManagementError {
    fn from(e: sqlx::Error) -> Self {
        OrderManagementError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Converts the user's whole cart into a pending order, in a single atomic transaction:
    /// * the cart lines are removed,
    /// * every line is checked against the product's available stock, i.e. its stock less the quantities reserved
    ///   by orders whose stock deduction has not been applied yet,
    /// * the order is stored with the sum of `price * quantity` as its total,
    /// * one order item per line is stored with the unit price at this instant,
    /// * a stock deduction is scheduled for the order.
    ///
    /// Nothing is changed if any step fails.
    async fn checkout(
        &self,
        user_id: i64,
        shipping_address: ShippingAddress,
        payment_method: &str,
    ) -> Result<(Order, Vec<OrderItem>), OrderManagementError>;

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, OrderManagementError>;

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderManagementError>;

    /// The user's orders, newest first.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, OrderManagementError>;

    /// Stores the payment details on a *pending* order. Returns `None` if the order does not exist or is no longer
    /// pending.
    async fn attach_payment_details(
        &self,
        order_id: i64,
        details: PaymentDetails,
    ) -> Result<Option<Order>, OrderManagementError>;

    /// Moves a *pending* order to `new_status` with a single conditional update. Returns the updated order, or `None`
    /// if the order was not pending (or does not exist), in which case nothing changed.
    async fn transition_order_status(
        &self,
        order_id: i64,
        new_status: OrderStatusType,
    ) -> Result<Option<Order>, OrderManagementError>;
}
