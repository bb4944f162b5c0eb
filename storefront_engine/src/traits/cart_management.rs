use thiserror::Error;

use crate::db_types::{CartItem, CartLine};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Quantity must be greater than zero, but was {0}")]
    InvalidQuantity(i64),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Cart item {0} does not exist")]
    CartItemNotFound(i64),
    #[error("Insufficient stock for product {product_id}. Requested {requested}, but only {available} available")]
    InsufficientStock { product_id: i64, requested: i64, available: i64 },
    #[error("The cart amount is too large to be represented: {0}")]
    AmountTooLarge(String),
}

impl From<sqlx::Error> for CartError {
    fn from(e: sqlx::Error) -> Self {
        CartError::DatabaseError(e.to_string())
    }
}

/// Cart lines are unique per (user, product). Every method that changes a quantity checks the result against the
/// product's current stock and leaves the cart untouched if the check fails.
#[allow(async_fn_in_trait)]
pub trait CartManagement {
    /// Adds `quantity` units of the product to the user's cart, accumulating into the existing line if there is one.
    async fn add_to_cart(&self, user_id: i64, product_id: i64, quantity: i64) -> Result<CartItem, CartError>;

    /// The user's cart lines, in the order they were added, priced at current product prices.
    async fn fetch_cart(&self, user_id: i64) -> Result<Vec<CartLine>, CartError>;

    /// Removes the line. Fails with `CartItemNotFound` if the line does not belong to the user.
    async fn remove_cart_item(&self, user_id: i64, item_id: i64) -> Result<(), CartError>;

    /// Replaces the quantity of a line. Fails with `CartItemNotFound` if the line does not belong to the user.
    async fn set_cart_item_quantity(&self, user_id: i64, item_id: i64, quantity: i64) -> Result<CartItem, CartError>;
}
