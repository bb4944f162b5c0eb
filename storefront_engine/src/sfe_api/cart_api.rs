use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{CartItem, Customer},
    sfe_api::order_objects::CartSummary,
    traits::{CartError, CartManagement},
};

/// `CartApi` manages the lines a customer intends to buy.
pub struct CartApi<B> {
    db: B,
}

impl<B> Debug for CartApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CartApi")
    }
}

impl<B> CartApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CartApi<B>
where B: CartManagement
{
    /// Adds `quantity` units of a product to the customer's cart. Adding a product that is already in the cart
    /// increases the quantity of the existing line.
    pub async fn add(&self, customer: &Customer, product_id: i64, quantity: i64) -> Result<CartItem, CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        let item = self.db.add_to_cart(customer.id, product_id, quantity).await?;
        info!("🛒️ {} added {quantity} of product {product_id} to their cart", customer.username);
        Ok(item)
    }

    pub async fn list(&self, customer: &Customer) -> Result<CartSummary, CartError> {
        let lines = self.db.fetch_cart(customer.id).await?;
        CartSummary::new(lines).ok_or_else(|| {
            warn!("🛒️ The cart total for {} cannot be represented", customer.username);
            CartError::AmountTooLarge(format!("cart total for user {}", customer.id))
        })
    }

    pub async fn remove(&self, customer: &Customer, item_id: i64) -> Result<(), CartError> {
        self.db.remove_cart_item(customer.id, item_id).await
    }

    pub async fn set_quantity(&self, customer: &Customer, item_id: i64, quantity: i64) -> Result<CartItem, CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        self.db.set_cart_item_quantity(customer.id, item_id, quantity).await
    }
}
