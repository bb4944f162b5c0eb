//! `SqliteDatabase` is a concrete implementation of a storefront engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the storage traits defined in the [`traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};

use super::db::{
    cart,
    db_url,
    new_pool,
    orders::{self, NewOrderItem},
    products,
    stock,
};
use crate::{
    db_types::{
        Cents,
        CartItem,
        CartLine,
        NewProduct,
        Order,
        OrderItem,
        OrderStatusType,
        PaymentDetails,
        Product,
        ProductUpdate,
        ShippingAddress,
    },
    traits::{
        CartError,
        CartManagement,
        CatalogError,
        CatalogManagement,
        OrderManagement,
        OrderManagementError,
        StockAdjustment,
        StockDeductionResult,
        StockError,
        StockManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::fetch_products(&mut conn).await?;
        Ok(products)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::insert_product(product, &mut conn).await?;
        Ok(product)
    }

    async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Option<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::update_product(product_id, update, &mut conn).await?;
        Ok(product)
    }
}

impl CartManagement for SqliteDatabase {
    /// The upsert happens first, so the transaction holds the write lock when the accumulated quantity is compared
    /// with the product's stock. The transaction is rolled back if the check fails.
    async fn add_to_cart(&self, user_id: i64, product_id: i64, quantity: i64) -> Result<CartItem, CartError> {
        let mut tx = self.pool.begin().await?;
        let upserted = cart::upsert_cart_item(user_id, product_id, quantity, &mut tx).await?;
        let product =
            products::fetch_product(product_id, &mut tx).await?.ok_or(CartError::ProductNotFound(product_id))?;
        let Some(item) = upserted else {
            // The product exists, so the accumulated quantity overflowed
            let existing = cart::fetch_cart_quantity(user_id, product_id, &mut tx).await?.unwrap_or_default();
            tx.rollback().await?;
            return Err(CartError::InsufficientStock {
                product_id,
                requested: existing.saturating_add(quantity),
                available: product.stock,
            });
        };
        if item.quantity > product.stock {
            debug!(
                "🛒️ User {user_id} asked for {} of product {product_id}, but only {} are in stock",
                item.quantity, product.stock
            );
            tx.rollback().await?;
            return Err(CartError::InsufficientStock {
                product_id,
                requested: item.quantity,
                available: product.stock,
            });
        }
        if product.price.checked_mul(item.quantity).is_none() {
            tx.rollback().await?;
            return Err(CartError::AmountTooLarge(format!("{} of product {product_id}", item.quantity)));
        }
        tx.commit().await?;
        debug!("🛒️ User {user_id} now has {} of product {product_id} in their cart", item.quantity);
        Ok(item)
    }

    async fn fetch_cart(&self, user_id: i64) -> Result<Vec<CartLine>, CartError> {
        let mut conn = self.pool.acquire().await?;
        let rows = cart::fetch_cart_lines(user_id, &mut conn).await?;
        rows.into_iter()
            .map(|row| {
                let (product_id, quantity) = (row.product_id, row.quantity);
                row.priced().ok_or_else(|| CartError::AmountTooLarge(format!("{quantity} of product {product_id}")))
            })
            .collect()
    }

    async fn remove_cart_item(&self, user_id: i64, item_id: i64) -> Result<(), CartError> {
        let mut conn = self.pool.acquire().await?;
        if cart::delete_cart_item(user_id, item_id, &mut conn).await? {
            debug!("🛒️ Cart item {item_id} removed for user {user_id}");
            Ok(())
        } else {
            Err(CartError::CartItemNotFound(item_id))
        }
    }

    async fn set_cart_item_quantity(&self, user_id: i64, item_id: i64, quantity: i64) -> Result<CartItem, CartError> {
        let mut tx = self.pool.begin().await?;
        let item = cart::update_cart_item_quantity(user_id, item_id, quantity, &mut tx)
            .await?
            .ok_or(CartError::CartItemNotFound(item_id))?;
        let product = products::fetch_product(item.product_id, &mut tx)
            .await?
            .ok_or(CartError::ProductNotFound(item.product_id))?;
        if quantity > product.stock {
            tx.rollback().await?;
            return Err(CartError::InsufficientStock {
                product_id: item.product_id,
                requested: quantity,
                available: product.stock,
            });
        }
        if product.price.checked_mul(quantity).is_none() {
            tx.rollback().await?;
            return Err(CartError::AmountTooLarge(format!("{quantity} of product {}", item.product_id)));
        }
        tx.commit().await?;
        debug!("🛒️ Cart item {item_id} for user {user_id} set to {quantity}");
        Ok(item)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn checkout(
        &self,
        user_id: i64,
        shipping_address: ShippingAddress,
        payment_method: &str,
    ) -> Result<(Order, Vec<OrderItem>), OrderManagementError> {
        let mut tx = self.pool.begin().await?;
        // Emptying the cart is the first write, which serialises concurrent checkouts on the write lock.
        let cart_items = cart::take_cart(user_id, &mut tx).await?;
        if cart_items.is_empty() {
            tx.rollback().await?;
            return Err(OrderManagementError::EmptyCart);
        }
        let mut lines = Vec::with_capacity(cart_items.len());
        for item in &cart_items {
            let (price, available) = orders::fetch_price_and_availability(item.product_id, &mut tx)
                .await?
                .ok_or(OrderManagementError::ProductNotFound(item.product_id))?;
            if item.quantity > available {
                debug!(
                    "🗃️ Checkout for user {user_id} failed. Product {} has {available} available, but {} were requested",
                    item.product_id, item.quantity
                );
                tx.rollback().await?;
                return Err(OrderManagementError::InsufficientStock {
                    product_id: item.product_id,
                    requested: item.quantity,
                    available,
                });
            }
            lines.push(NewOrderItem { product_id: item.product_id, quantity: item.quantity, price });
        }
        let total = lines
            .iter()
            .try_fold(Cents::default(), |total, l| l.price.checked_mul(l.quantity).and_then(|t| total.checked_add(t)));
        let Some(total) = total else {
            debug!("🗃️ Checkout for user {user_id} failed. The order total cannot be represented");
            tx.rollback().await?;
            return Err(OrderManagementError::AmountTooLarge(format!("checkout for user {user_id}")));
        };
        let details = PaymentDetails::unrequested(payment_method);
        let order = orders::insert_order(user_id, total, shipping_address, details, &mut tx).await?;
        let items = orders::insert_order_items(order.id, &lines, &mut tx).await?;
        stock::schedule_stock_deduction(order.id, &mut tx).await?;
        tx.commit().await?;
        info!("🗃️ Order #{} created for user {user_id} with {} items. Total: {total}", order.id, items.len());
        Ok((order, items))
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let items = orders::fetch_order_items(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }

    async fn attach_payment_details(
        &self,
        order_id: i64,
        details: PaymentDetails,
    ) -> Result<Option<Order>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_payment_details(order_id, details, &mut conn).await?;
        Ok(order)
    }

    async fn transition_order_status(
        &self,
        order_id: i64,
        new_status: OrderStatusType,
    ) -> Result<Option<Order>, OrderManagementError> {
        if !OrderStatusType::Pending.can_transition_to(new_status) {
            warn!("🗃️ Refusing to move order #{order_id} to {new_status}");
            return Ok(None);
        }
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_pending_order_status(order_id, new_status, &mut conn).await?;
        if order.is_some() {
            debug!("🗃️ Order #{order_id} is now {new_status}");
        }
        Ok(order)
    }
}

impl StockManagement for SqliteDatabase {
    async fn pending_stock_deductions(&self, limit: i64) -> Result<Vec<i64>, StockError> {
        let mut conn = self.pool.acquire().await?;
        let ids = stock::fetch_pending_deductions(limit, &mut conn).await?;
        Ok(ids)
    }

    async fn apply_stock_deduction(&self, order_id: i64) -> Result<StockDeductionResult, StockError> {
        let mut tx = self.pool.begin().await?;
        if !stock::mark_deduction_processed(order_id, &mut tx).await? {
            let result = if stock::deduction_exists(order_id, &mut tx).await? {
                StockDeductionResult::AlreadyApplied(order_id)
            } else {
                StockDeductionResult::NotScheduled(order_id)
            };
            tx.rollback().await?;
            return Ok(result);
        }
        let items = orders::fetch_order_items(order_id, &mut tx).await?;
        let mut adjustments = Vec::with_capacity(items.len());
        for item in items {
            let deducted = products::deduct_stock(item.product_id, item.quantity, &mut tx).await?.unwrap_or(0);
            let adjustment = StockAdjustment { product_id: item.product_id, requested: item.quantity, deducted };
            if adjustment.shortfall() > 0 {
                warn!(
                    "🗃️ Stock shortfall for product {} in order #{order_id}. {} requested, {} deducted",
                    item.product_id, item.quantity, deducted
                );
            }
            adjustments.push(adjustment);
        }
        tx.commit().await?;
        debug!("🗃️ Stock deducted for order #{order_id}");
        Ok(StockDeductionResult::Applied { order_id, adjustments })
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
