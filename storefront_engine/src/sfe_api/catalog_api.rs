use std::{fmt::Debug, sync::Arc};

use log::*;

use crate::{
    db_types::{Cents, NewProduct, Product, ProductUpdate},
    traits::{CatalogCache, CatalogError, CatalogManagement},
};

/// Product reads go through the injected [`CatalogCache`]. Writes invalidate the affected entry.
pub struct CatalogApi<B> {
    db: B,
    cache: Arc<dyn CatalogCache>,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B> CatalogApi<B> {
    pub fn new(db: B, cache: Arc<dyn CatalogCache>) -> Self {
        Self { db, cache }
    }

    pub fn cache(&self) -> Arc<dyn CatalogCache> {
        Arc::clone(&self.cache)
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub async fn product(&self, product_id: i64) -> Result<Product, CatalogError> {
        if let Some(product) = self.cache.get(product_id) {
            return Ok(product);
        }
        let product = self.db.fetch_product(product_id).await?.ok_or(CatalogError::ProductNotFound(product_id))?;
        self.cache.set(product.clone());
        Ok(product)
    }

    pub async fn products(&self) -> Result<Vec<Product>, CatalogError> {
        self.db.fetch_products().await
    }

    pub async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        if product.name.trim().is_empty() {
            return Err(CatalogError::InvalidProduct("name cannot be empty".into()));
        }
        validate_price_and_stock(Some(&product.price), Some(product.stock))?;
        let product = self.db.insert_product(product).await?;
        info!("🛍️ Product #{} [{}] created", product.id, product.name);
        Ok(product)
    }

    pub async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Product, CatalogError> {
        if matches!(&update.name, Some(name) if name.trim().is_empty()) {
            return Err(CatalogError::InvalidProduct("name cannot be empty".into()));
        }
        validate_price_and_stock(update.price.as_ref(), update.stock)?;
        let product =
            self.db.update_product(product_id, update).await?.ok_or(CatalogError::ProductNotFound(product_id))?;
        self.cache.invalidate(product_id);
        info!("🛍️ Product #{product_id} updated");
        Ok(product)
    }
}

fn validate_price_and_stock(price: Option<&Cents>, stock: Option<i64>) -> Result<(), CatalogError> {
    if let Some(price) = price {
        if !price.is_positive() {
            return Err(CatalogError::InvalidProduct(format!("price must be positive, but was {price}")));
        }
    }
    if let Some(stock) = stock {
        if stock < 0 {
            return Err(CatalogError::InvalidProduct(format!("stock cannot be negative, but was {stock}")));
        }
    }
    Ok(())
}
