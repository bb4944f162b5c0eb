use thiserror::Error;

use crate::db_types::{NewProduct, Product, ProductUpdate};

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Invalid product: {0}")]
    InvalidProduct(String),
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogError>;

    /// All products, ordered by id.
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError>;

    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogError>;

    /// Applies the non-empty fields of `update` to the product. Returns `None` if the product does not exist.
    async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Option<Product>, CatalogError>;
}
