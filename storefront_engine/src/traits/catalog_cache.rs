use crate::db_types::Product;

/// A read-through cache for products, keyed by product id.
///
/// Anything that changes a product (admin updates, stock deductions) must invalidate its entry.
pub trait CatalogCache: Send + Sync {
    fn get(&self, product_id: i64) -> Option<Product>;

    fn set(&self, product: Product);

    fn invalidate(&self, product_id: i64);

    fn clear(&self);
}
