use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use log::trace;

use crate::{db_types::Product, traits::CatalogCache};

/// An in-process [`CatalogCache`] with a fixed time-to-live. Expired entries are evicted lazily on access.
#[derive(Clone)]
pub struct MemoryCatalogCache {
    inner: Arc<DashMap<i64, (Product, Instant)>>,
    ttl: Duration,
}

impl MemoryCatalogCache {
    pub fn new(ttl: Duration) -> Self {
        Self { inner: Arc::new(DashMap::new()), ttl }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl CatalogCache for MemoryCatalogCache {
    fn get(&self, product_id: i64) -> Option<Product> {
        if let Some(entry) = self.inner.get(&product_id) {
            let (product, inserted) = entry.value();
            if inserted.elapsed() < self.ttl {
                trace!("🛍️ Cache hit for product {product_id}");
                return Some(product.clone());
            }
            // release the read guard before removing
            drop(entry);
            self.inner.remove(&product_id);
        }
        None
    }

    fn set(&self, product: Product) {
        self.inner.insert(product.id, (product, Instant::now()));
    }

    fn invalidate(&self, product_id: i64) {
        self.inner.remove(&product_id);
    }

    fn clear(&self) {
        self.inner.clear();
    }
}
