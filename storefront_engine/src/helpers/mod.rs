mod memory_catalog_cache;

pub use memory_catalog_cache::MemoryCatalogCache;
