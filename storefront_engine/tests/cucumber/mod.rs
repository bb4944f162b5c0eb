mod setup;

pub use world::StoreWorld;
