//! Storefront Engine
//!
//! The storefront engine holds the core logic of the shop: the product catalog, customer carts, checkout, and the
//! reconciliation of orders and stock with the PayFast payment gateway. It knows nothing about HTTP.
//!
//! The library is divided into these sections:
//! 1. Storage contracts ([`traits`]) and the SQLite backend that implements them. You should not need to touch the
//!    database directly. The data types stored in the database live in [`db_types`] and are public.
//! 2. The public API (`sfe_api`). Every API is generic over a backend that implements the traits it needs.
//! 3. Events. An `OrderCreated` event is emitted after every checkout and an `OrderStatusChanged` event whenever a
//!    payment notification completes or cancels an order. Hook into them with [`events::EventHooks`].
pub mod db_types;
pub mod events;
pub mod helpers;
mod sfe_api;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use sfe_api::{
    cart_api::CartApi,
    catalog_api::CatalogApi,
    errors::{OrderFlowError, WebhookError},
    order_flow_api::OrderFlowApi,
    order_objects,
    payment_gateway::PaymentGatewayAdapter,
    stock_api::StockApi,
    webhook_api::WebhookApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
