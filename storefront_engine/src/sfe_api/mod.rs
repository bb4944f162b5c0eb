//! # Storefront engine public API
//!
//! The `sfe_api` module exposes the programmatic API of the storefront engine. Each API covers one concern, so that
//! clients can pick the functionality they need.
//!
//! * [`catalog_api`] reads products through a cache and lets administrators create and update them.
//! * [`cart_api`] manages each customer's cart.
//! * [`order_flow_api`] converts carts into orders and attaches signed payment requests.
//! * [`webhook_api`] reconciles orders with the payment notifications sent by the gateway.
//! * [`stock_api`] applies the stock deductions scheduled at checkout.
//! * [`payment_gateway`] wraps the gateway configuration and the notification validator.
//!
//! # API usage
//!
//! An API instance is created by supplying a backend that implements the traits the API needs.
//!
//! ```rust,ignore
//! use storefront_engine::{CartApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements CartManagement
//! let api = CartApi::new(db);
//! let cart = api.list(&customer).await?;
//! ```

pub mod cart_api;
pub mod catalog_api;
pub mod errors;
pub mod order_flow_api;
pub mod order_objects;
pub mod payment_gateway;
pub mod stock_api;
pub mod webhook_api;
