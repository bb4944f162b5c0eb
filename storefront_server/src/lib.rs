//! # Storefront server
//! The HTTP front end for the storefront engine. It is responsible for:
//! * Serving the product catalog.
//! * Managing authenticated customers' carts, checkouts and orders.
//! * Receiving payment notifications from PayFast and handing them to the engine for reconciliation.
//! * Running the background stock worker.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/products`, `/api/cart`, `/api/checkout`, `/api/orders`: the storefront API. Everything except the catalog
//!   reads requires a bearer token.
//! * `/api/webhook/payment`: PayFast instant transaction notifications.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod stock_worker;

#[cfg(test)]
mod endpoint_tests;
