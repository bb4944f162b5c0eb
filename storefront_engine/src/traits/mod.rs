//! # Backend contracts
//!
//! This module defines the behaviour that storage backends and external collaborators must expose in order to be
//! used by the storefront engine APIs.
//!
//! * [`CatalogManagement`] reads and writes products.
//! * [`CartManagement`] maintains each customer's pending cart lines.
//! * [`OrderManagement`] performs the atomic cart-to-order conversion and the conditional order status updates.
//! * [`StockManagement`] applies the deferred, once-per-order stock deductions.
//! * [`NotificationValidator`] asks the payment gateway to confirm an inbound notification.
//! * [`CatalogCache`] is the injectable read-through cache for products.
mod cart_management;
mod catalog_cache;
mod catalog_management;
mod data_objects;
mod notification_validator;
mod order_management;
mod stock_management;

pub use cart_management::{CartError, CartManagement};
pub use catalog_cache::CatalogCache;
pub use catalog_management::{CatalogError, CatalogManagement};
pub use data_objects::{StockAdjustment, StockDeductionResult};
pub use notification_validator::NotificationValidator;
pub use order_management::{OrderManagement, OrderManagementError};
pub use stock_management::{StockError, StockManagement};
