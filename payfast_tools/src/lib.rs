//! # PayFast tools
//!
//! Everything needed to speak the PayFast redirect-and-notify protocol:
//!
//! * [`FieldSet`] - an insertion-ordered set of form fields. The gateway signs fields in the order they are sent, so
//!   ordering is part of the wire format.
//! * [`signature`] - the MD5 signature scheme used on outbound payment requests and inbound ITNs.
//! * [`PaymentRequest`] - builds the signed form a customer is redirected to.
//! * [`ItnNotification`] - parses an inbound instant transaction notification.
//! * [`PayfastApi`] - the HTTP client that asks the gateway to confirm a notification.
mod api;
mod config;
mod error;
mod field_set;
mod notification;
mod payment_request;
pub mod signature;

pub use api::PayfastApi;
pub use config::{PayfastConfig, LIVE_BASE_URL, SANDBOX_BASE_URL};
pub use error::PayfastApiError;
pub use field_set::FieldSet;
pub use notification::{ItnNotification, PaymentStatus};
pub use payment_request::{PaymentRequest, PaymentRequestBuilder};
