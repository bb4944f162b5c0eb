mod cents;
pub mod helpers;
pub mod op;
mod secret;

pub use cents::{Cents, CentsConversionError, CURRENCY_CODE};
pub use helpers::parse_boolean_flag;
pub use secret::Secret;
