//! Helpers for tests that need a real database or a stand-in for the payment gateway.
mod fake_validator;
pub mod notifications;
pub mod prepare_env;

pub use fake_validator::FakeValidator;
