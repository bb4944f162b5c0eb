use std::time::Duration;

use log::*;
use sf_common::{helpers::parse_env_or, parse_boolean_flag, Secret};

pub const SANDBOX_BASE_URL: &str = "https://sandbox.payfast.co.za";
pub const LIVE_BASE_URL: &str = "https://www.payfast.co.za";

const DEFAULT_VALIDATION_TIMEOUT: u64 = 10;
const DEFAULT_VALIDATION_RETRIES: u32 = 2;

#[derive(Debug, Clone)]
pub struct PayfastConfig {
    pub merchant_id: String,
    pub merchant_key: String,
    pub passphrase: Secret<String>,
    pub sandbox: bool,
    /// Replaces the sandbox/live host when set. Mostly useful for pointing the client at a mock gateway.
    pub base_url_override: Option<String>,
    pub return_url: String,
    pub cancel_url: String,
    pub notify_url: String,
    /// Per-attempt timeout for the notification validation call.
    pub validation_timeout: Duration,
    /// Additional attempts made after a failed validation call.
    pub validation_retries: u32,
    /// Delay before the first retry. Doubles with every subsequent attempt.
    pub retry_backoff: Duration,
}

impl Default for PayfastConfig {
    fn default() -> Self {
        Self {
            merchant_id: String::default(),
            merchant_key: String::default(),
            passphrase: Secret::default(),
            sandbox: true,
            base_url_override: None,
            return_url: String::default(),
            cancel_url: String::default(),
            notify_url: String::default(),
            validation_timeout: Duration::from_secs(DEFAULT_VALIDATION_TIMEOUT),
            validation_retries: DEFAULT_VALIDATION_RETRIES,
            retry_backoff: Duration::from_millis(250),
        }
    }
}

impl PayfastConfig {
    pub fn new_from_env_or_default() -> Self {
        let merchant_id = std::env::var("SF_PAYFAST_MERCHANT_ID").unwrap_or_else(|_| {
            warn!("💳️ SF_PAYFAST_MERCHANT_ID not set. Payment requests cannot be built until it is configured.");
            String::default()
        });
        let merchant_key = std::env::var("SF_PAYFAST_MERCHANT_KEY").unwrap_or_else(|_| {
            warn!("💳️ SF_PAYFAST_MERCHANT_KEY not set. Payment requests cannot be built until it is configured.");
            String::default()
        });
        let passphrase = Secret::new(std::env::var("SF_PAYFAST_PASSPHRASE").unwrap_or_else(|_| {
            warn!("💳️ SF_PAYFAST_PASSPHRASE not set. Signatures will be computed without a passphrase.");
            String::default()
        }));
        let sandbox = parse_boolean_flag(std::env::var("SF_PAYFAST_SANDBOX").ok(), true);
        if sandbox {
            info!("💳️ Using the PayFast sandbox");
        }
        let base_url_override = std::env::var("SF_PAYFAST_BASE_URL").ok().filter(|s| !s.trim().is_empty());
        if let Some(url) = &base_url_override {
            info!("💳️ PayFast base URL overridden: {url}");
        }
        let return_url = std::env::var("SF_PAYFAST_RETURN_URL").unwrap_or_else(|_| {
            warn!("💳️ SF_PAYFAST_RETURN_URL not set, using http://localhost:8000/payment/success");
            "http://localhost:8000/payment/success".to_string()
        });
        let cancel_url = std::env::var("SF_PAYFAST_CANCEL_URL").unwrap_or_else(|_| {
            warn!("💳️ SF_PAYFAST_CANCEL_URL not set, using http://localhost:8000/payment/cancel");
            "http://localhost:8000/payment/cancel".to_string()
        });
        let notify_url = std::env::var("SF_PAYFAST_NOTIFY_URL").unwrap_or_else(|_| {
            warn!("💳️ SF_PAYFAST_NOTIFY_URL not set, using http://localhost:8000/api/webhook/payment");
            "http://localhost:8000/api/webhook/payment".to_string()
        });
        let (timeout, found) = parse_env_or("SF_PAYFAST_VALIDATION_TIMEOUT_SECS", DEFAULT_VALIDATION_TIMEOUT);
        if !found {
            info!("💳️ SF_PAYFAST_VALIDATION_TIMEOUT_SECS not set or invalid, using {timeout}s");
        }
        let (validation_retries, found) = parse_env_or("SF_PAYFAST_VALIDATION_RETRIES", DEFAULT_VALIDATION_RETRIES);
        if !found {
            info!("💳️ SF_PAYFAST_VALIDATION_RETRIES not set or invalid, using {validation_retries}");
        }
        Self {
            merchant_id,
            merchant_key,
            passphrase,
            sandbox,
            base_url_override,
            return_url,
            cancel_url,
            notify_url,
            validation_timeout: Duration::from_secs(timeout),
            validation_retries,
            ..Default::default()
        }
    }

    pub fn base_url(&self) -> &str {
        match (&self.base_url_override, self.sandbox) {
            (Some(url), _) => url.trim_end_matches('/'),
            (None, true) => SANDBOX_BASE_URL,
            (None, false) => LIVE_BASE_URL,
        }
    }

    /// Where the customer's browser is sent with the signed payment form.
    pub fn process_url(&self) -> String {
        format!("{}/eng/process", self.base_url())
    }

    /// The server-to-server endpoint that confirms a notification really came from the gateway.
    pub fn validate_url(&self) -> String {
        format!("{}/eng/query/validate", self.base_url())
    }
}
