use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client,
    StatusCode,
};

use crate::{config::PayfastConfig, PayfastApiError};

const VALID_RESPONSE: &str = "VALID";

#[derive(Clone)]
pub struct PayfastApi {
    config: PayfastConfig,
    client: Arc<Client>,
}

impl PayfastApi {
    pub fn new(config: PayfastConfig) -> Result<Self, PayfastApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/x-www-form-urlencoded"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.validation_timeout)
            .build()
            .map_err(|e| PayfastApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &PayfastConfig {
        &self.config
    }

    /// Posts the untouched notification body back to the gateway and reports whether it confirmed the notification.
    ///
    /// Transport failures, timeouts and 5xx responses are retried up to `validation_retries` times with exponential
    /// backoff. Any response other than a success status carrying exactly `VALID` is a `false`.
    pub async fn validate_notification(&self, raw_body: &[u8]) -> Result<bool, PayfastApiError> {
        let mut delay = self.config.retry_backoff;
        let mut attempt = 0;
        loop {
            match self.validation_attempt(raw_body).await {
                Ok(valid) => return Ok(valid),
                Err(e) if attempt < self.config.validation_retries => {
                    attempt += 1;
                    warn!(
                        "💳️ Notification validation attempt {attempt} failed: {e}. Retrying in {}ms",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                },
                Err(e) => {
                    error!("💳️ Notification validation failed after {} attempts: {e}", attempt + 1);
                    return Err(e);
                },
            }
        }
    }

    async fn validation_attempt(&self, raw_body: &[u8]) -> Result<bool, PayfastApiError> {
        let url = self.config.validate_url();
        trace!("💳️ Sending validation request to {url}");
        let response = self.client.post(url).body(raw_body.to_vec()).send().await.map_err(|e| {
            if e.is_timeout() {
                PayfastApiError::Timeout(self.config.validation_timeout.as_secs())
            } else {
                PayfastApiError::RestRequestError(e.to_string())
            }
        })?;
        let status = response.status();
        let text = response.text().await.map_err(|e| PayfastApiError::RestResponseError(e.to_string()))?;
        if status.is_server_error() {
            return Err(PayfastApiError::QueryError { status: status.as_u16(), message: text });
        }
        if status != StatusCode::OK {
            warn!("💳️ Gateway answered the validation request with {status}: {text}");
            return Ok(false);
        }
        let valid = text.trim() == VALID_RESPONSE;
        debug!("💳️ Gateway validation response: {}", text.trim());
        Ok(valid)
    }
}
