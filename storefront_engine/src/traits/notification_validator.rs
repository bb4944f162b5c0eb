use payfast_tools::{PayfastApi, PayfastApiError};

/// Confirms with the payment gateway that a notification really originated there.
#[allow(async_fn_in_trait)]
pub trait NotificationValidator {
    /// Returns `Ok(true)` only if the gateway positively confirmed the untouched notification body.
    async fn validate_notification(&self, raw_body: &[u8]) -> Result<bool, PayfastApiError>;
}

impl NotificationValidator for PayfastApi {
    async fn validate_notification(&self, raw_body: &[u8]) -> Result<bool, PayfastApiError> {
        PayfastApi::validate_notification(self, raw_body).await
    }
}
