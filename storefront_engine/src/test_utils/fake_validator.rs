use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use payfast_tools::PayfastApiError;

use crate::traits::NotificationValidator;

/// A [`NotificationValidator`] that returns a canned answer and counts how often it was asked.
#[derive(Debug, Clone)]
pub struct FakeValidator {
    response: Result<bool, PayfastApiError>,
    calls: Arc<AtomicUsize>,
}

impl FakeValidator {
    pub fn accepting() -> Self {
        Self::with_response(Ok(true))
    }

    pub fn rejecting() -> Self {
        Self::with_response(Ok(false))
    }

    pub fn timing_out() -> Self {
        Self::with_response(Err(PayfastApiError::Timeout(10)))
    }

    pub fn with_response(response: Result<bool, PayfastApiError>) -> Self {
        Self { response, calls: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl NotificationValidator for FakeValidator {
    async fn validate_notification(&self, _raw_body: &[u8]) -> Result<bool, PayfastApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}
