use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PayfastApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid gateway configuration: {0}")]
    Configuration(String),
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Validation request failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("The gateway did not respond within {0} seconds")]
    Timeout(u64),
    #[error("Malformed notification: {0}")]
    MalformedNotification(String),
}
