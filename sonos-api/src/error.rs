use soap_client::SoapError;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by control operations against a device
///
/// None of these are retried by the client itself; see [`crate::RetryPolicy`]
/// for the caller-side policy.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The device answered with a non-success HTTP status
    ///
    /// `upnp_error` is the UPnP `errorCode` from the SOAP fault, when present.
    #[error("Control request failed with HTTP status {status}")]
    RequestFailed { status: u16, upnp_error: Option<u16> },

    /// The request never got an HTTP answer
    #[error("Control transport error: {0}")]
    Transport(String),

    /// The request did not complete in time
    #[error("Control request timed out after {0:?}")]
    Timeout(Duration),
}

impl ControlError {
    /// Whether another attempt could plausibly succeed
    ///
    /// A device that answered with an error status will answer the same way
    /// again, so only transport failures and timeouts qualify.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ControlError::RequestFailed { .. })
    }
}

/// Type alias for results that can return a ControlError
pub type Result<T> = std::result::Result<T, ControlError>;

impl From<SoapError> for ControlError {
    fn from(error: SoapError) -> Self {
        match error {
            SoapError::Network(msg) => ControlError::Transport(msg),
            SoapError::Status { status, upnp_error } => {
                ControlError::RequestFailed { status, upnp_error }
            }
        }
    }
}
