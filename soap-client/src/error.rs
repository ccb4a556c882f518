//! Error types for the SOAP client

use thiserror::Error;

/// Errors that can occur during SOAP communication
#[derive(Debug, Error)]
pub enum SoapError {
    /// The request never produced an HTTP answer (DNS, connect, read timeout, reset)
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// The device answered with a non-success HTTP status
    ///
    /// `upnp_error` carries the `errorCode` from the SOAP fault body when the
    /// device sent one.
    #[error("HTTP status {status}{}", fault_suffix(.upnp_error))]
    Status { status: u16, upnp_error: Option<u16> },
}

impl SoapError {
    /// Whether the failure happened before the device produced an answer
    pub fn is_transport(&self) -> bool {
        matches!(self, SoapError::Network(_))
    }
}

fn fault_suffix(upnp_error: &Option<u16>) -> String {
    match upnp_error {
        Some(code) => format!(" (UPnP error {})", code),
        None => String::new(),
    }
}
