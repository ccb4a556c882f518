use serde::Serialize;

use crate::service::Service;

/// Base trait for Sonos API operations
///
/// An operation names its service and SOAP action and knows how to render
/// its request as the XML payload that goes inside the SOAP envelope.
/// Success is decided by the HTTP status of the answer, so operations carry
/// no response type.
pub trait SonosOperation {
    /// The request type for this operation
    type Request: Serialize;

    /// The UPnP service this operation belongs to
    const SERVICE: Service;

    /// The SOAP action name for this operation
    const ACTION: &'static str;

    /// Build the SOAP payload (without envelope) from the request data
    fn build_payload(request: &Self::Request) -> String;
}
