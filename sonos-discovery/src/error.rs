//! Error types for the discovery system.

use std::fmt;
use std::time::Duration;

/// Error type for discovery operations.
///
/// Covers both halves of discovery: the SSDP search itself and the
/// per-device `describe` step that fetches the UPnP device description.
#[derive(Debug)]
pub enum DiscoveryError {
    /// Socket or HTTP transport failure
    Network(String),
    /// The description URL answered with a non-success status
    Http { url: String, status: u16 },
    /// The description or SSDP response could not be parsed
    Parse(String),
    /// The responder is a UPnP device, but not a Sonos speaker
    NotSonos { manufacturer: String, device_type: String },
    /// The operation did not finish within the allotted time
    Timeout(Duration),
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryError::Network(msg) => write!(f, "Network error: {}", msg),
            DiscoveryError::Http { url, status } => {
                write!(f, "HTTP {} while fetching {}", status, url)
            }
            DiscoveryError::Parse(msg) => write!(f, "Parse error: {}", msg),
            DiscoveryError::NotSonos { manufacturer, device_type } => write!(
                f,
                "Not a Sonos device (manufacturer '{}', type '{}')",
                manufacturer, device_type
            ),
            DiscoveryError::Timeout(after) => write!(f, "Timed out after {:?}", after),
        }
    }
}

impl std::error::Error for DiscoveryError {}

/// Convenience Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
