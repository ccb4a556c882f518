//! Private SOAP client for UPnP device communication
//!
//! This crate provides a minimal SOAP client for sending control actions to
//! Sonos speakers on their fixed UPnP port. Requests are built by hand because
//! the speaker firmware expects an exact envelope layout.

mod error;

pub use error::SoapError;

use std::time::Duration;
use xmltree::Element;

/// Port Sonos speakers expose their UPnP services on
pub const SONOS_PORT: u16 = 1400;

/// Transport settings for a [`SoapClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapClientConfig {
    /// TCP port of the device control endpoint
    pub port: u16,
    /// Maximum time to establish the TCP connection
    pub connect_timeout: Duration,
    /// Maximum time to wait for the response
    pub read_timeout: Duration,
}

impl Default for SoapClientConfig {
    fn default() -> Self {
        Self {
            port: SONOS_PORT,
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
        }
    }
}

/// A minimal SOAP client for UPnP device communication
#[derive(Debug, Clone)]
pub struct SoapClient {
    agent: ureq::Agent,
    port: u16,
}

impl SoapClient {
    /// Create a new SOAP client with default configuration
    pub fn new() -> Self {
        Self::with_config(SoapClientConfig::default())
    }

    /// Create a SOAP client with explicit port and timeouts
    pub fn with_config(config: SoapClientConfig) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(config.connect_timeout)
                .timeout_read(config.read_timeout)
                .build(),
            port: config.port,
        }
    }

    /// Port this client sends requests to
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Send a SOAP action and return the HTTP status of the answer
    ///
    /// Any 2xx status is success. Other statuses become [`SoapError::Status`],
    /// carrying the UPnP error code when the device sent a SOAP fault body.
    /// Failures without an HTTP answer become [`SoapError::Network`].
    pub fn call(
        &self,
        ip: &str,
        endpoint: &str,
        service_uri: &str,
        action: &str,
        payload: &str,
    ) -> Result<u16, SoapError> {
        let url = format!("http://{}:{}/{}", ip, self.port, endpoint);
        let body = build_envelope(service_uri, action, payload);

        let result = self
            .agent
            .post(&url)
            .set("Content-Type", "text/xml; charset=\"utf-8\"")
            .set("SOAPACTION", &soap_action_header(service_uri, action))
            .send_string(&body);

        match result {
            Ok(response) => Ok(response.status()),
            Err(ureq::Error::Status(status, response)) => {
                let upnp_error = response
                    .into_string()
                    .ok()
                    .and_then(|text| fault_error_code(&text));
                Err(SoapError::Status { status, upnp_error })
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(SoapError::Network(transport.to_string()))
            }
        }
    }
}

impl Default for SoapClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the SOAP envelope for an action
///
/// The envelope is emitted on a single line with no whitespace between
/// elements, which is the layout Sonos firmware is known to accept.
pub fn build_envelope(service_uri: &str, action: &str, payload: &str) -> String {
    format!(
        concat!(
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" "#,
            r#"s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">"#,
            r#"<s:Body><u:{action} xmlns:u="{service_uri}">{payload}</u:{action}></s:Body>"#,
            r#"</s:Envelope>"#
        ),
        action = action,
        service_uri = service_uri,
        payload = payload
    )
}

/// SOAPACTION header value, including the surrounding double quotes
pub fn soap_action_header(service_uri: &str, action: &str) -> String {
    format!("\"{}#{}\"", service_uri, action)
}

/// Pull the UPnP `errorCode` out of a SOAP fault body, if there is one
fn fault_error_code(xml_text: &str) -> Option<u16> {
    let xml = Element::parse(xml_text.as_bytes()).ok()?;
    xml.get_child("Body")?
        .get_child("Fault")?
        .get_child("detail")?
        .get_child("UPnPError")?
        .get_child("errorCode")?
        .get_text()?
        .trim()
        .parse::<u16>()
        .ok()
}
