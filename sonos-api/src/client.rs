use soap_client::{SoapClient, SoapClientConfig};

use crate::{ControlError, EqCommand, Result, SetEqOperation, SetEqRequest, SonosOperation};

/// A client for executing Sonos operations against actual devices
///
/// This client bridges the stateless operation definitions and the network
/// requests sent to Sonos speakers. It holds no per-device state; every call
/// is independent.
#[derive(Debug, Clone)]
pub struct SonosClient {
    soap_client: SoapClient,
}

impl SonosClient {
    /// Create a new Sonos client with default transport settings
    pub fn new() -> Self {
        Self {
            soap_client: SoapClient::new(),
        }
    }

    /// Create a Sonos client with a custom SOAP client
    pub fn with_soap_client(soap_client: SoapClient) -> Self {
        Self { soap_client }
    }

    /// Create a Sonos client with explicit transport settings
    pub fn with_config(config: SoapClientConfig) -> Self {
        Self::with_soap_client(SoapClient::with_config(config))
    }

    /// Execute a Sonos operation against a device
    ///
    /// # Arguments
    /// * `ip` - The IP address of the Sonos device
    /// * `request` - The operation request data
    pub fn execute<Op: SonosOperation>(&self, ip: &str, request: &Op::Request) -> Result<()> {
        let service_info = Op::SERVICE.info();
        let payload = Op::build_payload(request);

        self.soap_client
            .call(
                ip,
                service_info.endpoint,
                service_info.service_uri,
                Op::ACTION,
                &payload,
            )
            .map(|_status| ())
            .map_err(ControlError::from)
    }

    /// Toggle an EQ setting on the device at `ip`
    pub fn set_eq(&self, ip: &str, command: EqCommand) -> Result<()> {
        self.execute::<SetEqOperation>(ip, &SetEqRequest::from(command))
    }
}

impl Default for SonosClient {
    fn default() -> Self {
        Self::new()
    }
}
