//! Device description parsing and validation.
//!
//! This module turns the UPnP device description XML served by a speaker into
//! a [`DeviceDescriptor`], the immutable record the rest of the bridge works
//! with.

use crate::error::{DiscoveryError, Result};
use serde::{Deserialize, Serialize};

/// UPnP device description root element.
#[derive(Debug, Deserialize)]
struct Root {
    device: DeviceDescription,
}

/// Device description parsed from XML.
///
/// Only the fields the bridge reads are declared; everything else in the
/// document is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescription {
    #[serde(default)]
    pub device_type: String,
    #[serde(default)]
    pub friendly_name: String,
    #[serde(default)]
    pub manufacturer: String,
    pub model_name: Option<String>,
    pub serial_num: Option<String>,
    #[serde(rename = "MACAddress")]
    pub mac_address: Option<String>,
    #[serde(rename = "UDN")]
    pub udn: Option<String>,
    pub room_name: Option<String>,
}

impl DeviceDescription {
    /// Parse device description from XML.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::Parse` if the XML is malformed or has no
    /// `<device>` element.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let root: Root = quick_xml::de::from_str(xml)
            .map_err(|e| DiscoveryError::Parse(format!("Failed to parse device XML: {}", e)))?;

        Ok(root.device)
    }

    /// Check if this device is a Sonos device.
    ///
    /// Validates by checking manufacturer name and device type.
    pub fn is_sonos_device(&self) -> bool {
        self.manufacturer.to_lowercase().contains("sonos")
            || self.device_type.contains("ZonePlayer")
    }

    /// Build the descriptor for the speaker reachable at `host`.
    pub fn to_descriptor(&self, host: &str) -> DeviceDescriptor {
        DeviceDescriptor::new(host, self.udn.clone(), self.room_name.clone())
            .with_hardware_id(self.mac_address.clone())
            .with_serial_fallback(self.serial_num.clone())
            .with_model_name(self.model_name.clone())
    }
}

/// A described device, produced once per discovery event.
///
/// `unique_id` is the vendor UDN when the device reports one and the host
/// otherwise. `display_name` is the room name, or [`DeviceDescriptor::DEFAULT_DISPLAY_NAME`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    pub host: String,
    pub unique_id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_fallback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

impl DeviceDescriptor {
    /// Display name used when a device does not report a room name
    pub const DEFAULT_DISPLAY_NAME: &'static str = "Sonos Device";

    /// Create a descriptor, applying the unique-id and display-name fallbacks.
    ///
    /// Empty strings count as missing values.
    pub fn new(
        host: impl Into<String>,
        unique_id: Option<String>,
        display_name: Option<String>,
    ) -> Self {
        let host = host.into();
        let unique_id = non_empty(unique_id).unwrap_or_else(|| host.clone());
        let display_name =
            non_empty(display_name).unwrap_or_else(|| Self::DEFAULT_DISPLAY_NAME.to_string());

        Self {
            host,
            unique_id,
            display_name,
            hardware_id: None,
            serial_fallback: None,
            model_name: None,
        }
    }

    pub fn with_hardware_id(mut self, hardware_id: Option<String>) -> Self {
        self.hardware_id = non_empty(hardware_id);
        self
    }

    pub fn with_serial_fallback(mut self, serial: Option<String>) -> Self {
        self.serial_fallback = serial;
        self
    }

    pub fn with_model_name(mut self, model_name: Option<String>) -> Self {
        self.model_name = non_empty(model_name);
        self
    }

    /// Hardware id used for MAC matching.
    ///
    /// Falls back to the part of the serial number before the first `:` when
    /// the device reports no MAC address. Sonos serials look like
    /// `00-0E-58-AA-BB-CC:9`, so the prefix is MAC-shaped, but nothing
    /// guarantees that for every firmware.
    pub fn effective_hardware_id(&self) -> Option<&str> {
        match &self.hardware_id {
            Some(mac) => Some(mac.as_str()),
            None => self
                .serial_fallback
                .as_deref()
                .and_then(|serial| serial.split(':').next()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Extract the host from a description URL.
///
/// # Arguments
///
/// * `url` - URL string (e.g., "http://192.168.1.100:1400/xml/device_description.xml")
///
/// # Returns
///
/// The host portion of the URL, or `None` if the URL is malformed.
pub fn host_from_location(url: &str) -> Option<String> {
    let authority = url.split("//").nth(1)?.split('/').next()?;
    let host = authority.split(':').next()?;
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}
