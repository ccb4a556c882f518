//! Platform configuration
//!
//! The JSON shape mirrors the plugin configuration block: `deviceNames` for the
//! legacy name filter, `devices` for strict rules, and a handful of optional
//! tuning knobs for discovery and control timeouts.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use sonos_api::RetryPolicy;

/// Errors raised while loading a [`BridgeConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One strict filter rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRule {
    pub device_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
}

impl DeviceRule {
    pub fn named(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            ip_address: None,
            mac_address: None,
        }
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    pub fn with_mac(mut self, mac: impl Into<String>) -> Self {
        self.mac_address = Some(mac.into());
        self
    }
}

/// Bridge configuration as read from JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<DeviceRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_window_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub describe_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_describes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_retry_delay_ms: Option<u64>,
}

impl BridgeConfig {
    pub const DEFAULT_DISCOVERY_WINDOW_SECS: u64 = 3;
    pub const DEFAULT_DESCRIBE_TIMEOUT_SECS: u64 = 10;
    pub const DEFAULT_CONTROL_TIMEOUT_SECS: u64 = 10;
    pub const DEFAULT_MAX_CONCURRENT_DESCRIBES: usize = 8;

    /// Parse a configuration from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Name shown in log lines, defaulting to the platform name
    pub fn platform_name(&self) -> &str {
        self.name.as_deref().unwrap_or("SonosEQ")
    }

    pub fn discovery_window(&self) -> Duration {
        Duration::from_secs(
            self.discovery_window_secs
                .unwrap_or(Self::DEFAULT_DISCOVERY_WINDOW_SECS),
        )
    }

    pub fn describe_timeout(&self) -> Duration {
        Duration::from_secs(
            self.describe_timeout_secs
                .unwrap_or(Self::DEFAULT_DESCRIBE_TIMEOUT_SECS),
        )
    }

    pub fn control_timeout(&self) -> Duration {
        Duration::from_secs(
            self.control_timeout_secs
                .unwrap_or(Self::DEFAULT_CONTROL_TIMEOUT_SECS),
        )
    }

    /// Upper bound on describe calls in flight, never below one
    pub fn max_concurrent_describes(&self) -> usize {
        self.max_concurrent_describes
            .unwrap_or(Self::DEFAULT_MAX_CONCURRENT_DESCRIBES)
            .max(1)
    }

    /// Retry policy for control calls; one retry with backoff unless overridden
    pub fn control_retry_policy(&self) -> RetryPolicy {
        let default = RetryPolicy::default();
        RetryPolicy::exponential(
            self.control_retries.unwrap_or(default.max_retries),
            self.control_retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(default.base_delay),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plugin_block() {
        let config = BridgeConfig::from_json_str(
            r#"{
                "platform": "SonosEQ",
                "name": "Sonos EQ",
                "deviceNames": ["Kitchen"],
                "devices": [
                    { "deviceName": "Living Room", "ipAddress": "192.168.1.50" },
                    { "deviceName": "Den", "macAddress": "00:0E:58:AA:BB:CC" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.platform_name(), "Sonos EQ");
        assert_eq!(config.device_names, Some(vec!["Kitchen".to_string()]));
        let devices = config.devices.unwrap();
        assert_eq!(devices[0], DeviceRule::named("Living Room").with_ip("192.168.1.50"));
        assert_eq!(devices[1], DeviceRule::named("Den").with_mac("00:0E:58:AA:BB:CC"));
    }

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::from_json_str("{}").unwrap();

        assert_eq!(config.platform_name(), "SonosEQ");
        assert_eq!(config.discovery_window(), Duration::from_secs(3));
        assert_eq!(config.describe_timeout(), Duration::from_secs(10));
        assert_eq!(config.control_timeout(), Duration::from_secs(10));
        assert_eq!(config.max_concurrent_describes(), 8);
        assert_eq!(config.control_retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_tuning_overrides() {
        let config = BridgeConfig::from_json_str(
            r#"{ "maxConcurrentDescribes": 0, "controlRetries": 0, "controlRetryDelayMs": 50 }"#,
        )
        .unwrap();

        assert_eq!(config.max_concurrent_describes(), 1);
        let policy = config.control_retry_policy();
        assert_eq!(policy.max_retries, 0);
        assert_eq!(policy.base_delay, Duration::from_millis(50));
    }

    #[test]
    fn test_rule_without_name_is_rejected() {
        let err = BridgeConfig::from_json_str(r#"{ "devices": [ { "ipAddress": "10.0.0.1" } ] }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = BridgeConfig::load("/nonexistent/sonos-bridge/config.json").unwrap_err();
        assert!(err.to_string().starts_with("Failed to read config file"));
    }
}
