//! Device filter
//!
//! Decides which described devices become accessories. Configuration is
//! resolved once into a [`FilterConfig`]; deciding is then a pure function of
//! the descriptor.

use std::collections::BTreeSet;

use sonos_discovery::DeviceDescriptor;
use tracing::debug;

use crate::config::{BridgeConfig, DeviceRule};

/// A strict-mode rule: the name is required, IP and MAC are optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRule {
    pub name: String,
    pub ip: Option<String>,
    pub mac: Option<String>,
}

impl FilterRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ip: None,
            mac: None,
        }
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn with_mac(mut self, mac: impl Into<String>) -> Self {
        self.mac = Some(mac.into());
        self
    }

    /// Whether `device` satisfies every field this rule sets.
    ///
    /// Comparisons are exact and case-sensitive.
    pub fn matches(&self, device: &DeviceDescriptor) -> bool {
        if self.name != device.display_name {
            return false;
        }
        if let Some(ip) = &self.ip {
            if *ip != device.host {
                return false;
            }
        }
        if let Some(mac) = &self.mac {
            if Some(mac.as_str()) != device.effective_hardware_id() {
                return false;
            }
        }
        true
    }
}

impl From<&DeviceRule> for FilterRule {
    fn from(rule: &DeviceRule) -> Self {
        // An empty string in the config means the field was left blank
        let present = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
        Self {
            name: rule.device_name.clone(),
            ip: present(&rule.ip_address),
            mac: present(&rule.mac_address),
        }
    }
}

/// Active filter mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterConfig {
    /// Accept devices whose display name is in the set
    LegacyNames(BTreeSet<String>),
    /// Accept devices matched by at least one rule
    StrictRules(Vec<FilterRule>),
}

impl FilterConfig {
    /// Resolve the filter mode from configuration.
    ///
    /// Non-empty `devices` wins and `deviceNames` is ignored. Returns `None`
    /// when neither is configured, which means nothing can ever be accepted.
    pub fn resolve(config: &BridgeConfig) -> Option<Self> {
        if let Some(devices) = config.devices.as_ref().filter(|d| !d.is_empty()) {
            return Some(FilterConfig::StrictRules(
                devices.iter().map(FilterRule::from).collect(),
            ));
        }

        config
            .device_names
            .as_ref()
            .filter(|names| !names.is_empty())
            .map(|names| FilterConfig::LegacyNames(names.iter().cloned().collect()))
    }

    /// Decide whether `device` is in scope
    pub fn decide(&self, device: &DeviceDescriptor) -> bool {
        match self {
            FilterConfig::StrictRules(rules) => {
                let accepted = rules.iter().any(|rule| rule.matches(device));
                if !accepted {
                    debug!(
                        "Ignoring discovered device \"{}\" (IP: {}, MAC: {}): no matching entry in \"devices\"",
                        device.display_name,
                        device.host,
                        device.effective_hardware_id().unwrap_or("unknown")
                    );
                }
                accepted
            }
            FilterConfig::LegacyNames(names) => {
                let accepted = names.contains(&device.display_name);
                if !accepted {
                    debug!(
                        "Ignoring discovered device \"{}\": not in the \"deviceNames\" list",
                        device.display_name
                    );
                }
                accepted
            }
        }
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, FilterConfig::StrictRules(_))
    }
}
