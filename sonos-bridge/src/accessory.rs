//! Accessory handlers exposing the two EQ switches
//!
//! Reads come from the cached control state; the device is never queried.
//! Writes send `SetEQ` to the device's latest known host and only touch the
//! cache once the device has accepted the change.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use sonos_api::{EqCommand, EqType};
use tracing::{debug, error};

use crate::control::EqController;
use crate::error::{BridgeError, Result};
use crate::identity::AccessoryId;
use crate::store::{AccessoryRecord, AccessoryStore, ControlState};

/// One of the two switch services on every accessory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EqSwitch {
    NightSound,
    SpeechEnhancement,
}

impl EqSwitch {
    pub const ALL: [EqSwitch; 2] = [EqSwitch::NightSound, EqSwitch::SpeechEnhancement];

    /// Service name shown to the user
    pub fn service_name(&self) -> &'static str {
        match self {
            EqSwitch::NightSound => "Night Sound",
            EqSwitch::SpeechEnhancement => "Speech Enhancement",
        }
    }

    /// Stable service subtype
    pub fn subtype(&self) -> &'static str {
        match self {
            EqSwitch::NightSound => "NightSound",
            EqSwitch::SpeechEnhancement => "SpeechEnhancement",
        }
    }

    pub fn eq_type(&self) -> EqType {
        match self {
            EqSwitch::NightSound => EqType::NightMode,
            EqSwitch::SpeechEnhancement => EqType::DialogLevel,
        }
    }

    pub fn read(&self, state: &ControlState) -> bool {
        match self {
            EqSwitch::NightSound => state.night_sound,
            EqSwitch::SpeechEnhancement => state.speech_enhancement,
        }
    }

    fn write(&self, state: &mut ControlState, value: bool) {
        match self {
            EqSwitch::NightSound => state.night_sound = value,
            EqSwitch::SpeechEnhancement => state.speech_enhancement = value,
        }
    }
}

impl fmt::Display for EqSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service_name())
    }
}

impl FromStr for EqSwitch {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "night-sound" | "nightsound" | "night" => Ok(EqSwitch::NightSound),
            "speech-enhancement" | "speechenhancement" | "speech" | "dialog" => {
                Ok(EqSwitch::SpeechEnhancement)
            }
            other => Err(format!(
                "unknown switch '{}', expected night-sound or speech-enhancement",
                other
            )),
        }
    }
}

/// Accessory information characteristics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessoryInfo {
    pub manufacturer: &'static str,
    pub model: String,
    pub serial_number: String,
}

impl AccessoryInfo {
    pub const MANUFACTURER: &'static str = "Sonos";
    pub const DEFAULT_MODEL: &'static str = "Sonos Speaker";

    pub fn for_record(record: &AccessoryRecord) -> Self {
        Self {
            manufacturer: Self::MANUFACTURER,
            model: record
                .device_context
                .model_name
                .clone()
                .unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
            serial_number: record.host().to_string(),
        }
    }
}

/// Handler bound to one accessory record
#[derive(Clone)]
pub struct SonosAccessory {
    id: AccessoryId,
    store: Arc<AccessoryStore>,
    controller: Arc<dyn EqController>,
}

impl fmt::Debug for SonosAccessory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SonosAccessory").field("id", &self.id).finish()
    }
}

impl SonosAccessory {
    pub fn new(id: AccessoryId, store: Arc<AccessoryStore>, controller: Arc<dyn EqController>) -> Self {
        Self {
            id,
            store,
            controller,
        }
    }

    pub fn id(&self) -> AccessoryId {
        self.id
    }

    /// Current record, including the latest device context
    pub fn record(&self) -> Result<AccessoryRecord> {
        self.store
            .get(&self.id)
            .ok_or(BridgeError::AccessoryNotFound(self.id))
    }

    pub fn info(&self) -> Result<AccessoryInfo> {
        Ok(AccessoryInfo::for_record(&self.record()?))
    }

    /// Last value set through this bridge. May differ from the device if it
    /// was changed elsewhere.
    pub fn get(&self, switch: EqSwitch) -> Result<bool> {
        Ok(switch.read(&self.record()?.control_state))
    }

    /// Turn a switch on or off.
    ///
    /// The cached state changes only after the device accepts the command; on
    /// failure the error is returned and the cache is left as it was.
    pub async fn set(&self, switch: EqSwitch, value: bool) -> Result<AccessoryRecord> {
        let record = self.record()?;
        let command = EqCommand::new(switch.eq_type(), value);

        if let Err(e) = self.controller.set_eq(record.host(), command).await {
            error!(
                "Error setting {} on {} ({}): {}",
                switch,
                record.display_name,
                record.host(),
                e
            );
            return Err(e.into());
        }

        debug!("{} on {} set to {}", switch, record.display_name, value);
        self.store
            .update_control_state(&self.id, |state| switch.write(state, value))
            .ok_or(BridgeError::AccessoryNotFound(self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use sonos_discovery::DeviceDescriptor;

    #[rstest]
    #[case(EqSwitch::NightSound, "Night Sound", "NightSound", EqType::NightMode)]
    #[case(EqSwitch::SpeechEnhancement, "Speech Enhancement", "SpeechEnhancement", EqType::DialogLevel)]
    fn test_switch_mapping(
        #[case] switch: EqSwitch,
        #[case] name: &str,
        #[case] subtype: &str,
        #[case] eq_type: EqType,
    ) {
        assert_eq!(switch.service_name(), name);
        assert_eq!(switch.subtype(), subtype);
        assert_eq!(switch.eq_type(), eq_type);
    }

    #[rstest]
    #[case("night-sound", Ok(EqSwitch::NightSound))]
    #[case("Speech", Ok(EqSwitch::SpeechEnhancement))]
    #[case("volume", Err(()))]
    fn test_switch_from_str(#[case] input: &str, #[case] expected: std::result::Result<EqSwitch, ()>) {
        assert_eq!(input.parse::<EqSwitch>().map_err(|_| ()), expected);
    }

    #[test]
    fn test_switches_are_independent() {
        let mut state = ControlState::default();
        EqSwitch::NightSound.write(&mut state, true);

        assert!(EqSwitch::NightSound.read(&state));
        assert!(!EqSwitch::SpeechEnhancement.read(&state));
    }

    #[test]
    fn test_accessory_info() {
        let record = AccessoryRecord::new(
            DeviceDescriptor::new("192.168.1.50", Some("uuid:A".to_string()), None)
                .with_model_name(Some("Sonos Arc".to_string())),
        );
        let info = AccessoryInfo::for_record(&record);
        assert_eq!(info.manufacturer, "Sonos");
        assert_eq!(info.model, "Sonos Arc");
        assert_eq!(info.serial_number, "192.168.1.50");

        let bare = AccessoryRecord::new(DeviceDescriptor::new("10.0.0.2", None, None));
        assert_eq!(AccessoryInfo::for_record(&bare).model, "Sonos Speaker");
    }
}
