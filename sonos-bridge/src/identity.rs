//! Stable accessory identity

use serde::{Deserialize, Serialize};
use sonos_discovery::DeviceDescriptor;
use std::fmt;
use uuid::Uuid;

/// Namespace for v5 accessory ids. Changing it re-keys every cached accessory.
const ACCESSORY_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a7e_58b4_4d0e_9a63_1c55_0e8d_b2f4);

/// Identity of one physical device across discovery passes and restarts.
///
/// Derived from the device's unique id (the UDN, or the host when the device
/// reports none) with a name-based UUID, so equal inputs always yield equal
/// ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessoryId(Uuid);

impl AccessoryId {
    pub fn for_device(device: &DeviceDescriptor) -> Self {
        Self::from_unique_id(&device.unique_id)
    }

    pub fn from_unique_id(unique_id: &str) -> Self {
        Self(Uuid::new_v5(&ACCESSORY_NAMESPACE, unique_id.as_bytes()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AccessoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
