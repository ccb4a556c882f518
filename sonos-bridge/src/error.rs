use sonos_api::ControlError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::host::HostError;
use crate::identity::AccessoryId;

/// Errors surfaced by the bridge to its callers
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("EQ control failed: {0}")]
    Control(#[from] ControlError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No accessory with id {0}")]
    AccessoryNotFound(AccessoryId),

    #[error("Discovery could not start: {0}")]
    Discovery(#[from] sonos_discovery::DiscoveryError),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
