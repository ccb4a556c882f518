//! Sonos EQ bridge
//!
//! Turns discovered Sonos speakers into host accessories with two switches,
//! Night Sound and Speech Enhancement.
//!
//! ```text
//! DiscoverySource ──► describe ──► FilterConfig::decide ──► AccessoryStore::reconcile
//!                                                               │
//!                              AccessoryHost::register_new / notify_updated (batched)
//!
//! SonosAccessory::set ──► EqController::set_eq ──► SetEQ over SOAP
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sonos_bridge::{BridgeConfig, JsonFileHost, SonosEqController, SonosPlatform};
//! use sonos_discovery::SsdpDiscovery;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BridgeConfig::load("config.json")?;
//! let host = Arc::new(JsonFileHost::open("accessories.json")?);
//! let controller = Arc::new(SonosEqController::from_config(&config));
//! let discovery = SsdpDiscovery::new(config.discovery_window())?;
//!
//! let platform = SonosPlatform::new(config, host, controller)?;
//! let report = platform.run_discovery_pass(&discovery).await?;
//! println!("{} new accessories", report.registered.len());
//! # Ok(())
//! # }
//! ```

pub mod accessory;
pub mod config;
pub mod control;
pub mod error;
pub mod filter;
pub mod host;
pub mod identity;
pub mod logging;
pub mod platform;
pub mod store;

pub use accessory::{AccessoryInfo, EqSwitch, SonosAccessory};
pub use config::{BridgeConfig, ConfigError, DeviceRule};
pub use control::{EqController, SonosEqController};
pub use error::{BridgeError, Result};
pub use filter::{FilterConfig, FilterRule};
pub use host::{AccessoryHost, HostError, JsonFileHost};
pub use identity::AccessoryId;
pub use platform::{PassReport, PassWarning, SonosPlatform};
pub use store::{AccessoryRecord, AccessoryStore, ControlState, ReconcileAction};
