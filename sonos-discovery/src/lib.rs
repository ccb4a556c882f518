//! Sonos device discovery library
//!
//! Finds Sonos speakers on the local network using SSDP (Simple Service
//! Discovery Protocol) and reads their UPnP device descriptions.
//!
//! Discovery is split in two seams so callers can substitute either half:
//!
//! - [`DiscoverySource`] produces a lazily consumed stream of device handles.
//! - [`DeviceHandle`] describes one device on demand, producing a
//!   [`DeviceDescriptor`].
//!
//! # Example
//!
//! ```no_run
//! use futures::StreamExt;
//! use sonos_discovery::{DeviceHandle, DiscoverySource, SsdpDiscovery};
//! use std::time::Duration;
//!
//! # async fn run() -> sonos_discovery::Result<()> {
//! let discovery = SsdpDiscovery::new(Duration::from_secs(3))?;
//! let mut handles = discovery.discover();
//! while let Some(handle) = handles.next().await {
//!     let device = handle.describe().await?;
//!     println!("{} at {}", device.display_name, device.host);
//! }
//! # Ok(())
//! # }
//! ```

pub mod device;
mod discovery;
mod error;
mod ssdp;

use async_trait::async_trait;
use futures::stream::BoxStream;

pub use device::{DeviceDescription, DeviceDescriptor};
pub use discovery::{SsdpDeviceHandle, SsdpDiscovery, DEFAULT_DISCOVERY_WINDOW, DEFAULT_HTTP_TIMEOUT};
pub use error::{DiscoveryError, Result};

/// A device seen on the network that can be asked for its description.
#[async_trait]
pub trait DeviceHandle: Send + Sync {
    /// Network address the device answered from
    fn host(&self) -> &str;

    /// Fetch and parse the device description.
    ///
    /// Unbounded by itself; callers that need a deadline wrap the future in a
    /// timeout.
    async fn describe(&self) -> Result<DeviceDescriptor>;
}

/// Source of discovery events.
///
/// The returned stream is consumed lazily and is finite. Dropping it cancels
/// the underlying search.
pub trait DiscoverySource: Send + Sync {
    fn discover(&self) -> BoxStream<'static, Box<dyn DeviceHandle>>;
}
