//! SSDP-backed implementation of [`DiscoverySource`].
//!
//! A search runs in two phases:
//! 1. An M-SEARCH for Sonos zone players is multicast and responses are read
//!    until the discovery window closes. Responders that are clearly not Sonos
//!    are dropped and repeated locations are de-duplicated.
//! 2. Each unique location is yielded as an [`SsdpDeviceHandle`]. Nothing is
//!    fetched over HTTP until the consumer calls `describe`.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::time::Instant;

use crate::device::{host_from_location, DeviceDescription, DeviceDescriptor};
use crate::error::{DiscoveryError, Result};
use crate::ssdp::{SsdpClient, ZONE_PLAYER_TARGET};
use crate::{DeviceHandle, DiscoverySource};

/// Default length of the SSDP listening window
pub const DEFAULT_DISCOVERY_WINDOW: Duration = Duration::from_secs(3);

/// Default bound on a single device-description fetch
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Discovers Sonos speakers with SSDP multicast search.
///
/// Each call to [`DiscoverySource::discover`] starts a fresh search. Dropping
/// the returned stream closes the socket and cancels the search.
#[derive(Debug, Clone)]
pub struct SsdpDiscovery {
    window: Duration,
    http_client: reqwest::Client,
}

impl SsdpDiscovery {
    /// Create a discovery source listening for `window` per search
    pub fn new(window: Duration) -> Result<Self> {
        Self::with_http_timeout(window, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a discovery source with an explicit description fetch timeout
    pub fn with_http_timeout(window: Duration, http_timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(http_timeout)
            .build()
            .map_err(|e| DiscoveryError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            window,
            http_client,
        })
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

enum SearchState {
    Start,
    Listening {
        client: SsdpClient,
        deadline: Instant,
        seen_locations: HashSet<String>,
    },
}

impl DiscoverySource for SsdpDiscovery {
    fn discover(&self) -> BoxStream<'static, Box<dyn DeviceHandle>> {
        let window = self.window;
        let http_client = self.http_client.clone();

        stream::unfold(SearchState::Start, move |state| {
            let http_client = http_client.clone();
            async move {
                let (mut client, deadline, mut seen_locations) = match state {
                    SearchState::Start => match start_search().await {
                        Ok(client) => (client, Instant::now() + window, HashSet::new()),
                        Err(e) => {
                            tracing::warn!("SSDP search could not start: {}", e);
                            return None;
                        }
                    },
                    SearchState::Listening {
                        client,
                        deadline,
                        seen_locations,
                    } => (client, deadline, seen_locations),
                };

                loop {
                    let response = client.next_response(deadline).await?;

                    if !response.is_likely_sonos() {
                        tracing::trace!("Ignoring non-Sonos responder at {}", response.location);
                        continue;
                    }
                    if !seen_locations.insert(response.location.clone()) {
                        continue;
                    }

                    let Some(handle) = SsdpDeviceHandle::new(&response.location, http_client.clone())
                    else {
                        tracing::debug!("Unusable SSDP location {}", response.location);
                        continue;
                    };

                    tracing::debug!("Discovered device at {}", handle.host());
                    let next = SearchState::Listening {
                        client,
                        deadline,
                        seen_locations,
                    };
                    return Some((Box::new(handle) as Box<dyn DeviceHandle>, next));
                }
            }
        })
        .boxed()
    }
}

async fn start_search() -> Result<SsdpClient> {
    let client = SsdpClient::bind().await?;
    client.search(ZONE_PLAYER_TARGET).await?;
    Ok(client)
}

/// Handle to a speaker found by SSDP, described lazily over HTTP
#[derive(Debug, Clone)]
pub struct SsdpDeviceHandle {
    host: String,
    location: String,
    http_client: reqwest::Client,
}

impl SsdpDeviceHandle {
    /// Build a handle from a description URL. Returns `None` when no host can
    /// be read from the URL.
    pub fn new(location: &str, http_client: reqwest::Client) -> Option<Self> {
        let host = host_from_location(location)?;
        Some(Self {
            host,
            location: location.to_string(),
            http_client,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

#[async_trait]
impl DeviceHandle for SsdpDeviceHandle {
    fn host(&self) -> &str {
        &self.host
    }

    async fn describe(&self) -> Result<DeviceDescriptor> {
        let response = self
            .http_client
            .get(&self.location)
            .send()
            .await
            .map_err(|e| DiscoveryError::Network(format!("Failed to fetch device description: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::Http {
                url: self.location.clone(),
                status: status.as_u16(),
            });
        }

        let xml = response
            .text()
            .await
            .map_err(|e| DiscoveryError::Network(format!("Failed to read response body: {}", e)))?;

        let description = DeviceDescription::from_xml(&xml)?;
        if !description.is_sonos_device() {
            return Err(DiscoveryError::NotSonos {
                manufacturer: description.manufacturer,
                device_type: description.device_type,
            });
        }

        Ok(description.to_descriptor(&self.host))
    }
}
