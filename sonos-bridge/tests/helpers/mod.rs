//! Test doubles for the discovery, host and control seams

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;

use sonos_api::{ControlError, EqCommand};
use sonos_bridge::{AccessoryHost, AccessoryRecord, EqController, HostError};
use sonos_discovery::{DeviceDescriptor, DeviceHandle, DiscoveryError, DiscoverySource};

// ============================================================================
// Discovery
// ============================================================================

/// What a mock handle does when described
#[derive(Clone)]
pub enum Describe {
    Ok(DeviceDescriptor),
    Fail(String),
    Hang,
}

pub struct MockHandle {
    host: String,
    behavior: Describe,
}

impl MockHandle {
    pub fn ok(device: DeviceDescriptor) -> Self {
        Self {
            host: device.host.clone(),
            behavior: Describe::Ok(device),
        }
    }

    pub fn failing(host: &str, cause: &str) -> Self {
        Self {
            host: host.to_string(),
            behavior: Describe::Fail(cause.to_string()),
        }
    }

    pub fn hanging(host: &str) -> Self {
        Self {
            host: host.to_string(),
            behavior: Describe::Hang,
        }
    }
}

#[async_trait]
impl DeviceHandle for MockHandle {
    fn host(&self) -> &str {
        &self.host
    }

    async fn describe(&self) -> sonos_discovery::Result<DeviceDescriptor> {
        match &self.behavior {
            Describe::Ok(device) => Ok(device.clone()),
            Describe::Fail(cause) => Err(DiscoveryError::Network(cause.clone())),
            Describe::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(DiscoveryError::Timeout(Duration::from_secs(3600)))
            }
        }
    }
}

/// Finite source replaying a fixed list of behaviors on every pass
pub struct StaticSource {
    handles: Vec<(String, Describe)>,
    polls: Mutex<usize>,
}

impl StaticSource {
    pub fn new(handles: Vec<MockHandle>) -> Self {
        Self {
            handles: handles.into_iter().map(|h| (h.host, h.behavior)).collect(),
            polls: Mutex::new(0),
        }
    }

    /// Number of times `discover` has been called
    pub fn polls(&self) -> usize {
        *self.polls.lock()
    }
}

impl DiscoverySource for StaticSource {
    fn discover(&self) -> BoxStream<'static, Box<dyn DeviceHandle>> {
        *self.polls.lock() += 1;
        let handles: Vec<Box<dyn DeviceHandle>> = self
            .handles
            .iter()
            .cloned()
            .map(|(host, behavior)| Box::new(MockHandle { host, behavior }) as Box<dyn DeviceHandle>)
            .collect();
        stream::iter(handles).boxed()
    }
}

pub fn device(host: &str, udn: Option<&str>, room: &str) -> DeviceDescriptor {
    DeviceDescriptor::new(host, udn.map(str::to_string), Some(room.to_string()))
}

// ============================================================================
// Host
// ============================================================================

/// Host that records every call it receives
#[derive(Default)]
pub struct RecordingHost {
    pub cached: Vec<AccessoryRecord>,
    pub registered: Mutex<Vec<Vec<AccessoryRecord>>>,
    pub updated: Mutex<Vec<Vec<AccessoryRecord>>>,
    register_failures: Mutex<usize>,
}

impl RecordingHost {
    pub fn with_cache(cached: Vec<AccessoryRecord>) -> Self {
        Self {
            cached,
            ..Default::default()
        }
    }

    /// Reject the next `failures` calls to `register_new`
    pub fn rejecting_registrations(self, failures: usize) -> Self {
        *self.register_failures.lock() = failures;
        self
    }

    pub fn register_calls(&self) -> Vec<Vec<AccessoryRecord>> {
        self.registered.lock().clone()
    }

    pub fn update_calls(&self) -> Vec<Vec<AccessoryRecord>> {
        self.updated.lock().clone()
    }
}

impl AccessoryHost for RecordingHost {
    fn cached_accessories(&self) -> Result<Vec<AccessoryRecord>, HostError> {
        Ok(self.cached.clone())
    }

    fn register_new(&self, records: &[AccessoryRecord]) -> Result<(), HostError> {
        let mut failures = self.register_failures.lock();
        if *failures > 0 {
            *failures -= 1;
            return Err(HostError::Rejected("host unavailable".to_string()));
        }
        self.registered.lock().push(records.to_vec());
        Ok(())
    }

    fn notify_updated(&self, records: &[AccessoryRecord]) -> Result<(), HostError> {
        self.updated.lock().push(records.to_vec());
        Ok(())
    }
}

// ============================================================================
// Control
// ============================================================================

/// Controller that records commands and answers with a scripted result
#[derive(Default)]
pub struct MockController {
    pub calls: Mutex<Vec<(String, EqCommand)>>,
    failure: Mutex<Option<ControlError>>,
}

impl MockController {
    pub fn failing(error: ControlError) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            failure: Mutex::new(Some(error)),
        })
    }

    pub fn calls(&self) -> Vec<(String, EqCommand)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl EqController for MockController {
    async fn set_eq(&self, host: &str, command: EqCommand) -> Result<(), ControlError> {
        self.calls.lock().push((host.to_string(), command));
        match &*self.failure.lock() {
            Some(ControlError::Transport(cause)) => Err(ControlError::Transport(cause.clone())),
            Some(ControlError::RequestFailed { status, upnp_error }) => {
                Err(ControlError::RequestFailed {
                    status: *status,
                    upnp_error: *upnp_error,
                })
            }
            Some(ControlError::Timeout(after)) => Err(ControlError::Timeout(*after)),
            None => Ok(()),
        }
    }
}
