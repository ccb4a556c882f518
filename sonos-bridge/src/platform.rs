//! Platform lifecycle and the discovery pass
//!
//! A pass consumes one discovery stream. Each device goes through
//! describe, filter and reconcile on its own task slot, so a slow or failing
//! device never holds up the others. Registration and update notifications
//! are batched and sent to the host once the stream ends.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use sonos_discovery::{DeviceDescriptor, DeviceHandle, DiscoverySource};
use tracing::{debug, info, warn};

use crate::accessory::SonosAccessory;
use crate::config::BridgeConfig;
use crate::control::EqController;
use crate::error::Result;
use crate::filter::FilterConfig;
use crate::host::AccessoryHost;
use crate::identity::AccessoryId;
use crate::store::{AccessoryRecord, AccessoryStore, ReconcileAction};

/// Non-fatal conditions recorded during a pass
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PassWarning {
    #[error("No devices configured in \"deviceNames\" or \"devices\"; discovery skipped")]
    ConfigurationEmpty,

    #[error("Describing device at {host} failed: {cause}")]
    DescribeFailed { host: String, cause: String },

    #[error("Describing device at {host} timed out after {after:?}")]
    DescribeTimedOut { host: String, after: Duration },
}

/// What a discovery pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Records handed to `register_new`
    pub registered: Vec<AccessoryRecord>,
    /// Records handed to `notify_updated`
    pub updated: Vec<AccessoryRecord>,
    /// Described devices the filter turned down
    pub rejected: Vec<DeviceDescriptor>,
    pub warnings: Vec<PassWarning>,
}

impl PassReport {
    /// Whether discovery was skipped for lack of configuration
    pub fn skipped(&self) -> bool {
        self.warnings.contains(&PassWarning::ConfigurationEmpty)
    }
}

enum DeviceOutcome {
    Reconciled(ReconcileAction),
    Rejected(DeviceDescriptor),
    Failed(PassWarning),
}

/// Discovers, filters and tracks Sonos accessories for one host
pub struct SonosPlatform {
    config: BridgeConfig,
    filter: Option<FilterConfig>,
    store: Arc<AccessoryStore>,
    host: Arc<dyn AccessoryHost>,
    controller: Arc<dyn EqController>,
}

impl SonosPlatform {
    /// Create the platform and restore accessories cached by the host
    pub fn new(
        config: BridgeConfig,
        host: Arc<dyn AccessoryHost>,
        controller: Arc<dyn EqController>,
    ) -> Result<Self> {
        let cached = host.cached_accessories()?;
        for record in &cached {
            info!("Loading accessory from cache: {}", record.display_name);
        }

        let filter = FilterConfig::resolve(&config);
        debug!("Finished initializing platform: {}", config.platform_name());

        Ok(Self {
            config,
            filter,
            store: Arc::new(AccessoryStore::from_records(cached)),
            host,
            controller,
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn filter(&self) -> Option<&FilterConfig> {
        self.filter.as_ref()
    }

    pub fn store(&self) -> &Arc<AccessoryStore> {
        &self.store
    }

    /// Handler for the accessory with `id`, if known
    pub fn accessory(&self, id: AccessoryId) -> Option<SonosAccessory> {
        self.store.get(&id).map(|record| self.handler(record.id))
    }

    /// Handler for the accessory whose display name is `name`
    pub fn accessory_by_name(&self, name: &str) -> Option<SonosAccessory> {
        self.store
            .find_by_name(name)
            .map(|record| self.handler(record.id))
    }

    /// Handlers for every known accessory, ordered by display name
    pub fn accessories(&self) -> Vec<SonosAccessory> {
        self.store
            .records()
            .into_iter()
            .map(|record| self.handler(record.id))
            .collect()
    }

    fn handler(&self, id: AccessoryId) -> SonosAccessory {
        SonosAccessory::new(id, Arc::clone(&self.store), Arc::clone(&self.controller))
    }

    /// Run one discovery pass against `source`.
    ///
    /// With no filter configured the source is never polled and the report
    /// carries [`PassWarning::ConfigurationEmpty`]. Per-device failures are
    /// recorded as warnings. Only host failures abort the pass. When the host
    /// refuses a registration, the records created in this pass are dropped
    /// from the store so the next pass registers them again.
    pub async fn run_discovery_pass(&self, source: &dyn DiscoverySource) -> Result<PassReport> {
        let Some(filter) = self.filter.as_ref() else {
            warn!("No devices configured in \"deviceNames\" or \"devices\". No Sonos devices will be added.");
            warn!("Add your Sonos room names to \"deviceNames\", or use \"devices\" for strict filtering, in the bridge configuration.");
            return Ok(PassReport {
                warnings: vec![PassWarning::ConfigurationEmpty],
                ..Default::default()
            });
        };

        info!("Starting Sonos device discovery...");

        let describe_timeout = self.config.describe_timeout();
        let store = self.store.as_ref();

        let outcomes: Vec<DeviceOutcome> = source
            .discover()
            .map(|handle| process_device(handle, filter, store, describe_timeout))
            .buffer_unordered(self.config.max_concurrent_describes())
            .collect()
            .await;

        let mut report = PassReport::default();
        let mut actions: Vec<ReconcileAction> = Vec::new();
        let mut slots: HashMap<AccessoryId, usize> = HashMap::new();

        for outcome in outcomes {
            match outcome {
                DeviceOutcome::Reconciled(action) => {
                    let id = action.record().id;
                    match slots.get(&id) {
                        // Seen earlier in this pass: one action per identity, created wins
                        Some(&slot) => {
                            let created = matches!(actions[slot], ReconcileAction::CreateAndRegister(_))
                                || matches!(action, ReconcileAction::CreateAndRegister(_));
                            let record = action.into_record();
                            actions[slot] = if created {
                                ReconcileAction::CreateAndRegister(record)
                            } else {
                                ReconcileAction::UpdateExisting(record)
                            };
                        }
                        None => {
                            slots.insert(id, actions.len());
                            actions.push(action);
                        }
                    }
                }
                DeviceOutcome::Rejected(device) => report.rejected.push(device),
                DeviceOutcome::Failed(warning) => report.warnings.push(warning),
            }
        }

        for action in actions {
            match action {
                ReconcileAction::CreateAndRegister(record) => report.registered.push(record),
                ReconcileAction::UpdateExisting(record) => report.updated.push(record),
            }
        }

        let registration = if report.registered.is_empty() {
            Ok(())
        } else {
            for record in &report.registered {
                info!("Adding new accessory: {}", record.display_name);
            }
            self.host.register_new(&report.registered)
        };

        // Unregistered records must be created again on the next pass
        if let Err(e) = &registration {
            let ids: Vec<AccessoryId> = report.registered.iter().map(|r| r.id).collect();
            let dropped = self.store.forget(&ids);
            warn!("Host failed to register {} new accessories: {}", dropped, e);
        }

        if !report.updated.is_empty() {
            for record in &report.updated {
                info!("Restoring existing accessory from cache: {}", record.display_name);
            }
            self.host.notify_updated(&report.updated)?;
        }

        registration?;

        info!(
            "Discovery pass finished: {} new, {} updated, {} ignored, {} failed",
            report.registered.len(),
            report.updated.len(),
            report.rejected.len(),
            report.warnings.len()
        );

        Ok(report)
    }
}

async fn process_device(
    handle: Box<dyn DeviceHandle>,
    filter: &FilterConfig,
    store: &AccessoryStore,
    describe_timeout: Duration,
) -> DeviceOutcome {
    let host = handle.host().to_string();
    debug!("Discovered a Sonos device at: {}", host);

    let device = match tokio::time::timeout(describe_timeout, handle.describe()).await {
        Ok(Ok(device)) => device,
        Ok(Err(e)) => {
            warn!("Error getting device description for device at {}: {}", host, e);
            return DeviceOutcome::Failed(PassWarning::DescribeFailed {
                host,
                cause: e.to_string(),
            });
        }
        Err(_) => {
            warn!(
                "Device description for {} did not arrive within {:?}",
                host, describe_timeout
            );
            return DeviceOutcome::Failed(PassWarning::DescribeTimedOut {
                host,
                after: describe_timeout,
            });
        }
    };

    if !filter.decide(&device) {
        return DeviceOutcome::Rejected(device);
    }

    DeviceOutcome::Reconciled(store.reconcile(device))
}
