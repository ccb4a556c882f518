//! Accessory records and the single-writer accessory store
//!
//! - `AccessoryRecord`: the persisted representation of one physical device
//! - `AccessoryStore`: identity-keyed map guarded by one lock, with the
//!   reconcile step performed as a single read-check-write

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sonos_discovery::DeviceDescriptor;

use crate::identity::AccessoryId;

// ============================================================================
// Records
// ============================================================================

/// Cached on/off state of the two EQ switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlState {
    pub night_sound: bool,
    pub speech_enhancement: bool,
}

/// One accessory as known to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryRecord {
    pub id: AccessoryId,
    pub display_name: String,
    /// Last descriptor seen for this identity, replaced on every sighting
    pub device_context: DeviceDescriptor,
    #[serde(default)]
    pub control_state: ControlState,
}

impl AccessoryRecord {
    /// New record with both switches off
    pub fn new(device: DeviceDescriptor) -> Self {
        Self {
            id: AccessoryId::for_device(&device),
            display_name: device.display_name.clone(),
            device_context: device,
            control_state: ControlState::default(),
        }
    }

    pub fn host(&self) -> &str {
        &self.device_context.host
    }
}

/// Outcome of reconciling one described device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Identity was unknown; the record has been inserted and must be registered
    CreateAndRegister(AccessoryRecord),
    /// Identity was known; its device context has been refreshed
    UpdateExisting(AccessoryRecord),
}

impl ReconcileAction {
    pub fn record(&self) -> &AccessoryRecord {
        match self {
            ReconcileAction::CreateAndRegister(record) | ReconcileAction::UpdateExisting(record) => {
                record
            }
        }
    }

    pub fn into_record(self) -> AccessoryRecord {
        match self {
            ReconcileAction::CreateAndRegister(record) | ReconcileAction::UpdateExisting(record) => {
                record
            }
        }
    }
}

// ============================================================================
// AccessoryStore
// ============================================================================

/// Identity-keyed accessory cache.
///
/// Every mutation happens under one lock, so two devices reconciled at the
/// same time can never both observe an identity as missing.
#[derive(Debug, Default)]
pub struct AccessoryStore {
    records: Mutex<HashMap<AccessoryId, AccessoryRecord>>,
}

impl AccessoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from previously persisted records
    pub fn from_records(records: impl IntoIterator<Item = AccessoryRecord>) -> Self {
        let store = Self::new();
        {
            let mut map = store.records.lock();
            for record in records {
                map.insert(record.id, record);
            }
        }
        store
    }

    /// Create or refresh the record for `device`.
    ///
    /// A known identity keeps its display name and control state; only the
    /// device context is replaced.
    pub fn reconcile(&self, device: DeviceDescriptor) -> ReconcileAction {
        let id = AccessoryId::for_device(&device);
        let mut records = self.records.lock();

        match records.get_mut(&id) {
            Some(existing) => {
                existing.device_context = device;
                ReconcileAction::UpdateExisting(existing.clone())
            }
            None => {
                let record = AccessoryRecord::new(device);
                records.insert(id, record.clone());
                ReconcileAction::CreateAndRegister(record)
            }
        }
    }

    /// Drop the records for `ids`, returning how many were present
    pub fn forget(&self, ids: &[AccessoryId]) -> usize {
        let mut records = self.records.lock();
        ids.iter().filter(|id| records.remove(id).is_some()).count()
    }

    pub fn get(&self, id: &AccessoryId) -> Option<AccessoryRecord> {
        self.records.lock().get(id).cloned()
    }

    /// Find a record by display name
    pub fn find_by_name(&self, display_name: &str) -> Option<AccessoryRecord> {
        self.records
            .lock()
            .values()
            .find(|record| record.display_name == display_name)
            .cloned()
    }

    /// Apply `update` to a record's control state, returning the new record
    pub fn update_control_state(
        &self,
        id: &AccessoryId,
        update: impl FnOnce(&mut ControlState),
    ) -> Option<AccessoryRecord> {
        let mut records = self.records.lock();
        let record = records.get_mut(id)?;
        update(&mut record.control_state);
        Some(record.clone())
    }

    /// Snapshot of all records, ordered by display name
    pub fn records(&self) -> Vec<AccessoryRecord> {
        let mut records: Vec<_> = self.records.lock().values().cloned().collect();
        records.sort_by(|a, b| a.display_name.cmp(&b.display_name).then(a.id.cmp(&b.id)));
        records
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}
