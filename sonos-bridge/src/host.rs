//! Host runtime seam
//!
//! The host owns accessory persistence. The bridge reads the cache once at
//! startup and hands over batches of new and updated records after each
//! discovery pass.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::identity::AccessoryId;
use crate::store::AccessoryRecord;

/// Errors raised by an accessory host
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Accessory cache I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Accessory cache is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Host rejected accessories: {0}")]
    Rejected(String),
}

/// Accessory persistence and registration primitives supplied by the host
pub trait AccessoryHost: Send + Sync {
    /// Records persisted by earlier runs
    fn cached_accessories(&self) -> Result<Vec<AccessoryRecord>, HostError>;

    /// Register newly created accessories. Called at most once per pass.
    fn register_new(&self, records: &[AccessoryRecord]) -> Result<(), HostError>;

    /// Persist refreshed accessories. Called at most once per pass.
    fn notify_updated(&self, records: &[AccessoryRecord]) -> Result<(), HostError>;
}

// ============================================================================
// JsonFileHost
// ============================================================================

/// Host that keeps accessories in a single JSON file.
///
/// The whole file is rewritten on every register or update call. A missing
/// file reads as an empty cache.
#[derive(Debug)]
pub struct JsonFileHost {
    path: PathBuf,
    records: Mutex<BTreeMap<AccessoryId, AccessoryRecord>>,
}

impl JsonFileHost {
    /// Open the cache at `path`, loading any records already stored there
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HostError> {
        let path = path.into();
        let records = read_records(&path)?
            .into_iter()
            .map(|record| (record.id, record))
            .collect();

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a single record, used after a switch changes state
    pub fn save(&self, record: &AccessoryRecord) -> Result<(), HostError> {
        self.merge(std::slice::from_ref(record))
    }

    fn merge(&self, records: &[AccessoryRecord]) -> Result<(), HostError> {
        let mut stored = self.records.lock();
        for record in records {
            stored.insert(record.id, record.clone());
        }

        let snapshot: Vec<&AccessoryRecord> = stored.values().collect();
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(&self.path, json).map_err(|source| HostError::Io {
            path: self.path.display().to_string(),
            source,
        })?;

        debug!("Wrote {} accessories to {}", snapshot.len(), self.path.display());
        Ok(())
    }
}

impl AccessoryHost for JsonFileHost {
    fn cached_accessories(&self) -> Result<Vec<AccessoryRecord>, HostError> {
        Ok(self.records.lock().values().cloned().collect())
    }

    fn register_new(&self, records: &[AccessoryRecord]) -> Result<(), HostError> {
        for record in records {
            info!("Registering accessory {} ({})", record.display_name, record.id);
        }
        self.merge(records)
    }

    fn notify_updated(&self, records: &[AccessoryRecord]) -> Result<(), HostError> {
        self.merge(records)
    }
}

fn read_records(path: &Path) -> Result<Vec<AccessoryRecord>, HostError> {
    match std::fs::read_to_string(path) {
        Ok(text) if text.trim().is_empty() => Ok(Vec::new()),
        Ok(text) => Ok(serde_json::from_str(&text)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(source) => Err(HostError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}
