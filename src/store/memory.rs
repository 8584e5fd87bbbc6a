use super::StateStorage;
use crate::core::model::AppState;
use anyhow::{Context, Result};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Keeps the snapshot in process memory, running it through the same serde
/// path the disk backend uses. Tests lean on this for a store without a
/// filesystem.
pub struct MemoryStorage {
    record: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage {
            record: Arc::new(Mutex::new(None)),
        }
    }

    /// A second handle over the same record, for asserting on what a store
    /// owning the first handle persisted.
    pub fn clone_handle(&self) -> Self {
        MemoryStorage {
            record: Arc::clone(&self.record),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self) -> Result<Option<AppState>> {
        let record = self.record.lock().unwrap();
        let Some(bytes) = record.as_deref() else {
            return Ok(None);
        };
        match serde_json::from_slice(bytes) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warn!("Stored snapshot does not decode, treating it as absent: {e}");
                Ok(None)
            }
        }
    }

    fn save(&self, state: &AppState) -> Result<()> {
        let bytes = serde_json::to_vec(state).context("Failed to encode snapshot")?;
        *self.record.lock().unwrap() = Some(bytes);
        Ok(())
    }
}
