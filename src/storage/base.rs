use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use super::{file_slot::FileSlot, memory_slot::MemorySlot, no_slot::NoSlot};
use crate::config::{StorageBackend, StorageConfig};

/// Why the persisted token slot could not be used.
#[derive(Debug, Error)]
pub enum SlotError {
    #[error("token persistence is disabled")]
    Disabled,
    #[error("token slot I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A single persisted cell holding the raw bearer token.
///
/// The session store is the only writer; everything else reads session
/// state through the store.
pub trait TokenSlot: Send + Sync {
    fn read(&self) -> Result<Option<String>, SlotError>;
    fn write(&self, token: &str) -> Result<(), SlotError>;
    /// Removing an already empty slot succeeds.
    fn clear(&self) -> Result<(), SlotError>;
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Creates a concrete slot based on the StorageConfig.
/// If `storage.enabled = false`, returns NoSlot. Otherwise, picks the specified backend.
pub fn create_slot(config: &StorageConfig) -> Arc<dyn TokenSlot> {
    if !config.enabled {
        info!("Token persistence is disabled. Using NoSlot.");
        return Arc::new(NoSlot::new());
    }

    match &config.backend {
        Some(StorageBackend::File(file_config)) => {
            info!("Persisting session token in '{}'", file_config.path);
            Arc::new(FileSlot::new(&file_config.path))
        }
        Some(StorageBackend::Memory) => {
            info!("Keeping session token in memory only.");
            Arc::new(MemorySlot::new())
        }
        None => {
            error!("Storage is enabled, but no backend config is provided! Using NoSlot.");
            Arc::new(NoSlot::new())
        }
    }
}
