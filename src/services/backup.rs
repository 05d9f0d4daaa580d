//! Single-slot settings backup in the local store.

use std::sync::Arc;

use serde_json::Map;

use crate::host::Clock;
use crate::storage::KeyValueStore;
use crate::types::errors::StoreError;
use crate::types::settings::{BackupSnapshot, PartialSettings, BACKUP_KEY};

/// Reads and overwrites the `backupSettings` slot.
pub struct SettingsBackup {
    local_store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    version: String,
}

impl SettingsBackup {
    pub fn new(local_store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, version: &str) -> Self {
        Self {
            local_store,
            clock,
            version: version.to_string(),
        }
    }

    /// Overwrites the slot with `settings`, stamped with the current time and
    /// the running version.
    pub async fn snapshot(&self, settings: &PartialSettings) -> Result<BackupSnapshot, StoreError> {
        let snapshot = BackupSnapshot {
            settings: settings.clone(),
            backup_time: self.clock.now_millis(),
            from_version: self.version.clone(),
        };

        let mut items = Map::new();
        items.insert(BACKUP_KEY.to_string(), snapshot.to_value());
        self.local_store.set(items).await?;

        tracing::debug!("[Backup] Settings backed up from version {}", self.version);
        Ok(snapshot)
    }

    /// Returns the stored snapshot, if any. A slot holding something other
    /// than an object, or an object with no settings fields, reads as empty.
    pub async fn latest(&self) -> Result<Option<BackupSnapshot>, StoreError> {
        let stored = self.local_store.get(&[BACKUP_KEY]).await?;
        Ok(stored
            .get(BACKUP_KEY)
            .and_then(BackupSnapshot::from_value)
            .filter(|s| !s.settings.is_empty()))
    }
}
