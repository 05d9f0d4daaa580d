//! Settings reconciliation on install and update.
//!
//! Every path ends with a valid, schema-stamped record in the synchronized
//! store. A backup of the pre-existing record is attempted before it is touched.

use std::sync::Arc;

use crate::services::backup::SettingsBackup;
use crate::services::notification_dispatcher::NotificationDispatcher;
use crate::services::settings_engine::SettingsEngine;
use crate::types::errors::StoreError;
use crate::types::lifecycle::{InstallEvent, InstallReason, MigrationOutcome};
use crate::types::notification::Notification;
use crate::types::settings::{BackupSnapshot, PartialSettings, SettingsRecord};

pub struct SettingsMigrationController {
    settings: Arc<SettingsEngine>,
    backup: Arc<SettingsBackup>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl SettingsMigrationController {
    pub fn new(
        settings: Arc<SettingsEngine>,
        backup: Arc<SettingsBackup>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self { settings, backup, dispatcher }
    }

    /// Reconciles the settings record for `event`. Store failures fall back
    /// to the backup, then to the defaults.
    pub async fn on_lifecycle_event(&self, event: &InstallEvent) -> MigrationOutcome {
        match self.try_migrate(event).await {
            Ok(outcome) => {
                tracing::info!("[Migration] {:?} on {:?}", outcome, event.reason);
                outcome
            }
            Err(e) => {
                tracing::error!("[Migration] Error during settings migration: {}", e);
                self.recover().await
            }
        }
    }

    async fn try_migrate(&self, event: &InstallEvent) -> Result<MigrationOutcome, StoreError> {
        match event.reason {
            InstallReason::Install => self.fresh_install().await,
            InstallReason::Update => {
                let current = self.settings.read_raw().await?;
                if current.settings_version.is_none() {
                    return self.fresh_install().await;
                }

                self.snapshot_before_migration(&current).await;
                self.settings.write(&current.with_defaults()).await?;
                Ok(MigrationOutcome::Merged)
            }
            InstallReason::HostUpdate | InstallReason::SharedModuleUpdate => {
                let current = self.settings.read_raw().await?;
                if current.settings_version.is_some() {
                    return Ok(MigrationOutcome::Unchanged);
                }
                self.settings.write(&current.with_defaults()).await?;
                Ok(MigrationOutcome::Seeded)
            }
        }
    }

    /// Restores from the previous backup when there is one, otherwise seeds
    /// the defaults. The backup is read before the current record is
    /// snapshotted over it.
    async fn fresh_install(&self) -> Result<MigrationOutcome, StoreError> {
        let previous = match self.backup.latest().await {
            Ok(previous) => previous,
            Err(e) => {
                tracing::warn!("[Migration] Could not read backup: {}", e);
                None
            }
        };

        let current = self.settings.read_raw().await?;
        if !current.is_empty() {
            self.snapshot_before_migration(&current).await;
        }

        match previous {
            Some(snapshot) => {
                self.restore(&snapshot).await?;
                let _ = self.dispatcher.notify(&Notification::settings_restored()).await;
                Ok(MigrationOutcome::Restored)
            }
            None => {
                self.settings.write(&SettingsRecord::default()).await?;
                tracing::info!("[Migration] Default settings initialized");
                let _ = self.dispatcher.notify(&Notification::new_install()).await;
                Ok(MigrationOutcome::Seeded)
            }
        }
    }

    /// A failed snapshot leaves the previous backup in place and does not
    /// stop the migration.
    async fn snapshot_before_migration(&self, current: &PartialSettings) {
        if let Err(e) = self.backup.snapshot(current).await {
            tracing::warn!("[Migration] Could not back up settings before migrating: {}", e);
        }
    }

    async fn restore(&self, snapshot: &BackupSnapshot) -> Result<SettingsRecord, StoreError> {
        let record = self.settings.write(&snapshot.settings.with_defaults()).await?;
        tracing::info!(
            "[Migration] Settings restored from backup taken by version {}",
            snapshot.from_version
        );
        Ok(record)
    }

    async fn recover(&self) -> MigrationOutcome {
        match self.backup.latest().await {
            Ok(Some(snapshot)) => match self.restore(&snapshot).await {
                Ok(_) => return MigrationOutcome::RecoveredFromBackup,
                Err(e) => tracing::error!("[Migration] Restore from backup failed: {}", e),
            },
            Ok(None) => tracing::warn!("[Migration] No backup to recover from"),
            Err(e) => tracing::error!("[Migration] Could not read backup: {}", e),
        }

        if let Err(e) = self.settings.write(&SettingsRecord::default()).await {
            tracing::error!("[Migration] Could not write default settings: {}", e);
        }
        MigrationOutcome::FellBackToDefaults
    }
}
