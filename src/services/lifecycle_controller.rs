//! Entry point for host events.
//!
//! Lifecycle events and update checks share one async lock, so a migration
//! never interleaves with a check and two checks never run at once.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::UPDATE_CHECK_ALARM;
use crate::services::notification_dispatcher::NotificationDispatcher;
use crate::services::old_version_cleanup::OldVersionCleanup;
use crate::services::settings_migration::SettingsMigrationController;
use crate::services::update_checker::UpdateChecker;
use crate::types::extension::CleanupReport;
use crate::types::lifecycle::{
    InstallEvent, InstallReason, MessageResponse, MigrationOutcome, RuntimeMessage,
};
use crate::types::notification::NavigationAction;
use crate::types::update::UpdateInfo;

/// Action name accepted on the runtime message channel.
pub const CHECK_FOR_UPDATES_ACTION: &str = "checkForUpdates";

/// What handling one installed event did.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InstallReport {
    pub migration: MigrationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<CleanupReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<UpdateInfo>,
}

pub struct LifecycleController {
    migration: SettingsMigrationController,
    cleanup: OldVersionCleanup,
    checker: Arc<UpdateChecker>,
    dispatcher: Arc<NotificationDispatcher>,
    check_interval: Duration,
    serial: Arc<Mutex<()>>,
}

impl LifecycleController {
    pub fn new(
        migration: SettingsMigrationController,
        cleanup: OldVersionCleanup,
        checker: Arc<UpdateChecker>,
        dispatcher: Arc<NotificationDispatcher>,
        check_interval: Duration,
    ) -> Self {
        Self {
            migration,
            cleanup,
            checker,
            dispatcher,
            check_interval,
            serial: Arc::new(Mutex::new(())),
        }
    }

    /// Handles the host's installed event: migrate settings, remove the
    /// superseded copy after an update, check once, then arm the recurring
    /// check. The timer is armed for every reason.
    pub async fn on_installed(&self, event: &InstallEvent) -> InstallReport {
        let report = {
            let _serial = self.serial.lock().await;

            match event.reason {
                InstallReason::Install | InstallReason::Update => {
                    let migration = self.migration.on_lifecycle_event(event).await;

                    let cleanup = match (event.reason, event.previous_version.as_deref()) {
                        (InstallReason::Update, Some(previous)) => {
                            Some(self.cleanup.cleanup(previous).await)
                        }
                        _ => None,
                    };

                    let update = Some(self.checker.check_for_updates().await);
                    InstallReport { migration, cleanup, update }
                }
                InstallReason::HostUpdate | InstallReason::SharedModuleUpdate => InstallReport {
                    migration: self.migration.on_lifecycle_event(event).await,
                    cleanup: None,
                    update: None,
                },
            }
        };

        self.arm_update_timer();
        report
    }

    fn arm_update_timer(&self) {
        let checker = self.checker.clone();
        let serial = self.serial.clone();
        self.dispatcher
            .schedule(UPDATE_CHECK_ALARM, self.check_interval, move || {
                let checker = checker.clone();
                let serial = serial.clone();
                async move {
                    let _serial = serial.lock().await;
                    checker.check_for_updates().await;
                }
            });
    }

    /// Runs a check now, waiting for any lifecycle handling in progress.
    pub async fn check_now(&self) -> UpdateInfo {
        let _serial = self.serial.lock().await;
        self.checker.check_for_updates().await
    }

    /// Handles a runtime message. A check request is acknowledged at once
    /// and runs in the background.
    pub fn handle_message(&self, message: &RuntimeMessage) -> MessageResponse {
        if message.action != CHECK_FOR_UPDATES_ACTION {
            tracing::debug!("[Lifecycle] Unknown message action '{}'", message.action);
            return MessageResponse { status: "unknown_action".to_string() };
        }

        let checker = self.checker.clone();
        let serial = self.serial.clone();
        tokio::spawn(async move {
            let _serial = serial.lock().await;
            checker.check_for_updates().await;
        });
        MessageResponse { status: "checking".to_string() }
    }

    /// Handles a named alarm fired by the host. Returns `None` for alarms
    /// this controller does not own.
    pub async fn on_alarm(&self, name: &str) -> Option<UpdateInfo> {
        if name != UPDATE_CHECK_ALARM {
            return None;
        }
        Some(self.check_now().await)
    }

    pub async fn on_notification_clicked(&self, id: &str) -> Option<NavigationAction> {
        self.dispatcher.on_action(id, None).await
    }

    pub async fn on_button_clicked(&self, id: &str, button: usize) -> Option<NavigationAction> {
        self.dispatcher.on_action(id, Some(button)).await
    }

    pub fn is_update_timer_armed(&self) -> bool {
        self.dispatcher.is_scheduled(UPDATE_CHECK_ALARM)
    }

    pub fn checker(&self) -> &Arc<UpdateChecker> {
        &self.checker
    }
}
