//! In-memory host used by tests and local runs.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Clock, ExtensionManagement, Navigator, NotificationSurface};
use crate::types::errors::{CleanupError, NotificationError};
use crate::types::extension::InstalledExtension;
use crate::types::notification::{NavigationAction, Notification};

/// Records every host side effect instead of performing it.
#[derive(Default)]
pub struct MemoryHost {
    installed: Mutex<Vec<InstalledExtension>>,
    failing_uninstalls: Mutex<HashSet<String>>,
    fail_listing: AtomicBool,
    fail_notifications: AtomicBool,
    uninstalled: Mutex<Vec<String>>,
    notifications: Mutex<Vec<Notification>>,
    navigations: Mutex<Vec<NavigationAction>>,
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_installed(installed: Vec<InstalledExtension>) -> Self {
        let host = Self::default();
        *lock(&host.installed) = installed;
        host
    }

    /// Makes `uninstall(id)` fail for the given id.
    pub fn fail_uninstall_of(&self, id: &str) {
        lock(&self.failing_uninstalls).insert(id.to_string());
    }

    pub fn set_fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_notifications(&self, fail: bool) {
        self.fail_notifications.store(fail, Ordering::SeqCst);
    }

    pub fn installed(&self) -> Vec<InstalledExtension> {
        lock(&self.installed).clone()
    }

    pub fn uninstalled(&self) -> Vec<String> {
        lock(&self.uninstalled).clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.notifications).clone()
    }

    pub fn notification_ids(&self) -> Vec<String> {
        lock(&self.notifications).iter().map(|n| n.id.clone()).collect()
    }

    pub fn navigations(&self) -> Vec<NavigationAction> {
        lock(&self.navigations).clone()
    }
}

#[async_trait]
impl ExtensionManagement for MemoryHost {
    async fn list_installed(&self) -> Result<Vec<InstalledExtension>, CleanupError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(CleanupError::ListFailed("management API unavailable".to_string()));
        }
        Ok(self.installed())
    }

    async fn uninstall(&self, extension_id: &str) -> Result<(), CleanupError> {
        if lock(&self.failing_uninstalls).contains(extension_id) {
            return Err(CleanupError::UninstallFailed {
                id: extension_id.to_string(),
                message: "user cancelled".to_string(),
            });
        }
        lock(&self.installed).retain(|e| e.id != extension_id);
        lock(&self.uninstalled).push(extension_id.to_string());
        Ok(())
    }
}

#[async_trait]
impl NotificationSurface for MemoryHost {
    async fn create(&self, notification: &Notification) -> Result<(), NotificationError> {
        if self.fail_notifications.load(Ordering::SeqCst) {
            return Err(NotificationError::CreateFailed {
                id: notification.id.clone(),
                message: "notifications disabled".to_string(),
            });
        }
        let mut notifications = lock(&self.notifications);
        notifications.retain(|n| n.id != notification.id);
        notifications.push(notification.clone());
        Ok(())
    }
}

#[async_trait]
impl Navigator for MemoryHost {
    async fn open_tab(&self, url: &str) -> Result<(), NotificationError> {
        lock(&self.navigations).push(NavigationAction::OpenUrl(url.to_string()));
        Ok(())
    }

    async fn open_extensions_page(&self) -> Result<(), NotificationError> {
        lock(&self.navigations).push(NavigationAction::OpenExtensionsPage);
        Ok(())
    }

    async fn open_options_page(&self) -> Result<(), NotificationError> {
        lock(&self.navigations).push(NavigationAction::OpenOptionsPage);
        Ok(())
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self { now: AtomicI64::new(start_millis) }
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
