//! Interfaces to the browser host.
//!
//! The lifecycle services never talk to the browser directly. Extension
//! management, notifications, tab navigation and the wall clock are reached
//! through these traits so the same services run inside the host bridge and
//! in tests.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::types::errors::{CleanupError, NotificationError};
use crate::types::extension::InstalledExtension;
use crate::types::notification::Notification;

pub mod memory;
pub mod stdio;

/// The host's extension-management surface.
#[async_trait]
pub trait ExtensionManagement: Send + Sync {
    async fn list_installed(&self) -> Result<Vec<InstalledExtension>, CleanupError>;
    async fn uninstall(&self, extension_id: &str) -> Result<(), CleanupError>;
}

/// The host's notification surface.
#[async_trait]
pub trait NotificationSurface: Send + Sync {
    /// Creates or replaces the notification with `notification.id`.
    async fn create(&self, notification: &Notification) -> Result<(), NotificationError>;
}

/// Tab and page navigation offered by the host.
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn open_tab(&self, url: &str) -> Result<(), NotificationError>;
    async fn open_extensions_page(&self) -> Result<(), NotificationError>;
    async fn open_options_page(&self) -> Result<(), NotificationError>;
}

/// Source of wall-clock timestamps in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}
