//! Host bindings for the stdin/stdout bridge.
//!
//! The browser side of the bridge performs the real effects. This side emits
//! one `{"event": ...}` line per effect and keeps the list of installed
//! extensions the browser last reported.

use std::io::{self, Write};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ExtensionManagement, Navigator, NotificationSurface};
use crate::types::errors::{CleanupError, NotificationError};
use crate::types::extension::InstalledExtension;
use crate::types::notification::Notification;

/// Line-oriented JSON writer shared by responses and host events, so that
/// lines from concurrent tasks never interleave.
#[derive(Default)]
pub struct EventSink {
    out: Mutex<()>,
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, value: &Value) -> io::Result<()> {
        let _guard = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", value)?;
        stdout.flush()
    }
}

pub struct StdioHost {
    sink: std::sync::Arc<EventSink>,
    installed: Mutex<Option<Vec<InstalledExtension>>>,
}

impl StdioHost {
    pub fn new(sink: std::sync::Arc<EventSink>) -> Self {
        Self { sink, installed: Mutex::new(None) }
    }

    /// Replaces the installed-extension list reported by the browser.
    pub fn set_installed(&self, installed: Vec<InstalledExtension>) {
        *self.installed.lock().unwrap_or_else(|p| p.into_inner()) = Some(installed);
    }

    fn emit(&self, event: Value) -> Result<(), String> {
        self.sink.emit(&event).map_err(|e| e.to_string())
    }
}

#[async_trait]
impl ExtensionManagement for StdioHost {
    async fn list_installed(&self) -> Result<Vec<InstalledExtension>, CleanupError> {
        self.installed
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
            .ok_or_else(|| CleanupError::ListFailed("browser did not report installed extensions".to_string()))
    }

    async fn uninstall(&self, extension_id: &str) -> Result<(), CleanupError> {
        self.emit(json!({"event": "management.uninstall", "id": extension_id}))
            .map_err(|message| CleanupError::UninstallFailed {
                id: extension_id.to_string(),
                message,
            })?;
        if let Some(list) = self.installed.lock().unwrap_or_else(|p| p.into_inner()).as_mut() {
            list.retain(|e| e.id != extension_id);
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationSurface for StdioHost {
    async fn create(&self, notification: &Notification) -> Result<(), NotificationError> {
        self.emit(json!({"event": "notification.create", "notification": notification}))
            .map_err(|message| NotificationError::CreateFailed {
                id: notification.id.clone(),
                message,
            })
    }
}

#[async_trait]
impl Navigator for StdioHost {
    async fn open_tab(&self, url: &str) -> Result<(), NotificationError> {
        self.emit(json!({"event": "tabs.create", "url": url}))
            .map_err(NotificationError::NavigationFailed)
    }

    async fn open_extensions_page(&self) -> Result<(), NotificationError> {
        self.emit(json!({"event": "tabs.open_extensions_page"}))
            .map_err(NotificationError::NavigationFailed)
    }

    async fn open_options_page(&self) -> Result<(), NotificationError> {
        self.emit(json!({"event": "runtime.open_options_page"}))
            .map_err(NotificationError::NavigationFailed)
    }
}
