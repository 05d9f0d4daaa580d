//! Notifications, recurring timers and click routing.
//!
//! Timers are named tokio tasks. Arming a name that is already armed aborts
//! the old task first, so there is at most one timer per name.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::host::{Navigator, NotificationSurface};
use crate::storage::KeyValueStore;
use crate::types::errors::NotificationError;
use crate::types::notification::{NavigationAction, Notification, NotificationKind};
use crate::types::update::keys as update_keys;

/// What a notification does when clicked or when its first button is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    StoredUpdateUrl,
    ExtensionsPage,
    OptionsPage,
}

fn route_for(kind: NotificationKind) -> Route {
    match kind {
        NotificationKind::ManualUpdate => Route::StoredUpdateUrl,
        NotificationKind::SettingsRestored => Route::ExtensionsPage,
        NotificationKind::NewInstall => Route::OptionsPage,
    }
}

pub struct NotificationDispatcher {
    surface: Arc<dyn NotificationSurface>,
    navigator: Arc<dyn Navigator>,
    sync_store: Arc<dyn KeyValueStore>,
    timers: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl NotificationDispatcher {
    pub fn new(
        surface: Arc<dyn NotificationSurface>,
        navigator: Arc<dyn Navigator>,
        sync_store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            surface,
            navigator,
            sync_store,
            timers: Mutex::new(HashMap::new()),
        }
    }

    fn timers(&self) -> MutexGuard<'_, HashMap<String, JoinHandle<()>>> {
        self.timers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Arms a recurring timer that runs `task` every `period`, first after one
    /// full period. Replaces any timer already armed under `name`.
    ///
    /// A zero period, or one too long to represent as a deadline, arms
    /// nothing. Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&self, name: &str, period: Duration, task: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let first = match Instant::now().checked_add(period) {
            Some(first) if !period.is_zero() => first,
            _ => {
                tracing::warn!("[Notify] Timer '{}' not armed: invalid period {:?}", name, period);
                return;
            }
        };

        let timer_name = name.to_string();
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tracing::debug!("[Notify] Timer '{}' fired", timer_name);
                task().await;
            }
        });

        if let Some(previous) = self.timers().insert(name.to_string(), handle) {
            previous.abort();
            tracing::debug!("[Notify] Replaced timer '{}'", name);
        }
        tracing::info!("[Notify] Timer '{}' armed every {:?}", name, period);
    }

    /// Stops the named timer. Returns false if none was armed.
    pub fn cancel(&self, name: &str) -> bool {
        match self.timers().remove(name) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_scheduled(&self, name: &str) -> bool {
        self.timers().get(name).map_or(false, |h| !h.is_finished())
    }

    /// Creates or replaces a notification on the host surface.
    pub async fn notify(&self, notification: &Notification) -> Result<(), NotificationError> {
        match self.surface.create(notification).await {
            Ok(()) => {
                tracing::info!("[Notify] Showing '{}'", notification.id);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("[Notify] {}", e);
                Err(e)
            }
        }
    }

    /// Routes a click on notification `id` (`button` is `None` for a click on
    /// the body) and performs the navigation. Returns the action taken, or
    /// `None` for unknown ids, secondary buttons, and failed navigations.
    pub async fn on_action(&self, id: &str, button: Option<usize>) -> Option<NavigationAction> {
        let kind = NotificationKind::from_id(id)?;
        if !matches!(button, None | Some(0)) {
            return None;
        }

        let action = match route_for(kind) {
            Route::StoredUpdateUrl => NavigationAction::OpenUrl(self.stored_update_url().await?),
            Route::ExtensionsPage => NavigationAction::OpenExtensionsPage,
            Route::OptionsPage => NavigationAction::OpenOptionsPage,
        };

        let result = match &action {
            NavigationAction::OpenUrl(url) => self.navigator.open_tab(url).await,
            NavigationAction::OpenExtensionsPage => self.navigator.open_extensions_page().await,
            NavigationAction::OpenOptionsPage => self.navigator.open_options_page().await,
        };

        match result {
            Ok(()) => Some(action),
            Err(e) => {
                tracing::warn!("[Notify] {}", e);
                None
            }
        }
    }

    async fn stored_update_url(&self) -> Option<String> {
        match self.sync_store.get(&[update_keys::UPDATE_URL]).await {
            Ok(map) => {
                let url = map
                    .get(update_keys::UPDATE_URL)
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
                if url.is_none() {
                    tracing::warn!("[Notify] No update URL stored");
                }
                url
            }
            Err(e) => {
                tracing::warn!("[Notify] Could not read update URL: {}", e);
                None
            }
        }
    }
}

impl Drop for NotificationDispatcher {
    fn drop(&mut self) {
        for (_, handle) in self.timers().drain() {
            handle.abort();
        }
    }
}
