//! Release-feed polling.
//!
//! One check is one request. The outcome is persisted as the update record in
//! the synchronized store and, when a newer release exists, surfaced as the
//! `manual-update` notification. Nothing is installed automatically.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::host::Clock;
use crate::services::backup::SettingsBackup;
use crate::services::notification_dispatcher::NotificationDispatcher;
use crate::services::release_feed::ReleaseFeed;
use crate::services::version;
use crate::storage::KeyValueStore;
use crate::types::errors::StoreError;
use crate::types::notification::Notification;
use crate::types::settings::{keys as settings_keys, PartialSettings};
use crate::types::update::{keys, UpdateInfo};

/// Remembers when the last successful check happened.
///
/// A check inside `ttl` of that moment is answered from the stored record.
/// A zero `ttl` disables the cache.
#[derive(Debug)]
pub struct CheckCache {
    ttl: Duration,
    last_success: Mutex<Option<i64>>,
}

impl CheckCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, last_success: Mutex::new(None) }
    }

    pub fn is_fresh(&self, now_millis: i64) -> bool {
        if self.ttl.is_zero() {
            return false;
        }
        let last = *self.last_success.lock().unwrap_or_else(|p| p.into_inner());
        match last {
            Some(at) => now_millis >= at && ((now_millis - at) as u128) < self.ttl.as_millis(),
            None => false,
        }
    }

    pub fn record_success(&self, at_millis: i64) {
        *self.last_success.lock().unwrap_or_else(|p| p.into_inner()) = Some(at_millis);
    }
}

/// Clears the in-progress flag when a check ends, even if its future is dropped.
struct InProgress<'a>(&'a AtomicBool);

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct UpdateChecker {
    feed: Arc<dyn ReleaseFeed>,
    sync_store: Arc<dyn KeyValueStore>,
    backup: Arc<SettingsBackup>,
    dispatcher: Arc<NotificationDispatcher>,
    clock: Arc<dyn Clock>,
    current_version: String,
    cache: CheckCache,
    in_progress: AtomicBool,
}

impl UpdateChecker {
    pub fn new(
        feed: Arc<dyn ReleaseFeed>,
        sync_store: Arc<dyn KeyValueStore>,
        backup: Arc<SettingsBackup>,
        dispatcher: Arc<NotificationDispatcher>,
        clock: Arc<dyn Clock>,
        current_version: &str,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            feed,
            sync_store,
            backup,
            dispatcher,
            clock,
            current_version: current_version.to_string(),
            cache: CheckCache::new(cache_ttl),
            in_progress: AtomicBool::new(false),
        }
    }

    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    /// Reads the stored update record. Absent keys read as empty.
    pub async fn stored_info(&self) -> Result<UpdateInfo, StoreError> {
        let map = self.sync_store.get(keys::ALL).await?;
        Ok(UpdateInfo::from_map(&map))
    }

    /// Runs one check against the release feed and returns the record it
    /// persisted. Never fails: feed errors are recorded in the record and
    /// store errors are logged.
    ///
    /// A call made while another check is running returns the stored record
    /// without contacting the feed.
    pub async fn check_for_updates(&self) -> UpdateInfo {
        // `None` when the stored record could not be read. A failed check
        // must then leave the stored availability keys alone.
        let prior = match self.stored_info().await {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!("[Updater] Could not read stored update info: {}", e);
                None
            }
        };

        if self.in_progress.swap(true, Ordering::SeqCst) {
            tracing::debug!("[Updater] Check already in progress");
            return prior.unwrap_or_default();
        }
        let _in_progress = InProgress(&self.in_progress);

        let clock_now = self.clock.now_millis();
        if self.cache.is_fresh(clock_now) {
            tracing::debug!("[Updater] Last check is recent, skipping request");
            return prior.unwrap_or_default();
        }
        let now = prior
            .as_ref()
            .map_or(clock_now, |p| clock_now.max(p.last_update_check));

        let info = match self.feed.fetch_latest().await {
            Ok(release) => {
                let latest = version::strip_version_prefix(&release.tag_name).to_string();
                let newer = version::is_newer(&latest, &self.current_version);
                tracing::info!(
                    "[Updater] Current version: {}, latest version: {}",
                    self.current_version,
                    latest
                );

                if newer {
                    self.backup_current_settings().await;
                }

                UpdateInfo {
                    update_available: newer,
                    latest_version: Some(latest),
                    update_url: newer.then_some(release.html_url),
                    last_update_check: now,
                    update_check_error: None,
                }
            }
            Err(e) => {
                tracing::error!("[Updater] {}", e);
                let info = UpdateInfo {
                    last_update_check: now,
                    update_check_error: Some(e.to_string()),
                    ..prior.clone().unwrap_or_default()
                };
                if prior.is_none() {
                    self.persist_failure(&info).await;
                    return info;
                }
                info
            }
        };

        self.persist(&info).await;

        if info.update_check_error.is_none() {
            self.cache.record_success(clock_now);
        }

        if info.update_available && info.update_check_error.is_none() {
            if let Some(latest) = &info.latest_version {
                // A notification failure is already logged by the dispatcher.
                let _ = self.dispatcher.notify(&Notification::manual_update(latest)).await;
            }
        }

        info
    }

    async fn backup_current_settings(&self) {
        let current = match self.sync_store.get(settings_keys::ALL).await {
            Ok(map) => PartialSettings::from_map(&map),
            Err(e) => {
                tracing::warn!("[Updater] Could not read settings for backup: {}", e);
                return;
            }
        };
        if current.is_empty() {
            return;
        }
        match self.backup.snapshot(&current).await {
            Ok(_) => tracing::info!("[Updater] Settings backed up before update"),
            Err(e) => tracing::warn!("[Updater] Settings backup failed: {}", e),
        }
    }

    /// Records only the failure keys, for when the prior record is unknown.
    async fn persist_failure(&self, info: &UpdateInfo) {
        let mut set = serde_json::Map::new();
        set.insert(keys::LAST_UPDATE_CHECK.to_string(), info.last_update_check.into());
        if let Some(error) = &info.update_check_error {
            set.insert(keys::UPDATE_CHECK_ERROR.to_string(), error.clone().into());
        }
        if let Err(e) = self.sync_store.set(set).await {
            tracing::error!("[Updater] Could not store update check error: {}", e);
        }
    }

    async fn persist(&self, info: &UpdateInfo) {
        let (set, remove) = info.to_store_ops();
        if let Err(e) = self.sync_store.set(set).await {
            tracing::error!("[Updater] Could not store update info: {}", e);
            return;
        }
        if let Err(e) = self.sync_store.remove(&remove).await {
            tracing::error!("[Updater] Could not clear stale update keys: {}", e);
        }
    }
}
