//! App Core for Px2 Connect.
//!
//! Builds the stores, services and lifecycle controller from a config and a
//! set of host bindings.

use std::sync::Arc;

use crate::config::LifecycleConfig;
use crate::database::Database;
use crate::host::{Clock, ExtensionManagement, Navigator, NotificationSurface, SystemClock};
use crate::services::backup::SettingsBackup;
use crate::services::lifecycle_controller::LifecycleController;
use crate::services::notification_dispatcher::NotificationDispatcher;
use crate::services::old_version_cleanup::OldVersionCleanup;
use crate::services::release_feed::{GitHubReleaseFeed, ReleaseFeed};
use crate::services::settings_engine::SettingsEngine;
use crate::services::settings_migration::SettingsMigrationController;
use crate::services::update_checker::UpdateChecker;
use crate::storage::{JsonFileStore, KeyValueStore, SqliteStore};

/// File name of the synchronized store inside the data dir.
pub const SYNC_STORE_FILE: &str = "sync.json";
/// File name of the local backup store inside the data dir.
pub const LOCAL_STORE_FILE: &str = "local.db";

/// The browser surfaces the services act on.
#[derive(Clone)]
pub struct HostBindings {
    pub management: Arc<dyn ExtensionManagement>,
    pub surface: Arc<dyn NotificationSurface>,
    pub navigator: Arc<dyn Navigator>,
    pub clock: Arc<dyn Clock>,
}

impl HostBindings {
    /// Binds every surface to one host object and the system clock.
    pub fn from_host<H>(host: Arc<H>) -> Self
    where
        H: ExtensionManagement + NotificationSurface + Navigator + 'static,
    {
        Self::with_clock(host, Arc::new(SystemClock))
    }

    pub fn with_clock<H>(host: Arc<H>, clock: Arc<dyn Clock>) -> Self
    where
        H: ExtensionManagement + NotificationSurface + Navigator + 'static,
    {
        Self {
            management: host.clone(),
            surface: host.clone(),
            navigator: host,
            clock,
        }
    }
}

/// Central application struct holding the stores and services.
pub struct App {
    pub config: LifecycleConfig,
    pub sync_store: Arc<dyn KeyValueStore>,
    pub local_store: Arc<dyn KeyValueStore>,
    pub settings_engine: Arc<SettingsEngine>,
    pub lifecycle: LifecycleController,
}

impl App {
    /// Wires the services over explicit stores and release feed.
    pub fn with_parts(
        config: LifecycleConfig,
        sync_store: Arc<dyn KeyValueStore>,
        local_store: Arc<dyn KeyValueStore>,
        feed: Arc<dyn ReleaseFeed>,
        host: HostBindings,
    ) -> Self {
        let settings_engine = Arc::new(SettingsEngine::new(sync_store.clone()));
        let backup = Arc::new(SettingsBackup::new(
            local_store.clone(),
            host.clock.clone(),
            &config.extension_version,
        ));
        let dispatcher = Arc::new(NotificationDispatcher::new(
            host.surface.clone(),
            host.navigator.clone(),
            sync_store.clone(),
        ));
        let checker = Arc::new(UpdateChecker::new(
            feed,
            sync_store.clone(),
            backup.clone(),
            dispatcher.clone(),
            host.clock.clone(),
            &config.extension_version,
            config.check_cache_ttl(),
        ));
        let migration =
            SettingsMigrationController::new(settings_engine.clone(), backup, dispatcher.clone());
        let cleanup = OldVersionCleanup::new(
            host.management.clone(),
            &config.extension_id,
            &config.extension_name,
        );
        let lifecycle = LifecycleController::new(
            migration,
            cleanup,
            checker,
            dispatcher,
            config.update_check_interval(),
        );

        Self {
            config,
            sync_store,
            local_store,
            settings_engine,
            lifecycle,
        }
    }

    /// Opens the on-disk stores under the configured data dir and the HTTP
    /// release feed.
    pub fn open(config: LifecycleConfig, host: HostBindings) -> Result<Self, Box<dyn std::error::Error>> {
        let data_dir = config.data_dir();
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| format!("Failed to create data dir {}: {}", data_dir.display(), e))?;

        let sync_store: Arc<dyn KeyValueStore> =
            Arc::new(JsonFileStore::new(data_dir.join(SYNC_STORE_FILE)));
        let db = Arc::new(Database::open(data_dir.join(LOCAL_STORE_FILE))?);
        let local_store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new(db));
        let feed: Arc<dyn ReleaseFeed> = Arc::new(GitHubReleaseFeed::new(
            &config.release_feed_url,
            config.request_timeout(),
            &config.user_agent,
        )?);

        tracing::info!("[App] Data dir: {}", data_dir.display());
        Ok(Self::with_parts(config, sync_store, local_store, feed, host))
    }
}
