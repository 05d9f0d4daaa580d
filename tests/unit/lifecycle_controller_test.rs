//! Unit tests for the lifecycle controller, wired through `App::with_parts`.

use std::sync::Arc;
use std::time::Duration;

use px2connect::app::{App, HostBindings};
use px2connect::config::{LifecycleConfig, UPDATE_CHECK_ALARM};
use px2connect::host::memory::{ManualClock, MemoryHost};
use px2connect::services::release_feed::StaticReleaseFeed;
use px2connect::services::settings_engine::SettingsEngineTrait;
use px2connect::storage::MemoryStore;
use px2connect::types::extension::InstalledExtension;
use px2connect::types::lifecycle::{InstallEvent, InstallReason, MigrationOutcome, RuntimeMessage};
use px2connect::types::notification::NavigationAction;
use px2connect::types::settings::{IpType, BACKUP_KEY};
use serde_json::{json, Map, Value};

const RELEASE_URL: &str = "https://github.com/jphermans/Px2Connect_browser_extension/releases/tag/v1.5.0";

struct Fixture {
    app: App,
    host: Arc<MemoryHost>,
    feed: Arc<StaticReleaseFeed>,
    sync: Arc<MemoryStore>,
    local: Arc<MemoryStore>,
}

fn config() -> LifecycleConfig {
    LifecycleConfig {
        extension_id: "self".to_string(),
        extension_name: "Px2 Connect".to_string(),
        extension_version: "1.4.0".to_string(),
        ..LifecycleConfig::default()
    }
}

fn setup_with(sync_entries: Map<String, Value>, installed: Vec<InstalledExtension>) -> Fixture {
    let host = Arc::new(MemoryHost::with_installed(installed));
    let feed = Arc::new(StaticReleaseFeed::release("v1.5.0", RELEASE_URL));
    let sync = Arc::new(MemoryStore::with_entries(sync_entries));
    let local = Arc::new(MemoryStore::new());
    let app = App::with_parts(
        config(),
        sync.clone(),
        local.clone(),
        feed.clone(),
        HostBindings::with_clock(host.clone(), Arc::new(ManualClock::new(1_700_000_000_000))),
    );
    Fixture { app, host, feed, sync, local }
}

fn setup() -> Fixture {
    setup_with(Map::new(), Vec::new())
}

fn message(action: &str) -> RuntimeMessage {
    RuntimeMessage { action: action.to_string() }
}

// ─── Installed event ───

#[tokio::test]
async fn fresh_install_seeds_checks_and_arms_timer() {
    let f = setup();

    let report = f.app.lifecycle.on_installed(&InstallEvent::install()).await;

    assert_eq!(report.migration, MigrationOutcome::Seeded);
    assert_eq!(report.cleanup, None);
    let update = report.update.unwrap();
    assert!(update.update_available);
    assert_eq!(f.feed.request_count(), 1);
    assert!(f.app.lifecycle.is_update_timer_armed());
    assert_eq!(f.host.notification_ids(), vec!["new-install", "manual-update"]);
}

#[tokio::test]
async fn update_migrates_then_removes_previous_copy() {
    let f = setup_with(
        match json!({"ipType": "custom", "addresses": ["10.0.0.3"], "settingsVersion": "1.0"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        },
        vec![
            InstalledExtension::new("self", "Px2 Connect", "1.4.0"),
            InstalledExtension::new("old-copy", "Px2 Connect", "1.3.0"),
        ],
    );

    let report = f.app.lifecycle.on_installed(&InstallEvent::update("1.3.0")).await;

    assert_eq!(report.migration, MigrationOutcome::Merged);
    assert_eq!(report.cleanup.unwrap().removed, vec!["old-copy".to_string()]);
    assert_eq!(f.host.uninstalled(), vec!["old-copy".to_string()]);
    let settings = f.app.settings_engine.load().await;
    assert_eq!(settings.ip_type, IpType::Custom);
    assert!(f.local.snapshot().contains_key(BACKUP_KEY));
}

#[tokio::test]
async fn host_update_skips_check_but_arms_timer() {
    let f = setup();
    let event = InstallEvent { reason: InstallReason::HostUpdate, previous_version: None };

    let report = f.app.lifecycle.on_installed(&event).await;

    assert_eq!(report.update, None);
    assert_eq!(f.feed.request_count(), 0);
    assert!(f.app.lifecycle.is_update_timer_armed());
}

#[tokio::test(start_paused = true)]
async fn recurring_check_runs_every_interval() {
    let f = setup();
    f.app.lifecycle.on_installed(&InstallEvent::install()).await;
    assert_eq!(f.feed.request_count(), 1);

    tokio::time::sleep(Duration::from_secs(6 * 3600 + 1)).await;
    assert_eq!(f.feed.request_count(), 2);

    tokio::time::sleep(Duration::from_secs(6 * 3600)).await;
    assert_eq!(f.feed.request_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn reinstall_event_rearms_single_timer() {
    let f = setup();
    f.app.lifecycle.on_installed(&InstallEvent::install()).await;
    f.app.lifecycle.on_installed(&InstallEvent::update("1.3.0")).await;
    assert_eq!(f.feed.request_count(), 2);

    tokio::time::sleep(Duration::from_secs(6 * 3600 + 1)).await;
    assert_eq!(f.feed.request_count(), 3);
}

// ─── Messages and alarms ───

#[tokio::test]
async fn check_message_is_acknowledged_and_runs() {
    let f = setup();

    let response = f.app.lifecycle.handle_message(&message("checkForUpdates"));
    assert_eq!(response.status, "checking");

    while f.feed.request_count() == 0 {
        tokio::task::yield_now().await;
    }
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(f.sync.snapshot()["updateAvailable"], json!(true));
}

#[tokio::test]
async fn unknown_message_is_rejected() {
    let f = setup();
    let response = f.app.lifecycle.handle_message(&message("reboot"));
    assert_eq!(response.status, "unknown_action");
    tokio::task::yield_now().await;
    assert_eq!(f.feed.request_count(), 0);
}

#[tokio::test]
async fn alarm_runs_check_only_for_update_alarm() {
    let f = setup();

    assert!(f.app.lifecycle.on_alarm("something-else").await.is_none());
    assert_eq!(f.feed.request_count(), 0);

    let info = f.app.lifecycle.on_alarm(UPDATE_CHECK_ALARM).await.unwrap();
    assert_eq!(info.latest_version.as_deref(), Some("1.5.0"));
    assert_eq!(f.feed.request_count(), 1);
}

// ─── Notification clicks ───

#[tokio::test]
async fn clicking_update_notification_opens_release_page() {
    let f = setup();
    f.app.lifecycle.check_now().await;

    let action = f.app.lifecycle.on_notification_clicked("manual-update").await;
    assert_eq!(action, Some(NavigationAction::OpenUrl(RELEASE_URL.to_string())));

    assert_eq!(f.app.lifecycle.on_button_clicked("manual-update", 1).await, None);
    assert_eq!(f.host.navigations().len(), 1);
}

#[tokio::test]
async fn new_install_button_opens_options() {
    let f = setup();
    f.app.lifecycle.on_installed(&InstallEvent::install()).await;

    let action = f.app.lifecycle.on_button_clicked("new-install", 0).await;
    assert_eq!(action, Some(NavigationAction::OpenOptionsPage));
}
