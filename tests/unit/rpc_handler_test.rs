//! Unit tests for the RPC handler: all JSON-RPC methods dispatched by `handle_method`.
//!
//! These tests exercise every RPC method through the same code path used by the
//! real `px2connect-host` binary, over in-memory stores and host.

use std::sync::Arc;

use px2connect::app::{App, HostBindings};
use px2connect::config::LifecycleConfig;
use px2connect::host::memory::MemoryHost;
use px2connect::rpc_handler::handle_method;
use px2connect::services::release_feed::StaticReleaseFeed;
use px2connect::storage::MemoryStore;
use serde_json::{json, Value};

const RELEASE_URL: &str = "https://github.com/jphermans/Px2Connect_browser_extension/releases/tag/v9.0.0";

/// Create a fresh App over in-memory stores.
fn setup() -> (App, Arc<MemoryHost>) {
    let host = Arc::new(MemoryHost::new());
    let app = App::with_parts(
        LifecycleConfig { extension_version: "1.0.0".to_string(), ..LifecycleConfig::default() },
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
        Arc::new(StaticReleaseFeed::release("v9.0.0", RELEASE_URL)),
        HostBindings::from_host(host.clone()),
    );
    (app, host)
}

async fn call(app: &App, method: &str, params: Value) -> Result<Value, String> {
    handle_method(app, method, &params).await
}

// ─── Unknown method ───

#[tokio::test]
async fn test_unknown_method_returns_error() {
    let (app, _host) = setup();
    let result = call(&app, "bookmark.add", json!({})).await;
    assert_eq!(result, Err("unknown method: bookmark.add".to_string()));
}

// ─── Lifecycle ───

#[tokio::test]
async fn test_lifecycle_installed_install() {
    let (app, host) = setup();

    let result = call(&app, "lifecycle.installed", json!({"reason": "install"})).await.unwrap();

    assert_eq!(result["migration"], json!("seeded"));
    assert_eq!(result["update"]["updateAvailable"], json!(true));
    assert!(result.get("cleanup").is_none());
    assert!(host.notification_ids().contains(&"new-install".to_string()));
}

#[tokio::test]
async fn test_lifecycle_installed_accepts_chrome_update_reason() {
    let (app, _host) = setup();

    let result = call(&app, "lifecycle.installed", json!({"reason": "chrome_update"})).await.unwrap();

    assert_eq!(result["migration"], json!("seeded"));
    assert!(result.get("update").is_none());
}

#[tokio::test]
async fn test_lifecycle_installed_update_reports_cleanup() {
    let (app, _host) = setup();

    let result = call(
        &app,
        "lifecycle.installed",
        json!({"reason": "update", "previousVersion": "0.9.0"}),
    )
    .await
    .unwrap();

    assert_eq!(result["cleanup"], json!({"removed": [], "failed": []}));
}

#[tokio::test]
async fn test_lifecycle_installed_invalid_reason() {
    let (app, _host) = setup();
    let result = call(&app, "lifecycle.installed", json!({"reason": "sideload"})).await;
    assert!(result.unwrap_err().starts_with("invalid install event"));
}

// ─── Runtime messages ───

#[tokio::test]
async fn test_runtime_message_check_for_updates() {
    let (app, _host) = setup();
    let result = call(&app, "runtime.message", json!({"action": "checkForUpdates"})).await;
    assert_eq!(result, Ok(json!({"status": "checking"})));
}

#[tokio::test]
async fn test_runtime_message_unknown_action() {
    let (app, _host) = setup();
    let result = call(&app, "runtime.message", json!({"action": "selfDestruct"})).await;
    assert_eq!(result, Ok(json!({"status": "unknown_action"})));
}

// ─── Alarms ───

#[tokio::test]
async fn test_alarm_fire() {
    let (app, _host) = setup();

    let handled = call(&app, "alarm.fire", json!({"name": "update-check"})).await.unwrap();
    assert_eq!(handled["handled"], json!(true));
    assert_eq!(handled["update"]["latestVersion"], json!("9.0.0"));

    let ignored = call(&app, "alarm.fire", json!({"name": "other"})).await.unwrap();
    assert_eq!(ignored, json!({"handled": false, "update": null}));
}

#[tokio::test]
async fn test_alarm_fire_missing_name() {
    let (app, _host) = setup();
    assert_eq!(call(&app, "alarm.fire", json!({})).await, Err("missing name".to_string()));
}

// ─── Notifications ───

#[tokio::test]
async fn test_notification_clicked_routes_to_release() {
    let (app, _host) = setup();
    call(&app, "alarm.fire", json!({"name": "update-check"})).await.unwrap();

    let result = call(&app, "notification.clicked", json!({"id": "manual-update"})).await.unwrap();
    assert_eq!(result, json!({"action": {"type": "open_url", "url": RELEASE_URL}}));
}

#[tokio::test]
async fn test_notification_button_clicked() {
    let (app, host) = setup();

    let first = call(
        &app,
        "notification.button_clicked",
        json!({"id": "settings-restored", "buttonIndex": 0}),
    )
    .await
    .unwrap();
    assert_eq!(first, json!({"action": {"type": "open_extensions_page"}}));

    let second = call(
        &app,
        "notification.button_clicked",
        json!({"id": "settings-restored", "buttonIndex": 1}),
    )
    .await
    .unwrap();
    assert_eq!(second, json!({"action": null}));
    assert_eq!(host.navigations().len(), 1);
}

#[tokio::test]
async fn test_notification_button_clicked_missing_index() {
    let (app, _host) = setup();
    let result = call(&app, "notification.button_clicked", json!({"id": "new-install"})).await;
    assert_eq!(result, Err("missing buttonIndex".to_string()));
}

// ─── Settings ───

#[tokio::test]
async fn test_settings_get_defaults() {
    let (app, _host) = setup();
    let result = call(&app, "settings.get", json!({})).await.unwrap();
    assert_eq!(
        result,
        json!({
            "ipType": "default",
            "theme": "flatdark",
            "addresses": [],
            "addressType": "ip",
            "settingsVersion": "1.0"
        })
    );
}

#[tokio::test]
async fn test_settings_save_and_get() {
    let (app, _host) = setup();

    let saved = call(
        &app,
        "settings.save",
        json!({"ipType": "custom", "addresses": ["192.168.1.50"], "theme": "flatlight"}),
    )
    .await
    .unwrap();
    assert_eq!(saved["success"], json!(true));

    let loaded = call(&app, "settings.get", json!({})).await.unwrap();
    assert_eq!(loaded["ipType"], json!("custom"));
    assert_eq!(loaded["addresses"], json!(["192.168.1.50"]));
    assert_eq!(loaded["theme"], json!("flatlight"));
}

#[tokio::test]
async fn test_settings_save_validation_errors() {
    let (app, _host) = setup();

    let result = call(
        &app,
        "settings.save",
        json!({"ipType": "custom", "addresses": ["999.1.1.1"], "theme": "neon"}),
    )
    .await
    .unwrap();

    assert_eq!(
        result,
        json!({
            "success": false,
            "errors": ["Invalid IP address: 999.1.1.1", "Invalid theme selected"]
        })
    );
}

#[tokio::test]
async fn test_settings_save_wrong_type() {
    let (app, _host) = setup();
    let result = call(&app, "settings.save", json!({"addresses": "10.0.0.1"})).await;
    assert!(result.unwrap_err().starts_with("invalid settings"));
}

// ─── Updates ───

#[tokio::test]
async fn test_update_info_before_and_after_check() {
    let (app, _host) = setup();

    let before = call(&app, "update.info", json!({})).await.unwrap();
    assert_eq!(before, json!({"updateAvailable": false, "lastUpdateCheck": 0}));

    call(&app, "alarm.fire", json!({"name": "update-check"})).await.unwrap();
    let after = call(&app, "update.info", json!({})).await.unwrap();
    assert_eq!(after["updateAvailable"], json!(true));
    assert_eq!(after["updateUrl"], json!(RELEASE_URL));
}
