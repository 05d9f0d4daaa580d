//! RPC method handler for the Px2 Connect host bridge.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` translates one JSON-RPC call from the browser side into a
//! call on the lifecycle controller or the settings engine.

use serde_json::{json, Value};

use crate::app::App;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::errors::SettingsError;
use crate::types::lifecycle::{InstallEvent, RuntimeMessage};
use crate::types::settings::PartialSettings;

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method(app: &App, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        // ─── Lifecycle ───
        "lifecycle.installed" => {
            let event: InstallEvent = serde_json::from_value(params.clone())
                .map_err(|e| format!("invalid install event: {}", e))?;
            let report = app.lifecycle.on_installed(&event).await;
            serde_json::to_value(report).map_err(|e| e.to_string())
        }
        "runtime.message" => {
            let message: RuntimeMessage = serde_json::from_value(params.clone())
                .map_err(|e| format!("invalid message: {}", e))?;
            let response = app.lifecycle.handle_message(&message);
            serde_json::to_value(response).map_err(|e| e.to_string())
        }
        "alarm.fire" => {
            let name = str_param(params, "name")?;
            let update = app.lifecycle.on_alarm(name).await;
            Ok(json!({"handled": update.is_some(), "update": update}))
        }

        // ─── Notifications ───
        "notification.clicked" => {
            let id = str_param(params, "id")?;
            let action = app.lifecycle.on_notification_clicked(id).await;
            Ok(json!({"action": action}))
        }
        "notification.button_clicked" => {
            let id = str_param(params, "id")?;
            let button = params
                .get("buttonIndex")
                .and_then(|v| v.as_u64())
                .ok_or("missing buttonIndex")? as usize;
            let action = app.lifecycle.on_button_clicked(id, button).await;
            Ok(json!({"action": action}))
        }

        // ─── Settings ───
        "settings.get" => {
            let settings = app.settings_engine.load().await;
            serde_json::to_value(settings).map_err(|e| e.to_string())
        }
        "settings.save" => {
            let changes: PartialSettings = serde_json::from_value(params.clone())
                .map_err(|e| format!("invalid settings: {}", e))?;
            match app.settings_engine.save(&changes).await {
                Ok(saved) => Ok(json!({"success": true, "settings": saved})),
                Err(SettingsError::Invalid(errors)) => Ok(json!({"success": false, "errors": errors})),
                Err(e) => {
                    tracing::error!("[Settings] {}", e);
                    Ok(json!({
                        "success": false,
                        "errors": ["Failed to save settings. Please try again."]
                    }))
                }
            }
        }

        // ─── Updates ───
        "update.info" => {
            let info = app
                .lifecycle
                .checker()
                .stored_info()
                .await
                .map_err(|e| e.to_string())?;
            serde_json::to_value(info).map_err(|e| e.to_string())
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
