//! Px2 Connect host bridge: JSON-RPC over stdin/stdout for the browser side.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"lifecycle.installed", "params":{"reason":"update","previousVersion":"1.0.0"}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Host effects are written as {"event":"...", ...} lines on the same stream.
//! Logs go to stderr.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use px2connect::app::{App, HostBindings};
use px2connect::config::LifecycleConfig;
use px2connect::host::stdio::{EventSink, StdioHost};
use px2connect::rpc_handler::handle_method;
use px2connect::types::extension::InstalledExtension;

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        let elapsed = self.window_start.elapsed();
        if elapsed.as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn emit(sink: &EventSink, value: &Value) {
    if let Err(e) = sink.emit(value) {
        tracing::error!("[Bridge] Failed to write to stdout: {}", e);
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match LifecycleConfig::load_default() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("[Bridge] {}", e);
            std::process::exit(1);
        }
    };

    let sink = Arc::new(EventSink::new());
    let host = Arc::new(StdioHost::new(sink.clone()));
    let app = match App::open(config, HostBindings::from_host(host.clone())) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("[Bridge] Failed to initialize: {}", e);
            std::process::exit(1);
        }
    };

    // Signal ready
    emit(&sink, &json!({"event": "ready", "version": app.config.extension_version}));

    let mut rate_limiter = RateLimiter::new(200);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("[Bridge] stdin: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                emit(&sink, &json!({"id": null, "error": format!("parse error: {}", e)}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            emit(&sink, &json!({"id": id, "error": "rate limit exceeded"}));
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        // The browser reports its installed extensions alongside the installed event.
        if let Some(installed) = params.get("installed") {
            match serde_json::from_value::<Vec<InstalledExtension>>(installed.clone()) {
                Ok(list) => host.set_installed(list),
                Err(e) => tracing::warn!("[Bridge] Ignoring malformed installed list: {}", e),
            }
        }

        let response = match handle_method(&app, method, &params).await {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        emit(&sink, &response);
    }

    tracing::info!("[Bridge] stdin closed, shutting down");
}
