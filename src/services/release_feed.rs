//! Release feed clients.
//!
//! The feed is a single JSON document describing the latest published release.
//! Only `tag_name` and `html_url` are read.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::types::errors::UpdateError;
use crate::types::update::ReleaseInfo;

/// Source of the latest release description.
#[async_trait]
pub trait ReleaseFeed: Send + Sync {
    async fn fetch_latest(&self) -> Result<ReleaseInfo, UpdateError>;
}

/// Extracts the release fields from a feed document.
pub fn parse_release(body: &Value) -> Result<ReleaseInfo, UpdateError> {
    let field = |name: &str| {
        body.get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| UpdateError::MalformedData(format!("missing '{}' in release feed", name)))
    };

    Ok(ReleaseInfo {
        tag_name: field("tag_name")?,
        html_url: field("html_url")?,
    })
}

/// HTTP client for a GitHub-style `releases/latest` endpoint.
pub struct GitHubReleaseFeed {
    url: String,
    http: reqwest::Client,
}

impl GitHubReleaseFeed {
    pub fn new(url: &str, timeout: Duration, user_agent: &str) -> Result<Self, UpdateError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| UpdateError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { url: url.trim().to_string(), http })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ReleaseFeed for GitHubReleaseFeed {
    async fn fetch_latest(&self) -> Result<ReleaseInfo, UpdateError> {
        tracing::debug!("[Updater] GET {}", self.url);

        let response = self
            .http
            .get(&self.url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| UpdateError::MalformedData(format!("release feed is not JSON: {}", e)))?;
        parse_release(&body)
    }
}

/// Feed that replays queued responses, repeating the last one once the queue
/// is down to a single entry. Counts requests.
#[derive(Default)]
pub struct StaticReleaseFeed {
    responses: Mutex<VecDeque<Result<ReleaseInfo, UpdateError>>>,
    requests: AtomicUsize,
}

impl StaticReleaseFeed {
    pub fn new(response: Result<ReleaseInfo, UpdateError>) -> Self {
        let feed = Self::default();
        feed.push(response);
        feed
    }

    pub fn release(tag_name: &str, html_url: &str) -> Self {
        Self::new(Ok(ReleaseInfo {
            tag_name: tag_name.to_string(),
            html_url: html_url.to_string(),
        }))
    }

    pub fn failing(error: UpdateError) -> Self {
        Self::new(Err(error))
    }

    /// Queues a response after the current ones.
    pub fn push(&self, response: Result<ReleaseInfo, UpdateError>) {
        self.responses.lock().unwrap_or_else(|p| p.into_inner()).push_back(response);
    }

    /// Drops queued responses and answers `response` from now on.
    pub fn replace(&self, response: Result<ReleaseInfo, UpdateError>) {
        let mut responses = self.responses.lock().unwrap_or_else(|p| p.into_inner());
        responses.clear();
        responses.push_back(response);
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReleaseFeed for StaticReleaseFeed {
    async fn fetch_latest(&self) -> Result<ReleaseInfo, UpdateError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap_or_else(|p| p.into_inner());
        let next = if responses.len() > 1 { responses.pop_front() } else { responses.front().cloned() };
        next.unwrap_or_else(|| Err(UpdateError::NetworkError("no release configured".to_string())))
    }
}
