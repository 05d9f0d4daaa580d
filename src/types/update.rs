use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level keys of the update record in the synchronized store.
pub mod keys {
    pub const UPDATE_AVAILABLE: &str = "updateAvailable";
    pub const LATEST_VERSION: &str = "latestVersion";
    pub const UPDATE_URL: &str = "updateUrl";
    pub const LAST_UPDATE_CHECK: &str = "lastUpdateCheck";
    pub const UPDATE_CHECK_ERROR: &str = "updateCheckError";

    pub const ALL: &[&str] = &[
        UPDATE_AVAILABLE,
        LATEST_VERSION,
        UPDATE_URL,
        LAST_UPDATE_CHECK,
        UPDATE_CHECK_ERROR,
    ];
}

/// Result of the most recent release-feed check.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInfo {
    pub update_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_url: Option<String>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub last_update_check: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_check_error: Option<String>,
}

impl UpdateInfo {
    /// Decodes the update keys leniently; absent or mistyped keys read as empty.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let text = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            update_available: map
                .get(keys::UPDATE_AVAILABLE)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            latest_version: text(keys::LATEST_VERSION),
            update_url: text(keys::UPDATE_URL),
            last_update_check: map
                .get(keys::LAST_UPDATE_CHECK)
                .and_then(Value::as_i64)
                .unwrap_or(0),
            update_check_error: text(keys::UPDATE_CHECK_ERROR),
        }
    }

    /// Splits the record into keys to set and keys to remove, so that a write
    /// replaces the stored record wholesale.
    pub fn to_store_ops(&self) -> (Map<String, Value>, Vec<&'static str>) {
        let mut set = Map::new();
        let mut remove = Vec::new();

        set.insert(keys::UPDATE_AVAILABLE.to_string(), Value::Bool(self.update_available));
        set.insert(keys::LAST_UPDATE_CHECK.to_string(), Value::from(self.last_update_check));

        let optional = [
            (keys::LATEST_VERSION, &self.latest_version),
            (keys::UPDATE_URL, &self.update_url),
            (keys::UPDATE_CHECK_ERROR, &self.update_check_error),
        ];
        for (key, value) in optional {
            match value {
                Some(v) => {
                    set.insert(key.to_string(), Value::String(v.clone()));
                }
                None => remove.push(key),
            }
        }

        (set, remove)
    }
}

/// The fields of a release-feed response this crate relies on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReleaseInfo {
    pub tag_name: String,
    pub html_url: String,
}
