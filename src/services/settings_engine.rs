// Px2 Connect Settings Engine
// Loads, validates and saves the user settings record held in the synchronized store.
// The record is stored as top-level keys next to the update record.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;

use crate::storage::KeyValueStore;
use crate::types::errors::{SettingsError, StoreError};
use crate::types::settings::{keys, AddressType, IpType, PartialSettings, SettingsRecord, THEMES};

/// Trait defining the settings engine interface.
#[async_trait]
pub trait SettingsEngineTrait: Send + Sync {
    async fn load(&self) -> SettingsRecord;
    async fn save(&self, changes: &PartialSettings) -> Result<SettingsRecord, SettingsError>;
    async fn reset(&self) -> Result<SettingsRecord, SettingsError>;
}

/// Settings engine over a [`KeyValueStore`].
pub struct SettingsEngine {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsEngine {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Reads whatever settings keys are present, without filling defaults.
    pub async fn read_raw(&self) -> Result<PartialSettings, StoreError> {
        let map = self.store.get(keys::ALL).await?;
        Ok(PartialSettings::from_map(&map))
    }

    /// Writes a full record. The schema tag is stamped and the address list
    /// truncated before anything reaches the store.
    pub async fn write(&self, record: &SettingsRecord) -> Result<SettingsRecord, StoreError> {
        let record = record.normalized();
        self.store.set(record.to_map()).await?;
        Ok(record)
    }
}

#[async_trait]
impl SettingsEngineTrait for SettingsEngine {
    /// Returns the stored settings over the defaults. A read failure yields the defaults.
    async fn load(&self) -> SettingsRecord {
        match self.read_raw().await {
            Ok(stored) => stored.with_defaults(),
            Err(e) => {
                tracing::error!("[Settings] Error loading settings: {}", e);
                SettingsRecord::default()
            }
        }
    }

    /// Validates `changes` against the current record and persists
    /// defaults ← current ← changes.
    async fn save(&self, changes: &PartialSettings) -> Result<SettingsRecord, SettingsError> {
        let current = self.read_raw().await?.with_defaults();
        let candidate = changes.overlay(&current);

        let errors = validate_settings(&candidate);
        if !errors.is_empty() {
            return Err(SettingsError::Invalid(errors));
        }

        let saved = self.write(&candidate).await?;
        tracing::info!("[Settings] Settings saved");
        Ok(saved)
    }

    async fn reset(&self) -> Result<SettingsRecord, SettingsError> {
        Ok(self.write(&SettingsRecord::default()).await?)
    }
}

/// Returns one message per problem with `settings`; empty when valid.
pub fn validate_settings(settings: &SettingsRecord) -> Vec<String> {
    let mut errors = Vec::new();

    if settings.ip_type == IpType::Custom {
        if settings.addresses.is_empty() {
            errors.push("At least one custom address is required in custom mode".to_string());
        }
        for (index, address) in settings.addresses.iter().enumerate() {
            if address.is_empty() {
                errors.push(format!("Address {} cannot be empty", index + 1));
            } else if settings.address_type == AddressType::Ip && !is_valid_ip(address) {
                errors.push(format!("Invalid IP address: {}", address));
            } else if settings.address_type == AddressType::Hostname && !is_valid_hostname(address) {
                errors.push(format!("Invalid hostname: {}", address));
            }
        }
    }

    if !THEMES.contains(&settings.theme.as_str()) {
        errors.push("Invalid theme selected".to_string());
    }

    errors
}

/// Dotted-quad IPv4 check; each octet must be 0..=255.
pub fn is_valid_ip(ip: &str) -> bool {
    static IPV4: OnceLock<Option<Regex>> = OnceLock::new();
    let matches = IPV4
        .get_or_init(|| Regex::new(r"^(\d{1,3}\.){3}\d{1,3}$").ok())
        .as_ref()
        .map_or(false, |re| re.is_match(ip));

    matches && ip.split('.').all(|octet| octet.parse::<u16>().map_or(false, |n| n <= 255))
}

/// RFC 1123 style hostname check: dot-separated labels of 1 to 63
/// alphanumerics or hyphens, not starting or ending with a hyphen.
pub fn is_valid_hostname(hostname: &str) -> bool {
    static HOSTNAME: OnceLock<Option<Regex>> = OnceLock::new();
    HOSTNAME
        .get_or_init(|| {
            Regex::new(
                r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
            )
            .ok()
        })
        .as_ref()
        .map_or(false, |re| re.is_match(hostname))
}
