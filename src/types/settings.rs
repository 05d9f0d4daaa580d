use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Schema tag stamped on every settings write.
pub const SETTINGS_VERSION: &str = "1.0";
/// Theme used when none is stored.
pub const DEFAULT_THEME: &str = "flatdark";
/// Themes the popup and options pages know how to render.
pub const THEMES: &[&str] = &["flatdark", "flatlight"];
/// The fixed link-local address of the device.
pub const DEFAULT_ADDRESS: &str = "169.254.1.1";
/// Upper bound on stored custom addresses.
pub const MAX_ADDRESSES: usize = 5;

/// Top-level keys of the settings record in the synchronized store.
pub mod keys {
    pub const IP_TYPE: &str = "ipType";
    pub const THEME: &str = "theme";
    pub const ADDRESSES: &str = "addresses";
    pub const ADDRESS_TYPE: &str = "addressType";
    pub const SETTINGS_VERSION: &str = "settingsVersion";

    pub const ALL: &[&str] = &[IP_TYPE, THEME, ADDRESSES, ADDRESS_TYPE, SETTINGS_VERSION];
}

/// Whether the popup opens the built-in address or the user's list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IpType {
    #[default]
    Default,
    Custom,
}

/// How custom addresses are interpreted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    #[default]
    Ip,
    Hostname,
}

/// The user settings record, stored as top-level keys in the synchronized store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    pub ip_type: IpType,
    pub theme: String,
    pub addresses: Vec<String>,
    pub address_type: AddressType,
    pub settings_version: String,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            ip_type: IpType::Default,
            theme: DEFAULT_THEME.to_string(),
            addresses: Vec::new(),
            address_type: AddressType::Ip,
            settings_version: SETTINGS_VERSION.to_string(),
        }
    }
}

impl SettingsRecord {
    /// Returns a copy stamped with the current schema tag and with the
    /// address list clamped to [`MAX_ADDRESSES`].
    pub fn normalized(&self) -> Self {
        let mut record = self.clone();
        record.settings_version = SETTINGS_VERSION.to_string();
        record.addresses.truncate(MAX_ADDRESSES);
        record
    }

    /// Encodes the record as store keys.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// A possibly incomplete settings record, as read back from a store.
///
/// Every field is decoded independently: a missing key or a value of the wrong
/// shape leaves that field empty instead of failing the whole read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartialSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_type: Option<IpType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<AddressType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_version: Option<String>,
}

impl PartialSettings {
    pub fn from_map(map: &Map<String, Value>) -> Self {
        fn field<T: serde::de::DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
            map.get(key)
                .filter(|v| !v.is_null())
                .and_then(|v| serde_json::from_value(v.clone()).ok())
        }

        Self {
            ip_type: field(map, keys::IP_TYPE),
            theme: field::<String>(map, keys::THEME).filter(|t| !t.is_empty()),
            addresses: field(map, keys::ADDRESSES),
            address_type: field(map, keys::ADDRESS_TYPE),
            settings_version: field::<String>(map, keys::SETTINGS_VERSION)
                .filter(|v| !v.is_empty()),
        }
    }

    /// True when no settings key was present.
    pub fn is_empty(&self) -> bool {
        self.ip_type.is_none()
            && self.theme.is_none()
            && self.addresses.is_none()
            && self.address_type.is_none()
            && self.settings_version.is_none()
    }

    /// Lays these values over `base`; present fields win.
    pub fn overlay(&self, base: &SettingsRecord) -> SettingsRecord {
        SettingsRecord {
            ip_type: self.ip_type.unwrap_or(base.ip_type),
            theme: self.theme.clone().unwrap_or_else(|| base.theme.clone()),
            addresses: self.addresses.clone().unwrap_or_else(|| base.addresses.clone()),
            address_type: self.address_type.unwrap_or(base.address_type),
            settings_version: SETTINGS_VERSION.to_string(),
        }
        .normalized()
    }

    /// Fills missing fields from the defaults and stamps the schema tag.
    pub fn with_defaults(&self) -> SettingsRecord {
        self.overlay(&SettingsRecord::default())
    }
}

impl From<&SettingsRecord> for PartialSettings {
    fn from(record: &SettingsRecord) -> Self {
        Self {
            ip_type: Some(record.ip_type),
            theme: Some(record.theme.clone()),
            addresses: Some(record.addresses.clone()),
            address_type: Some(record.address_type),
            settings_version: Some(record.settings_version.clone()),
        }
    }
}

/// Local-store key holding the single backup slot.
pub const BACKUP_KEY: &str = "backupSettings";

/// Single-slot copy of the last known settings, kept in the local store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupSnapshot {
    #[serde(flatten)]
    pub settings: PartialSettings,
    /// Milliseconds since the Unix epoch.
    pub backup_time: i64,
    /// Extension version that was running when the backup was taken.
    pub from_version: String,
}

impl BackupSnapshot {
    /// Decodes a stored snapshot. Returns `None` unless the value is an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            settings: PartialSettings::from_map(map),
            backup_time: map.get("backupTime").and_then(Value::as_i64).unwrap_or(0),
            from_version: map
                .get("fromVersion")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
