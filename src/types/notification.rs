use serde::{Deserialize, Serialize};

/// Product name shown in notification titles.
pub const PRODUCT_NAME: &str = "Px2 Connect";

/// The notifications this extension raises, keyed by a fixed host id.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotificationKind {
    #[serde(rename = "manual-update")]
    ManualUpdate,
    #[serde(rename = "settings-restored")]
    SettingsRestored,
    #[serde(rename = "new-install")]
    NewInstall,
}

impl NotificationKind {
    pub fn id(&self) -> &'static str {
        match self {
            NotificationKind::ManualUpdate => "manual-update",
            NotificationKind::SettingsRestored => "settings-restored",
            NotificationKind::NewInstall => "new-install",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "manual-update" => Some(NotificationKind::ManualUpdate),
            "settings-restored" => Some(NotificationKind::SettingsRestored),
            "new-install" => Some(NotificationKind::NewInstall),
            _ => None,
        }
    }
}

/// A persistent notification as handed to the host surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub buttons: Vec<String>,
    pub priority: u8,
    pub require_interaction: bool,
}

impl Notification {
    pub fn new(id: &str, title: &str, message: &str, buttons: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            message: message.to_string(),
            buttons: buttons.iter().map(|b| b.to_string()).collect(),
            priority: 2,
            require_interaction: true,
        }
    }

    pub fn manual_update(latest_version: &str) -> Self {
        Self::new(
            NotificationKind::ManualUpdate.id(),
            &format!("{} Update Available", PRODUCT_NAME),
            &format!(
                "Version {} is available!\n\nTo update manually:\n\
                 1. Click to download the new version\n\
                 2. Install the downloaded file\n\
                 3. Remove the old version from the extensions page",
                latest_version
            ),
            &["Download Update", "Later"],
        )
    }

    pub fn settings_restored() -> Self {
        Self::new(
            NotificationKind::SettingsRestored.id(),
            &format!("{} Settings Restored", PRODUCT_NAME),
            &format!(
                "Your previous settings have been restored.\n\n\
                 IMPORTANT: To complete the update process:\n\
                 1. Open the extensions page\n\
                 2. Remove any old versions of {}\n\
                 3. Keep only this new version",
                PRODUCT_NAME
            ),
            &["Open Extensions Page", "Got It"],
        )
    }

    pub fn new_install() -> Self {
        Self::new(
            NotificationKind::NewInstall.id(),
            &format!("{} Installed Successfully", PRODUCT_NAME),
            "The extension has been installed with default settings.\n\n\
             Click to configure your preferences.",
            &["Open Settings", "Got It"],
        )
    }
}

/// Navigation effect triggered by a notification click.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", content = "url", rename_all = "snake_case")]
pub enum NavigationAction {
    /// Open the given URL in a new tab.
    OpenUrl(String),
    /// Open the host's extension-management page.
    OpenExtensionsPage,
    /// Open this extension's options page.
    OpenOptionsPage,
}
