use serde::{Deserialize, Serialize};

/// Why the host fired the installed event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InstallReason {
    Install,
    Update,
    #[serde(alias = "chrome_update", alias = "browser_update")]
    HostUpdate,
    SharedModuleUpdate,
}

/// One-shot lifecycle signal delivered by the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstallEvent {
    pub reason: InstallReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_version: Option<String>,
}

impl InstallEvent {
    pub fn install() -> Self {
        Self { reason: InstallReason::Install, previous_version: None }
    }

    pub fn update(previous_version: &str) -> Self {
        Self {
            reason: InstallReason::Update,
            previous_version: Some(previous_version.to_string()),
        }
    }
}

/// What the migration controller did with the settings record.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// Fresh install without a backup: defaults written.
    Seeded,
    /// Fresh install with a backup: settings restored from it.
    Restored,
    /// Update: defaults merged under the existing record.
    Merged,
    /// Nothing to migrate for this reason.
    Unchanged,
    /// Migration failed and the backup was restored instead.
    RecoveredFromBackup,
    /// Migration and backup restore both failed; defaults written.
    FellBackToDefaults,
}

/// Message accepted on the host runtime channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuntimeMessage {
    pub action: String,
}

/// Acknowledgement sent back on the runtime channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub status: String,
}
