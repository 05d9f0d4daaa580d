use serde::{Deserialize, Serialize};

/// An installed extension as reported by the host management surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstalledExtension {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl InstalledExtension {
    pub fn new(id: &str, name: &str, version: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            enabled: true,
        }
    }
}

/// Outcome of removing superseded installations.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CleanupReport {
    /// Ids that were uninstalled.
    pub removed: Vec<String>,
    /// Ids whose uninstall failed, with the host's message.
    pub failed: Vec<(String, String)>,
}
