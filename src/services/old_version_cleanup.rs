//! Removal of superseded installations.
//!
//! Installing a release manually leaves the previous copy installed next to
//! it under a different id. After an update, copies with the same name and the
//! exact previous version are uninstalled.

use std::sync::Arc;

use crate::host::ExtensionManagement;
use crate::types::extension::{CleanupReport, InstalledExtension};

pub struct OldVersionCleanup {
    management: Arc<dyn ExtensionManagement>,
    self_id: String,
    self_name: String,
}

impl OldVersionCleanup {
    pub fn new(management: Arc<dyn ExtensionManagement>, self_id: &str, self_name: &str) -> Self {
        Self {
            management,
            self_id: self_id.to_string(),
            self_name: self_name.to_string(),
        }
    }

    fn is_superseded(&self, extension: &InstalledExtension, previous_version: &str) -> bool {
        extension.name == self.self_name
            && extension.id != self.self_id
            && extension.version == previous_version
    }

    /// Uninstalls every sibling installation at `previous_version`. Each
    /// uninstall is attempted independently; failures end up in the report.
    pub async fn cleanup(&self, previous_version: &str) -> CleanupReport {
        let mut report = CleanupReport::default();

        let installed = match self.management.list_installed().await {
            Ok(list) => list,
            Err(e) => {
                tracing::error!("[Cleanup] {}", e);
                return report;
            }
        };

        for extension in installed.iter().filter(|e| self.is_superseded(e, previous_version)) {
            match self.management.uninstall(&extension.id).await {
                Ok(()) => {
                    tracing::info!("[Cleanup] Removed old version: {}", extension.version);
                    report.removed.push(extension.id.clone());
                }
                Err(e) => {
                    tracing::error!("[Cleanup] {}", e);
                    report.failed.push((extension.id.clone(), e.to_string()));
                }
            }
        }

        report
    }
}
