// Px2 Connect services
// Version comparison, settings, backup, update checks, cleanup, notifications and the
// lifecycle controller that wires them to host events.

pub mod backup;
pub mod lifecycle_controller;
pub mod notification_dispatcher;
pub mod old_version_cleanup;
pub mod release_feed;
pub mod settings_engine;
pub mod settings_migration;
pub mod update_checker;
pub mod version;
