// Px2 Connect shared type definitions
// Each submodule defines types used across the lifecycle services.

pub mod errors;
pub mod extension;
pub mod lifecycle;
pub mod notification;
pub mod settings;
pub mod update;
