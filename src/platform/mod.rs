// Px2 Connect platform abstraction
// Provides platform-specific config and data paths for Windows, macOS, and Linux.
//
// Uses `cfg(target_os)` for conditional compilation to select the correct
// platform-specific implementation at compile time.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Returns the platform-specific configuration directory.
///
/// - **Linux**: `~/.config/px2connect` (or `$XDG_CONFIG_HOME/px2connect`)
/// - **macOS**: `~/Library/Application Support/Px2Connect`
/// - **Windows**: `%APPDATA%/Px2Connect`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the platform-specific data directory holding both stores.
///
/// - **Linux**: `~/.local/share/px2connect` (or `$XDG_DATA_HOME/px2connect`)
/// - **macOS**: `~/Library/Application Support/Px2Connect/data`
/// - **Windows**: `%LOCALAPPDATA%/Px2Connect`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}
