// Px2 Connect platform paths for Linux
// Config: ~/.config/px2connect
// Data:   ~/.local/share/px2connect

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Uses `$XDG_CONFIG_HOME/px2connect` if set, otherwise `~/.config/px2connect`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("px2connect"),
        _ => home_dir().join(".config").join("px2connect"),
    }
}

/// Uses `$XDG_DATA_HOME/px2connect` if set, otherwise `~/.local/share/px2connect`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("px2connect"),
        _ => home_dir().join(".local").join("share").join("px2connect"),
    }
}
