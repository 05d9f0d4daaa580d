// Px2 Connect platform paths for macOS
// Config: ~/Library/Application Support/Px2Connect
// Data:   ~/Library/Application Support/Px2Connect/data

use std::env;
use std::path::PathBuf;

fn app_support_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
        .join("Library")
        .join("Application Support")
        .join("Px2Connect")
}

pub fn get_config_dir() -> PathBuf {
    app_support_dir()
}

pub fn get_data_dir() -> PathBuf {
    app_support_dir().join("data")
}
