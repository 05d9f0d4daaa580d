// Px2 Connect platform paths for Windows
// Config: %APPDATA%/Px2Connect
// Data:   %LOCALAPPDATA%/Px2Connect

use std::env;
use std::path::PathBuf;

/// `%APPDATA%/Px2Connect`
pub fn get_config_dir() -> PathBuf {
    let appdata =
        env::var("APPDATA").unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join("Px2Connect")
}

/// `%LOCALAPPDATA%/Px2Connect`
pub fn get_data_dir() -> PathBuf {
    let local_appdata = env::var("LOCALAPPDATA")
        .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Local"));
    PathBuf::from(local_appdata).join("Px2Connect")
}
