use std::fmt;

// === StoreError ===

/// Errors raised by the synchronized settings store or the local backup store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Reading keys from the store failed.
    ReadFailed(String),
    /// Writing keys to the store failed.
    WriteFailed(String),
    /// A stored value could not be encoded or decoded.
    SerializationError(String),
    /// The underlying database reported an error.
    DatabaseError(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::ReadFailed(msg) => write!(f, "Store read failed: {}", msg),
            StoreError::WriteFailed(msg) => write!(f, "Store write failed: {}", msg),
            StoreError::SerializationError(msg) => {
                write!(f, "Store serialization error: {}", msg)
            }
            StoreError::DatabaseError(msg) => write!(f, "Store database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerializationError(err.to_string())
    }
}

// === UpdateError ===

/// Errors raised while checking the release feed.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateError {
    /// The request could not be sent or the connection dropped.
    NetworkError(String),
    /// The feed answered with a non-success HTTP status.
    HttpStatus(u16),
    /// The feed answered, but the body is missing required fields.
    MalformedData(String),
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateError::NetworkError(msg) => write!(f, "Update check network error: {}", msg),
            UpdateError::HttpStatus(status) => {
                write!(f, "Failed to check for updates: HTTP status {}", status)
            }
            UpdateError::MalformedData(msg) => write!(f, "Malformed release data: {}", msg),
        }
    }
}

impl std::error::Error for UpdateError {}

impl From<reqwest::Error> for UpdateError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => UpdateError::HttpStatus(status.as_u16()),
            None => UpdateError::NetworkError(err.to_string()),
        }
    }
}

// === CleanupError ===

/// Errors raised by the host extension-management surface.
#[derive(Debug, Clone, PartialEq)]
pub enum CleanupError {
    /// Enumerating installed extensions failed.
    ListFailed(String),
    /// Uninstalling the extension with the given id failed.
    UninstallFailed { id: String, message: String },
}

impl fmt::Display for CleanupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupError::ListFailed(msg) => {
                write!(f, "Failed to list installed extensions: {}", msg)
            }
            CleanupError::UninstallFailed { id, message } => {
                write!(f, "Failed to uninstall extension {}: {}", id, message)
            }
        }
    }
}

impl std::error::Error for CleanupError {}

// === NotificationError ===

/// Errors raised by the host notification and navigation surfaces.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationError {
    /// Creating the notification with the given id failed.
    CreateFailed { id: String, message: String },
    /// Opening a tab or host page failed.
    NavigationFailed(String),
}

impl fmt::Display for NotificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationError::CreateFailed { id, message } => {
                write!(f, "Failed to create notification {}: {}", id, message)
            }
            NotificationError::NavigationFailed(msg) => write!(f, "Navigation failed: {}", msg),
        }
    }
}

impl std::error::Error for NotificationError {}

// === SettingsError ===

/// Errors returned when saving user settings.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// The submitted settings failed validation; one message per problem.
    Invalid(Vec<String>),
    /// The settings store rejected the write.
    Store(StoreError),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Invalid(errors) => write!(f, "Invalid settings: {}", errors.join("; ")),
            SettingsError::Store(err) => write!(f, "Failed to save settings: {}", err),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Store(err) => Some(err),
            SettingsError::Invalid(_) => None,
        }
    }
}

impl From<StoreError> for SettingsError {
    fn from(err: StoreError) -> Self {
        SettingsError::Store(err)
    }
}

// === ConfigError ===

/// Errors raised while loading the lifecycle configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// Reading the config file failed.
    IoError(String),
    /// The config file is not valid JSON for `LifecycleConfig`.
    ParseError(String),
    /// A field holds a value that cannot be used.
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "Config I/O error: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
