//! Key/value stores used by the lifecycle services.
//!
//! The host offers two independent stores: a synchronized store holding the
//! settings and update records as top-level keys, and a local store holding
//! the backup snapshot. Neither offers transactions across the two.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::types::errors::StoreError;

pub mod json_file;
pub mod memory;
pub mod sqlite;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Async key/value store with JSON values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the entries for `keys` that exist; absent keys are omitted.
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError>;
    /// Returns every entry in the store.
    async fn get_all(&self) -> Result<Map<String, Value>, StoreError>;
    /// Inserts or overwrites the given entries.
    async fn set(&self, items: Map<String, Value>) -> Result<(), StoreError>;
    /// Removes the given keys; missing keys are ignored.
    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError>;
}
