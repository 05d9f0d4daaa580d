//! SQLite backed store used for the local backup store.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use serde_json::{Map, Value};

use super::KeyValueStore;
use crate::database::Database;
use crate::types::errors::StoreError;

pub struct SqliteStore {
    db: Arc<Database>,
}

impl SqliteStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn decode(key: &str, raw: &str) -> Result<Value, StoreError> {
        serde_json::from_str(raw).map_err(|e| {
            StoreError::SerializationError(format!("Corrupt value for key '{}': {}", key, e))
        })
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare("SELECT value FROM kv_store WHERE key = ?1")?;
        let mut result = Map::new();
        for key in keys {
            let raw: Option<String> = stmt
                .query_row(params![key], |row| row.get(0))
                .optional()?;
            if let Some(raw) = raw {
                result.insert(key.to_string(), Self::decode(key, &raw)?);
            }
        }
        Ok(result)
    }

    async fn get_all(&self) -> Result<Map<String, Value>, StoreError> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare("SELECT key, value FROM kv_store ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut result = Map::new();
        for row in rows {
            let (key, raw) = row?;
            let value = Self::decode(&key, &raw)?;
            result.insert(key, value);
        }
        Ok(result)
    }

    async fn set(&self, items: Map<String, Value>) -> Result<(), StoreError> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as i64;
        let mut conn = self.db.connection();
        let tx = conn.transaction()?;
        for (key, value) in &items {
            let raw = serde_json::to_string(value)?;
            tx.execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, raw, now],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let conn = self.db.connection();
        for key in keys {
            conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        }
        Ok(())
    }
}
