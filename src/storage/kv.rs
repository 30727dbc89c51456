//! Key-value persistence backends

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::StoreError;

/// Small persistent key-value store.
///
/// Each call is atomic on its own; nothing is promised across calls.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Values for the requested keys. Missing keys are simply absent.
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError>;

    async fn set(&self, entries: Map<String, Value>) -> Result<(), StoreError>;

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError>;
}

/// Store backed by a single JSON object on disk
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serialises read-modify-write cycles.
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Map<String, Value>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("State file {} does not exist yet", self.path.display());
                return Ok(Map::new());
            }
            Err(e) => return Err(e.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        match serde_json::from_slice::<Value>(&bytes)? {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::Corrupt(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Like `load`, but a file that does not parse is moved aside to
    /// `state.json.corrupt` so writes can start over from an empty record.
    async fn load_for_write(&self) -> Result<Map<String, Value>, StoreError> {
        match self.load().await {
            Err(e @ (StoreError::Json(_) | StoreError::Corrupt(_))) => {
                let aside = self.path.with_extension("json.corrupt");
                warn!(
                    "State file {} is unreadable ({}), moving it to {}",
                    self.path.display(),
                    e,
                    aside.display()
                );
                tokio::fs::rename(&self.path, &aside).await?;
                Ok(Map::new())
            }
            other => other,
        }
    }

    async fn save(&self, map: Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(&Value::Object(map))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut map = self.load().await?;
        Ok(keys
            .iter()
            .filter_map(|key| map.remove(*key).map(|value| (key.to_string(), value)))
            .collect())
    }

    async fn set(&self, entries: Map<String, Value>) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut map = self.load_for_write().await?;
        map.extend(entries);
        self.save(map).await
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut map = self.load_for_write().await?;
        for key in keys {
            map.remove(*key);
        }
        self.save(map).await
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
pub use memory::MemoryStore;
