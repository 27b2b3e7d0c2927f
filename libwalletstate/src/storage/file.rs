//! Single-document JSON file storage
//!
//! The whole key space lives in one JSON object. Every write rewrites the
//! document to a sibling temp file and renames it over the original, so a
//! crash leaves either the old or the new document, never a torn one.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::{SettingsStorage, StorageKey};
use crate::error::{Result, StorageError};

#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    document: Mutex<Map<String, Value>>,
}

impl FileStorage {
    /// Open the document at `path`, starting empty if it does not exist
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Corrupt` if the file exists but is not a JSON
    /// object.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Map::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
                key: path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(StorageError::Io(e).into()),
        };

        tracing::debug!("Opened file storage at {} ({} keys)", path.display(), document.len());
        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, document: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(StorageError::Io)?;
            }
        }

        let encoded = serde_json::to_vec_pretty(document).map_err(|source| StorageError::Encode {
            key: self.path.display().to_string(),
            source,
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, encoded).await.map_err(StorageError::Io)?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(StorageError::Io)?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStorage for FileStorage {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, key: &StorageKey) -> Result<Option<Value>> {
        Ok(self.document.lock().await.get(key.as_str()).cloned())
    }

    async fn set(&self, key: &StorageKey, value: Value) -> Result<()> {
        let mut document = self.document.lock().await;
        let previous = document.insert(key.as_str().to_string(), value);

        if let Err(e) = self.persist(&document).await {
            // keep memory and disk in agreement
            match previous {
                Some(previous) => document.insert(key.as_str().to_string(), previous),
                None => document.remove(key.as_str()),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn remove(&self, key: &StorageKey) -> Result<()> {
        let mut document = self.document.lock().await;
        let Some(previous) = document.remove(key.as_str()) else {
            return Ok(());
        };

        if let Err(e) = self.persist(&document).await {
            document.insert(key.as_str().to_string(), previous);
            return Err(e);
        }
        Ok(())
    }
}
