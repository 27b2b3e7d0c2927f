use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use super::{SettingsStorage, StorageKey};
use crate::error::{Result, StorageError};

/// Process-local storage
///
/// Can be switched read-only to exercise the best-effort write paths, or
/// given a write delay to hold creators suspended mid-save.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<StorageKey, Value>>,
    read_only: AtomicBool,
    write_delay: Duration,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage whose writes all fail with `StorageError::Unavailable`
    pub fn read_only() -> Self {
        let storage = Self::new();
        storage.set_read_only(true);
        storage
    }

    /// Sleep for `delay` before every write lands
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = delay;
        self
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory storage is read-only".to_string()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsStorage for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &StorageKey) -> Result<Option<Value>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &StorageKey, value: Value) -> Result<()> {
        if !self.write_delay.is_zero() {
            tokio::time::sleep(self.write_delay).await;
        }
        self.check_writable()?;
        self.entries.lock().await.insert(key.clone(), value);
        Ok(())
    }

    async fn remove(&self, key: &StorageKey) -> Result<()> {
        self.check_writable()?;
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
