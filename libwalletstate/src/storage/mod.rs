//! Persistent key-value storage for settings and cached wallet data
//!
//! Storage is a cache: the store is the source of truth, and action creators
//! write through to storage so the next launch starts warm.
//!
//! # Architecture
//!
//! - `SettingsStorage` trait: async get/set/remove of JSON values
//! - `MemoryStorage`: process-local map (tests, replay)
//! - `FileStorage`: one JSON document on disk, replaced atomically on write
//!
//! # Keys
//!
//! Global keys are a bare prefix (`nativeCurrency`). Account-scoped keys are
//! `<prefix>-<lowercase address>-<network>`.
//!
//! # Versioning
//!
//! Values written through [`save`] are wrapped as
//! `{"data": ..., "storageVersion": "<version>"}`. [`load`] treats an entry
//! written under any other version as absent.
//!
//! # Example
//!
//! ```no_run
//! use libwalletstate::storage::{self, keys, versions, MemoryStorage, StorageKey};
//! use libwalletstate::types::NativeCurrency;
//!
//! # async fn example() -> libwalletstate::Result<()> {
//! let storage = MemoryStorage::new();
//! let key = StorageKey::global(keys::NATIVE_CURRENCY);
//!
//! storage::save(&storage, &key, versions::GLOBAL, &NativeCurrency::Eur).await?;
//! let currency: Option<NativeCurrency> = storage::load(&storage, &key, versions::GLOBAL).await?;
//! assert_eq!(currency, Some(NativeCurrency::Eur));
//! # Ok(())
//! # }
//! ```

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::config::{resolve_storage_path, StorageBackendKind, StorageConfig};
use crate::error::{Result, StorageError};
use crate::types::{Address, Network};

/// Key prefixes
pub mod keys {
    pub const NATIVE_CURRENCY: &str = "nativeCurrency";
    pub const TESTNETS_ENABLED: &str = "testnetsEnabled";
    pub const APP_ICON: &str = "appIcon";
    pub const LANGUAGE: &str = "language";
    pub const CHAIN_ID: &str = "chainId";
    pub const IMAGE_METADATA: &str = "imageMetadata";
    pub const WALLETCONNECT_SESSIONS: &str = "walletconnectSessions";
    pub const NONCE_MANAGER: &str = "nonceManager";
    pub const KEYBOARD_HEIGHT: &str = "keyboardHeight";
    pub const ALL_WALLETS: &str = "allWallets";
    pub const SELECTED_WALLET: &str = "selectedWallet";
    pub const WALLET_NAMES: &str = "walletNames";

    // account scoped
    pub const HIDDEN_COINS: &str = "hiddenCoins";
    pub const ACCOUNT_ASSETS_DATA: &str = "accountAssetsData";
    pub const TRANSACTIONS: &str = "transactions";
    pub const PENDING_TRANSACTIONS: &str = "pendingTransactions";
}

/// Format versions per entry kind; bump to invalidate what older builds wrote
pub mod versions {
    pub const GLOBAL: &str = "0.1.0";
    pub const IMAGE_METADATA: &str = "0.1.0";
    pub const WALLETCONNECT: &str = "0.1.0";
    pub const NONCE_MANAGER: &str = "0.0.1";
    pub const HIDDEN_COINS: &str = "0.1.0";
    pub const ACCOUNT_ASSETS_DATA: &str = "0.2.0";
    pub const TRANSACTIONS: &str = "0.3.0";
    pub const PENDING_TRANSACTIONS: &str = "0.1.0";
    pub const WALLETS: &str = "1.0.0";
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn global(prefix: &str) -> Self {
        Self(prefix.to_string())
    }

    pub fn account(prefix: &str, address: &Address, network: Network) -> Self {
        Self(format!("{}-{}-{}", prefix, address.key(), network))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key-value storage backend
///
/// Implementations serialize their own writes; callers may share one
/// instance across tasks.
#[async_trait]
pub trait SettingsStorage: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    async fn get(&self, key: &StorageKey) -> Result<Option<Value>>;

    async fn set(&self, key: &StorageKey, value: Value) -> Result<()>;

    /// Removing a missing key is not an error
    async fn remove(&self, key: &StorageKey) -> Result<()>;
}

/// Read a versioned entry
///
/// # Errors
///
/// Returns `StorageError::Corrupt` if an entry with the expected version
/// does not decode as `T`.
pub async fn load<T: DeserializeOwned>(
    storage: &dyn SettingsStorage,
    key: &StorageKey,
    version: &str,
) -> Result<Option<T>> {
    let Some(mut raw) = storage.get(key).await? else {
        return Ok(None);
    };

    let stored_version = raw.get("storageVersion").and_then(Value::as_str);
    if stored_version != Some(version) {
        tracing::debug!(
            "Ignoring '{}' stored as version {:?}, expected {}",
            key,
            stored_version,
            version
        );
        return Ok(None);
    }

    let data = raw.get_mut("data").map(Value::take).unwrap_or(Value::Null);
    serde_json::from_value(data)
        .map(Some)
        .map_err(|source| {
            StorageError::Corrupt {
                key: key.to_string(),
                source,
            }
            .into()
        })
}

/// Write a versioned entry
pub async fn save<T: Serialize + ?Sized>(
    storage: &dyn SettingsStorage,
    key: &StorageKey,
    version: &str,
    value: &T,
) -> Result<()> {
    let data = serde_json::to_value(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    let envelope = serde_json::json!({
        "data": data,
        "storageVersion": version,
    });
    storage.set(key, envelope).await
}

/// Build the backend named in configuration
pub async fn from_config(config: &StorageConfig) -> Result<Arc<dyn SettingsStorage>> {
    match config.backend {
        StorageBackendKind::Memory => Ok(Arc::new(MemoryStorage::new())),
        StorageBackendKind::File => {
            let path = resolve_storage_path(config.path.as_deref())?;
            Ok(Arc::new(FileStorage::open(path).await?))
        }
    }
}
