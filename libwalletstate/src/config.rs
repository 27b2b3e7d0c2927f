//! Configuration management for walletstate

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::types::{Language, NativeCurrency, Network};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub walletconnect: WalletConnectConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    Memory,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackendKind,
    /// Path of the JSON document used by the file backend
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_polling_interval_ms")]
    pub polling_interval_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            polling_interval_ms: default_polling_interval_ms(),
        }
    }
}

fn default_polling_interval_ms() -> u64 {
    15_000
}

/// Values the settings container starts from before anything is loaded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub native_currency: NativeCurrency,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub app_icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConnectConfig {
    /// Lifetime granted to newly approved sessions, e.g. "7days"
    #[serde(default = "default_session_ttl")]
    pub session_ttl: String,
}

impl Default for WalletConnectConfig {
    fn default() -> Self {
        Self {
            session_ttl: default_session_ttl(),
        }
    }
}

fn default_session_ttl() -> String {
    "7days".to_string()
}

impl WalletConnectConfig {
    pub fn session_ttl(&self) -> Result<Duration> {
        humantime::parse_duration(&self.session_ttl).map_err(|e| {
            ConfigError::InvalidValue {
                field: "walletconnect.session_ttl".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration, falling back to defaults when no file exists
    pub fn load_or_default() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default_config());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            storage: StorageConfig {
                backend: StorageBackendKind::File,
                path: Some("~/.local/share/walletstate/storage.json".to_string()),
            },
            provider: ProviderConfig::default(),
            defaults: DefaultsConfig::default(),
            walletconnect: WalletConnectConfig::default(),
        }
    }

    /// In-memory configuration, used by tests and the replay tool
    pub fn ephemeral() -> Self {
        Self {
            storage: StorageConfig {
                backend: StorageBackendKind::Memory,
                path: None,
            },
            ..Self::default_config()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.storage.backend == StorageBackendKind::File && self.storage.path.is_none() {
            return Err(ConfigError::MissingField("storage.path".to_string()).into());
        }
        self.walletconnect.session_ttl()?;
        Ok(())
    }
}

/// Resolve the configuration file path in the XDG config directory
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("WALLETSTATE_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("walletstate").join("config.toml"))
}

/// Resolve the storage document path, expanding `~`
///
/// Without an explicit path the document lives in the XDG data directory.
pub fn resolve_storage_path(path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = path {
        return Ok(PathBuf::from(shellexpand::tilde(path).to_string()));
    }

    let data_dir = dirs::data_dir()
        .ok_or_else(|| ConfigError::MissingField("data directory".to_string()))?;

    Ok(data_dir.join("walletstate").join("storage.json"))
}
