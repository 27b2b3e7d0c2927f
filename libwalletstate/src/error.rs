//! Error types for walletstate

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WalletStateError>;

#[derive(Error, Debug)]
pub enum WalletStateError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl WalletStateError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            WalletStateError::InvalidInput(_) => 3,
            WalletStateError::Dispatch(_) => 2,
            WalletStateError::Config(_) => 1,
            WalletStateError::Storage(_) => 1,
            WalletStateError::Provider(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt entry for key '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("Block subscription failed: {0}")]
    Subscription(String),

    #[error("RPC call failed: {0}")]
    Rpc(String),

    #[error("Network {0} is not supported by this provider")]
    UnsupportedNetwork(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// A transition function panicked; the previous snapshot was kept.
    #[error("Transition panicked while applying {action}: {message}")]
    TransitionPanicked { action: String, message: String },
}
