//! Walletstate - observable application state for a mobile crypto wallet
//!
//! This library provides the single state store a wallet front end reads
//! from: a tree of per-concern containers, a reducer per container, a store
//! that publishes new snapshots to subscribers, and the action creators that
//! persist preferences and caches through a pluggable storage backend.

pub mod config;
pub mod error;
pub mod logging;
pub mod provider;
pub mod service;
pub mod state;
pub mod storage;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, WalletStateError};
pub use service::WalletStateService;
pub use state::AppState;
pub use store::{Action, Reduce, Store, Subscription};
