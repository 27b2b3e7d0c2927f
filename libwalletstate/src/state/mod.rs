//! State containers and the composite application snapshot
//!
//! Each container is a small record with a pure [`Reduce`] impl that
//! recognizes only its own actions. [`AppState`] holds one `Arc` per
//! container and routes every action through all of them.

pub mod data;
pub mod explorer;
pub mod hidden_coins;
pub mod image_metadata;
pub mod initial_fetch;
pub mod keyboard;
pub mod modal;
pub mod nonces;
pub mod readiness;
pub mod settings;
pub mod swipe;
pub mod walletconnect;
pub mod wallets;

pub use data::DataState;
pub use explorer::ExplorerState;
pub use hidden_coins::HiddenCoinsState;
pub use image_metadata::ImageMetadataState;
pub use initial_fetch::FetchStage;
pub use keyboard::KeyboardState;
pub use modal::ModalState;
pub use nonces::NonceState;
pub use readiness::ReadinessState;
pub use settings::SettingsState;
pub use swipe::SwipeState;
pub use walletconnect::WalletConnectState;
pub use wallets::WalletsState;

use serde::Serialize;
use std::sync::Arc;

use crate::config::DefaultsConfig;
use crate::store::{step, Action, Reduce};

/// Composite snapshot, one slot per concern
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppState {
    pub settings: Arc<SettingsState>,
    pub wallets: Arc<WalletsState>,
    /// Superseded by per-asset visibility, still read by the asset list
    pub hidden_coins: Arc<HiddenCoinsState>,
    pub keyboard: Arc<KeyboardState>,
    pub modal: Arc<ModalState>,
    pub swipe: Arc<SwipeState>,
    pub readiness: Arc<ReadinessState>,
    pub image_metadata: Arc<ImageMetadataState>,
    pub walletconnect: Arc<WalletConnectState>,
    pub nonces: Arc<NonceState>,
    pub initial_fetch: Arc<FetchStage>,
    pub data: Arc<DataState>,
    pub explorer: Arc<ExplorerState>,
}

impl AppState {
    pub const SLOTS: [&'static str; 13] = [
        "settings",
        "wallets",
        "hidden_coins",
        "keyboard",
        "modal",
        "swipe",
        "readiness",
        "image_metadata",
        "walletconnect",
        "nonces",
        "initial_fetch",
        "data",
        "explorer",
    ];

    /// Initial snapshot with settings seeded from configuration defaults
    pub fn from_defaults(defaults: &DefaultsConfig) -> Self {
        Self {
            settings: Arc::new(SettingsState::from_defaults(defaults)),
            ..Self::default()
        }
    }

    /// Slots whose `Arc` differs between `prev` and `next`
    pub fn changed_slots(prev: &AppState, next: &AppState) -> Vec<&'static str> {
        let same = [
            Arc::ptr_eq(&prev.settings, &next.settings),
            Arc::ptr_eq(&prev.wallets, &next.wallets),
            Arc::ptr_eq(&prev.hidden_coins, &next.hidden_coins),
            Arc::ptr_eq(&prev.keyboard, &next.keyboard),
            Arc::ptr_eq(&prev.modal, &next.modal),
            Arc::ptr_eq(&prev.swipe, &next.swipe),
            Arc::ptr_eq(&prev.readiness, &next.readiness),
            Arc::ptr_eq(&prev.image_metadata, &next.image_metadata),
            Arc::ptr_eq(&prev.walletconnect, &next.walletconnect),
            Arc::ptr_eq(&prev.nonces, &next.nonces),
            Arc::ptr_eq(&prev.initial_fetch, &next.initial_fetch),
            Arc::ptr_eq(&prev.data, &next.data),
            Arc::ptr_eq(&prev.explorer, &next.explorer),
        ];
        Self::SLOTS
            .iter()
            .zip(same)
            .filter(|(_, same)| !same)
            .map(|(name, _)| *name)
            .collect()
    }
}

impl Reduce for AppState {
    type Action = Action;

    fn reduce(&self, action: &Action) -> Option<Self> {
        let next = AppState {
            settings: step(&self.settings, action),
            wallets: step(&self.wallets, action),
            hidden_coins: step(&self.hidden_coins, action),
            keyboard: step(&self.keyboard, action),
            modal: step(&self.modal, action),
            swipe: step(&self.swipe, action),
            readiness: step(&self.readiness, action),
            image_metadata: step(&self.image_metadata, action),
            walletconnect: step(&self.walletconnect, action),
            nonces: step(&self.nonces, action),
            initial_fetch: step(&self.initial_fetch, action),
            data: step(&self.data, action),
            explorer: step(&self.explorer, action),
        };

        if Self::changed_slots(self, &next).is_empty() {
            None
        } else {
            Some(next)
        }
    }

    fn changed_parts(prev: &Self, next: &Self) -> Vec<&'static str> {
        Self::changed_slots(prev, next)
    }
}
