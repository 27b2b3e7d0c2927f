//! Action creators
//!
//! The service layer is the only code that talks to both the store and the
//! outside world. It follows a facade pattern: [`WalletStateService`] owns the
//! shared resources and hands out one sub-service per concern:
//!
//! - `SettingsService`: account, network and display preferences
//! - `WalletsService`: the wallet list, display names and selection
//! - `HiddenCoinsService`: the deprecated hidden-coin list
//! - `UiService`: keyboard, modal, swipe and readiness events
//! - `ImageMetadataService`: the image dimension cache
//! - `WalletConnectService`: sessions and session requests
//! - `NonceService`: guarded nonce bookkeeping
//! - `DataService`: assets, confirmed and pending transactions, and the
//!   initial-fetch flag
//! - `ExplorerService`: block-event listening
//!
//! Creators that await storage or the provider re-read the snapshot after
//! every await; nothing read before a suspension point is trusted after it.
//!
//! # Example
//!
//! ```no_run
//! use libwalletstate::service::WalletStateService;
//! use libwalletstate::types::Network;
//!
//! # async fn example() -> libwalletstate::Result<()> {
//! let service = WalletStateService::new().await?;
//!
//! let _subscription = service.subscribe(|state| {
//!     println!("keyboard visible: {}", state.keyboard.visible);
//! });
//!
//! service.ui().keyboard_shown(291.0).await?;
//! service.settings().update_network(Network::Goerli.chain_id()).await?;
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod explorer;
pub mod hidden_coins;
pub mod image_metadata;
pub mod nonces;
pub mod settings;
pub mod ui;
pub mod walletconnect;
pub mod wallets;

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use self::data::DataService;
use self::explorer::ExplorerService;
use self::hidden_coins::HiddenCoinsService;
use self::image_metadata::ImageMetadataService;
use self::nonces::NonceService;
use self::settings::SettingsService;
use self::ui::UiService;
use self::walletconnect::WalletConnectService;
use self::wallets::WalletsService;
use crate::provider::{ChainProvider, OfflineProvider};
use crate::state::AppState;
use crate::storage::{self, SettingsStorage};
use crate::store::{Action, Store, Subscription};
use crate::{Config, Result};

/// Main service facade
///
/// All sub-services share the same `Arc<Store<AppState>>`, storage backend,
/// provider and `Arc<Config>`.
pub struct WalletStateService {
    store: Arc<Store<AppState>>,
    storage: Arc<dyn SettingsStorage>,
    settings: SettingsService,
    wallets: WalletsService,
    hidden_coins: HiddenCoinsService,
    ui: UiService,
    image_metadata: ImageMetadataService,
    walletconnect: WalletConnectService,
    nonces: NonceService,
    data: DataService,
    explorer: ExplorerService,
}

impl WalletStateService {
    /// Create a service from the configuration at the default location
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the storage
    /// backend cannot be opened.
    pub async fn new() -> Result<Self> {
        let config = Config::load()?;
        Self::from_config(config).await
    }

    /// Create a service with the configured storage backend and an offline
    /// provider
    pub async fn from_config(config: Config) -> Result<Self> {
        let storage = storage::from_config(&config.storage).await?;
        let provider: Arc<dyn ChainProvider> = Arc::new(OfflineProvider::new(
            Duration::from_millis(config.provider.polling_interval_ms),
        ));
        Ok(Self::from_parts(config, storage, provider))
    }

    /// Assemble a service from explicit collaborators
    pub fn from_parts(
        config: Config,
        storage: Arc<dyn SettingsStorage>,
        provider: Arc<dyn ChainProvider>,
    ) -> Self {
        let store = Arc::new(Store::new(AppState::from_defaults(&config.defaults)));
        let config = Arc::new(config);

        let nonces = NonceService::new(
            Arc::clone(&store),
            Arc::clone(&storage),
            Arc::clone(&provider),
        );
        let settings = SettingsService::new(Arc::clone(&store), Arc::clone(&storage));
        let wallets = WalletsService::new(Arc::clone(&store), Arc::clone(&storage));
        let hidden_coins = HiddenCoinsService::new(Arc::clone(&store), Arc::clone(&storage));
        let ui = UiService::new(Arc::clone(&store), Arc::clone(&storage));
        let image_metadata = ImageMetadataService::new(Arc::clone(&store), Arc::clone(&storage));
        let walletconnect = WalletConnectService::new(
            Arc::clone(&store),
            Arc::clone(&storage),
            Arc::clone(&config),
        );
        let data = DataService::new(Arc::clone(&store), Arc::clone(&storage), nonces.clone());
        let explorer = ExplorerService::new(Arc::clone(&store), provider, Arc::clone(&config));

        Self {
            store,
            storage,
            settings,
            wallets,
            hidden_coins,
            ui,
            image_metadata,
            walletconnect,
            nonces,
            data,
            explorer,
        }
    }

    pub fn settings(&self) -> &SettingsService {
        &self.settings
    }

    pub fn wallets(&self) -> &WalletsService {
        &self.wallets
    }

    pub fn hidden_coins(&self) -> &HiddenCoinsService {
        &self.hidden_coins
    }

    pub fn ui(&self) -> &UiService {
        &self.ui
    }

    pub fn image_metadata(&self) -> &ImageMetadataService {
        &self.image_metadata
    }

    pub fn walletconnect(&self) -> &WalletConnectService {
        &self.walletconnect
    }

    pub fn nonces(&self) -> &NonceService {
        &self.nonces
    }

    pub fn data(&self) -> &DataService {
        &self.data
    }

    pub fn explorer(&self) -> &ExplorerService {
        &self.explorer
    }

    /// The shared store, for consumers that hold it directly
    pub fn store(&self) -> Arc<Store<AppState>> {
        Arc::clone(&self.store)
    }

    pub fn storage(&self) -> Arc<dyn SettingsStorage> {
        Arc::clone(&self.storage)
    }

    pub fn state(&self) -> Arc<AppState> {
        self.store.state()
    }

    /// Dispatch a raw action, bypassing the creators
    pub fn dispatch(&self, action: Action) -> Result<()> {
        self.store.dispatch(action)?;
        Ok(())
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Arc<AppState>) + Send + Sync + 'static,
    {
        self.store.subscribe(listener)
    }

    /// Warm the store from storage the way the app does at launch
    ///
    /// Runs the settings, wallets, image metadata, wallet-connect and nonce
    /// loaders in order. Sessions that expired by `now` are dropped.
    pub async fn hydrate(&self, now: DateTime<Utc>) -> Result<()> {
        self.settings.load_state().await?;
        self.settings.load_network().await?;
        self.settings.load_language().await?;
        self.wallets.load().await?;
        self.image_metadata.load().await?;
        self.walletconnect.load_state(now).await?;
        self.nonces.load().await?;
        tracing::debug!("Hydrated store from {} storage", self.storage.name());
        Ok(())
    }
}
