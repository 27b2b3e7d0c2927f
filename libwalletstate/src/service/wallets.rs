//! Wallet list, display names and selection
//!
//! The wallet list and the selected wallet are written before they are
//! published; a failed write publishes nothing. Secrets never pass through
//! here.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::Result;
use crate::state::AppState;
use crate::storage::{self, keys, versions, SettingsStorage, StorageKey};
use crate::store::{Action, Store};
use crate::types::{Wallet, WalletLoadingState};

#[derive(Clone)]
pub struct WalletsService {
    store: Arc<Store<AppState>>,
    storage: Arc<dyn SettingsStorage>,
}

impl WalletsService {
    pub fn new(store: Arc<Store<AppState>>, storage: Arc<dyn SettingsStorage>) -> Self {
        Self { store, storage }
    }

    /// Load wallets, names and the selection
    ///
    /// Does nothing when no wallet was ever saved. A selection that no longer
    /// exists falls back to the first wallet, then to the wallet owning the
    /// current account. If the current account is not a visible account of
    /// the selected wallet, the first visible one is selected instead.
    pub async fn load(&self) -> Result<()> {
        let wallets: BTreeMap<String, Wallet> = storage::load(
            &*self.storage,
            &StorageKey::global(keys::ALL_WALLETS),
            versions::WALLETS,
        )
        .await?
        .unwrap_or_default();
        if wallets.is_empty() {
            debug!("No wallets saved");
            return Ok(());
        }

        let saved: Option<Wallet> = storage::load(
            &*self.storage,
            &StorageKey::global(keys::SELECTED_WALLET),
            versions::WALLETS,
        )
        .await?;
        let mut selected = match saved {
            Some(wallet) if wallets.contains_key(&wallet.id) => Some(wallet),
            Some(stale) => {
                info!("Selected wallet {} is gone, selecting the first one", stale.id);
                let first = wallets.values().next().cloned();
                if let Some(first) = &first {
                    self.save_selected(first).await?;
                }
                first
            }
            None => None,
        };

        let names: BTreeMap<String, String> = storage::load(
            &*self.storage,
            &StorageKey::global(keys::WALLET_NAMES),
            versions::GLOBAL,
        )
        .await?
        .unwrap_or_default();

        let account = self.store.state().settings.account_address.clone();
        if selected.is_none() {
            selected = wallets.values().find(|w| w.owns(&account)).cloned();
        }

        if let Some(wallet) = &selected {
            let visible = wallet
                .addresses
                .iter()
                .any(|a| a.visible && a.address.matches(account.as_str()));
            if !visible {
                if let Some(first) = wallet.first_visible() {
                    info!("Selecting {}, the first visible account", first.address);
                    self.store
                        .dispatch(Action::UpdateAccountAddress(first.address.clone()))?;
                }
            }
        }

        self.store.dispatch(Action::WalletsLoaded {
            selected,
            wallet_names: names,
            wallets,
        })?;
        Ok(())
    }

    /// Replace the wallet list
    pub async fn update(&self, wallets: BTreeMap<String, Wallet>) -> Result<()> {
        self.save_wallets(&wallets).await?;
        self.store.dispatch(Action::WalletsUpdated(wallets))?;
        Ok(())
    }

    pub async fn set_selected(&self, wallet: Wallet) -> Result<()> {
        self.save_selected(&wallet).await?;
        self.store.dispatch(Action::WalletSelected(wallet))?;
        Ok(())
    }

    /// Replace the address to display-name map
    pub async fn update_names(&self, names: BTreeMap<String, String>) -> Result<()> {
        storage::save(
            &*self.storage,
            &StorageKey::global(keys::WALLET_NAMES),
            versions::GLOBAL,
            &names,
        )
        .await?;
        self.store.dispatch(Action::WalletNamesUpdated(names))?;
        Ok(())
    }

    pub fn set_loading(&self, loading: Option<WalletLoadingState>) -> Result<()> {
        self.store.dispatch(Action::WalletLoadingSet(loading))?;
        Ok(())
    }

    /// Flag a wallet as backed up, refreshing the selection if it is that
    /// wallet
    ///
    /// The flag is re-applied to the list published after each write, so
    /// wallet edits made meanwhile survive. Returns `false` for an unknown
    /// id.
    pub async fn mark_backed_up(&self, wallet_id: &str) -> Result<bool> {
        let flag = |wallets: &mut BTreeMap<String, Wallet>| match wallets.get_mut(wallet_id) {
            Some(wallet) => {
                wallet.backed_up = true;
                true
            }
            None => false,
        };

        let mut wallets = self.store.state().wallets.wallets.clone().unwrap_or_default();
        if !flag(&mut wallets) {
            return Ok(false);
        }
        loop {
            self.save_wallets(&wallets).await?;
            let mut current = self.store.state().wallets.wallets.clone().unwrap_or_default();
            flag(&mut current);
            if current == wallets {
                break;
            }
            wallets = current;
        }
        self.store.dispatch(Action::WalletsUpdated(wallets))?;

        let state = self.store.state();
        let selected_id = state.wallets.selected.as_ref().map(|w| w.id.as_str());
        if selected_id == Some(wallet_id) {
            if let Some(fresh) = state.wallets.wallet(wallet_id).cloned() {
                self.set_selected(fresh).await?;
            }
        }
        Ok(true)
    }

    async fn save_wallets(&self, wallets: &BTreeMap<String, Wallet>) -> Result<()> {
        storage::save(
            &*self.storage,
            &StorageKey::global(keys::ALL_WALLETS),
            versions::WALLETS,
            wallets,
        )
        .await
    }

    async fn save_selected(&self, wallet: &Wallet) -> Result<()> {
        storage::save(
            &*self.storage,
            &StorageKey::global(keys::SELECTED_WALLET),
            versions::WALLETS,
            wallet,
        )
        .await
    }
}
