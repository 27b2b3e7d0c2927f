//! Hidden coin list creators (deprecated container)

use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::state::AppState;
use crate::storage::{self, keys, versions, SettingsStorage, StorageKey};
use crate::store::{Action, Store};

#[derive(Clone)]
pub struct HiddenCoinsService {
    store: Arc<Store<AppState>>,
    storage: Arc<dyn SettingsStorage>,
}

impl HiddenCoinsService {
    pub fn new(store: Arc<Store<AppState>>, storage: Arc<dyn SettingsStorage>) -> Self {
        Self { store, storage }
    }

    fn key(&self) -> StorageKey {
        let state = self.store.state();
        StorageKey::account(
            keys::HIDDEN_COINS,
            &state.settings.account_address,
            state.settings.network,
        )
    }

    /// Load the list for the current account and network
    pub async fn load(&self) -> Result<()> {
        let coins: Option<Vec<String>> =
            storage::load(&*self.storage, &self.key(), versions::HIDDEN_COINS).await?;
        self.store
            .dispatch(Action::HiddenCoinsLoaded(coins.unwrap_or_default()))?;
        Ok(())
    }

    pub async fn hide(&self, coin: &str) -> Result<()> {
        self.edit(|coins| {
            if coins.iter().any(|c| c == coin) {
                return false;
            }
            coins.push(coin.to_string());
            true
        })
        .await
    }

    pub async fn unhide(&self, coin: &str) -> Result<()> {
        self.edit(|coins| {
            let before = coins.len();
            coins.retain(|c| c != coin);
            coins.len() != before
        })
        .await
    }

    /// Apply `change` to the published list, persist, then publish
    ///
    /// The list is re-read after every save and `change` applied again, so
    /// edits that land while a write is in flight are kept. A failed write
    /// publishes nothing. If the account or network switches mid-save the
    /// edit stays in storage for the old account and nothing is published.
    async fn edit<F>(&self, change: F) -> Result<()>
    where
        F: Fn(&mut Vec<String>) -> bool,
    {
        let key = self.key();
        let mut coins = self.store.state().hidden_coins.coins.clone();
        if !change(&mut coins) {
            return Ok(());
        }

        loop {
            debug!("Saving {} hidden coins", coins.len());
            storage::save(&*self.storage, &key, versions::HIDDEN_COINS, &coins).await?;

            if self.key() != key {
                debug!("Account changed while saving hidden coins; not publishing");
                return Ok(());
            }
            let mut current = self.store.state().hidden_coins.coins.clone();
            change(&mut current);
            if current == coins {
                break;
            }
            coins = current;
        }

        self.store.dispatch(Action::HiddenCoinsUpdated(coins))?;
        Ok(())
    }
}
