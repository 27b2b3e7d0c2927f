//! Account data creators
//!
//! Loads wrap their storage read in a request / success / failure triple so
//! the loading flags always settle. Successful loads also drive the
//! initial-fetch flag forward.
//!
//! Everything here is scoped to the account and network selected when the
//! creator starts. If the selection changes while a creator is suspended,
//! its result is cached under the old scope and never published.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::nonces::NonceService;
use crate::error::Result;
use crate::state::{AppState, FetchStage};
use crate::storage::{self, keys, versions, SettingsStorage, StorageKey};
use crate::store::{Action, Store};
use crate::types::{latest_outgoing_nonce, AccountAsset, Address, Network, Transaction};

#[derive(Clone)]
pub struct DataService {
    store: Arc<Store<AppState>>,
    storage: Arc<dyn SettingsStorage>,
    nonces: NonceService,
}

impl DataService {
    pub fn new(
        store: Arc<Store<AppState>>,
        storage: Arc<dyn SettingsStorage>,
        nonces: NonceService,
    ) -> Self {
        Self {
            store,
            storage,
            nonces,
        }
    }

    fn scope(&self) -> (Address, Network) {
        let state = self.store.state();
        (state.settings.account_address.clone(), state.settings.network)
    }

    /// Whether `account` on `network` is still the selected scope
    fn is_current(&self, account: &Address, network: Network) -> bool {
        let state = self.store.state();
        state.settings.network == network && state.settings.account_address.matches(account.as_str())
    }

    /// Load cached assets for the current account
    ///
    /// # Errors
    ///
    /// A failed read dispatches `data/assets_load_failed`, keeping whatever
    /// assets were loaded before, and returns the storage error.
    pub async fn load_account_assets(&self) -> Result<()> {
        self.store.dispatch(Action::AssetsLoadRequested)?;
        let (account, network) = self.scope();
        let key = StorageKey::account(keys::ACCOUNT_ASSETS_DATA, &account, network);

        let loaded: Result<Option<BTreeMap<String, AccountAsset>>> =
            storage::load(&*self.storage, &key, versions::ACCOUNT_ASSETS_DATA).await;
        if !self.is_current(&account, network) {
            debug!("Account changed while loading assets for {}", account);
            return Ok(());
        }
        match loaded {
            Ok(assets) => {
                self.store
                    .dispatch(Action::AssetsLoadSucceeded(assets.unwrap_or_default()))?;
                self.advance_fetch_stage(FetchStage::AssetsFetched)?;
                Ok(())
            }
            Err(e) => {
                self.store.dispatch(Action::AssetsLoadFailed)?;
                Err(e)
            }
        }
    }

    /// Load cached transactions, and the pending list, for the current account
    pub async fn load_transactions(&self) -> Result<()> {
        self.store.dispatch(Action::TransactionsLoadRequested)?;
        let (account, network) = self.scope();
        let key = StorageKey::account(keys::TRANSACTIONS, &account, network);

        let loaded: Result<Option<Vec<Transaction>>> =
            storage::load(&*self.storage, &key, versions::TRANSACTIONS).await;
        let transactions = match loaded {
            Ok(transactions) => transactions.unwrap_or_default(),
            Err(e) => {
                if self.is_current(&account, network) {
                    self.store.dispatch(Action::TransactionsLoadFailed)?;
                }
                return Err(e);
            }
        };

        let pending_key = StorageKey::account(keys::PENDING_TRANSACTIONS, &account, network);
        let pending: Option<Vec<Transaction>> =
            match storage::load(&*self.storage, &pending_key, versions::PENDING_TRANSACTIONS).await {
                Ok(pending) => pending,
                Err(e) => {
                    warn!("Failed to read pending transactions: {}", e);
                    None
                }
            };

        if !self.is_current(&account, network) {
            debug!("Account changed while loading transactions for {}", account);
            return Ok(());
        }
        self.store
            .dispatch(Action::PendingTransactionsUpdated(pending.unwrap_or_default()))?;
        self.store
            .dispatch(Action::TransactionsLoadSucceeded(transactions))?;
        self.advance_fetch_stage(FetchStage::TransactionsFetched)?;
        Ok(())
    }

    /// Persist assets for the current account and publish them
    pub async fn assets_received(&self, assets: BTreeMap<String, AccountAsset>) -> Result<()> {
        let (account, network) = self.scope();
        let key = StorageKey::account(keys::ACCOUNT_ASSETS_DATA, &account, network);
        if let Err(e) = storage::save(&*self.storage, &key, versions::ACCOUNT_ASSETS_DATA, &assets).await {
            warn!("Failed to cache account assets: {}", e);
        }

        if !self.is_current(&account, network) {
            debug!("Account changed while caching assets for {}; not publishing", account);
            return Ok(());
        }
        self.store.dispatch(Action::AssetsLoadSucceeded(assets))?;
        self.advance_fetch_stage(FetchStage::AssetsFetched)?;
        Ok(())
    }

    /// Handle a fresh transaction list from the indexer
    ///
    /// Advances the nonce from the latest outgoing transaction, publishes the
    /// list, moves the fetch flag on, drops pending entries the list confirms
    /// and caches the list best-effort.
    pub async fn transactions_received(&self, transactions: Vec<Transaction>) -> Result<()> {
        let (account, network) = self.scope();

        if let Some((from, nonce)) = latest_outgoing_nonce(&transactions, &account) {
            debug!("Latest outgoing nonce for {} is {}", from, nonce);
            let nonce = i64::try_from(nonce).unwrap_or(i64::MAX);
            self.nonces.increment(&from, nonce, network).await?;
        }

        if self.is_current(&account, network) {
            self.store
                .dispatch(Action::TransactionsLoadSucceeded(transactions.clone()))?;
            self.advance_fetch_stage(FetchStage::TransactionsFetched)?;
            self.drop_confirmed(&transactions, &account, network).await?;
        } else {
            debug!("Account changed while handling transactions for {}; caching only", account);
        }

        let key = StorageKey::account(keys::TRANSACTIONS, &account, network);
        if let Err(e) = storage::save(&*self.storage, &key, versions::TRANSACTIONS, &transactions).await {
            warn!("Failed to cache transactions: {}", e);
        }
        Ok(())
    }

    /// Put a just-broadcast transaction at the head of the pending list
    ///
    /// An entry with the same hash is replaced, which is how speed-ups and
    /// cancellations land. Nothing happens when `for_account` is given and
    /// is not the selected account.
    pub async fn add_pending_transaction(
        &self,
        transaction: Transaction,
        for_account: Option<&Address>,
    ) -> Result<()> {
        let (account, network) = self.scope();
        if let Some(target) = for_account {
            if !target.matches(account.as_str()) {
                debug!("Pending transaction for {} ignored; {} is selected", target, account);
                return Ok(());
            }
        }

        let current = self.store.state().data.pending_transactions.clone();
        let mut pending = Vec::with_capacity(current.len() + 1);
        pending.push(transaction.clone());
        pending.extend(current.into_iter().filter(|tx| tx.hash != transaction.hash));

        self.store.dispatch(Action::PendingTransactionsUpdated(pending))?;
        self.persist_pending(&account, network).await;
        Ok(())
    }

    /// Drop a pending transaction by hash on `network`
    ///
    /// Returns whether an entry was removed.
    pub async fn remove_pending_transaction(&self, hash: &str, network: Network) -> Result<bool> {
        let (account, current_network) = self.scope();
        let mut pending = self.store.state().data.pending_transactions.clone();
        let before = pending.len();
        pending.retain(|tx| !(tx.hash == hash && tx.network == network));
        if pending.len() == before {
            return Ok(false);
        }

        debug!("Removed pending transaction {}", hash);
        self.store.dispatch(Action::PendingTransactionsUpdated(pending))?;
        self.persist_pending(&account, current_network).await;
        Ok(true)
    }

    /// Remove pending entries that `transactions` reports as mined
    async fn drop_confirmed(
        &self,
        transactions: &[Transaction],
        account: &Address,
        network: Network,
    ) -> Result<()> {
        let mut pending = self.store.state().data.pending_transactions.clone();
        let before = pending.len();
        pending.retain(|tx| {
            !transactions
                .iter()
                .any(|confirmed| !confirmed.pending && confirmed.hash == tx.hash)
        });
        if pending.len() == before {
            return Ok(());
        }

        self.store.dispatch(Action::PendingTransactionsUpdated(pending))?;
        self.persist_pending(account, network).await;
        Ok(())
    }

    /// Write the published pending list under `account`, best-effort
    ///
    /// Writes again if the list moved while the previous write was in
    /// flight, and stops once the scope is no longer selected.
    async fn persist_pending(&self, account: &Address, network: Network) {
        let key = StorageKey::account(keys::PENDING_TRANSACTIONS, account, network);
        let mut written: Option<Vec<Transaction>> = None;
        loop {
            if !self.is_current(account, network) {
                return;
            }
            let pending = self.store.state().data.pending_transactions.clone();
            if written.as_ref() == Some(&pending) {
                return;
            }
            if let Err(e) =
                storage::save(&*self.storage, &key, versions::PENDING_TRANSACTIONS, &pending).await
            {
                warn!("Failed to cache pending transactions: {}", e);
                return;
            }
            written = Some(pending);
        }
    }

    /// Move the initial-fetch flag to `target` if it is the next phase
    ///
    /// Returns whether anything was dispatched.
    pub fn advance_fetch_stage(&self, target: FetchStage) -> Result<bool> {
        let current = *self.store.state().initial_fetch;
        let action = match (current, target) {
            (FetchStage::Nothing, FetchStage::AssetsFetched) => Action::AssetsFetched,
            (FetchStage::AssetsFetched, FetchStage::TransactionsFetched) => Action::TransactionsFetched,
            _ => return Ok(false),
        };
        self.store.dispatch(action)?;
        Ok(true)
    }

    pub fn clear_state(&self) -> Result<()> {
        self.store.dispatch(Action::DataCleared)?;
        Ok(())
    }
}
