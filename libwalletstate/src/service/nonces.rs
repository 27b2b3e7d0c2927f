//! Guarded nonce bookkeeping
//!
//! Every creator checks the current snapshot before dispatching, so a stale
//! or duplicate report never moves a nonce the wrong way. Persistence of the
//! nonce table is best-effort.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::provider::ChainProvider;
use crate::state::nonces::NonceTable;
use crate::state::AppState;
use crate::storage::{self, keys, versions, SettingsStorage, StorageKey};
use crate::store::{Action, Store};
use crate::types::{Address, Network};

#[derive(Clone)]
pub struct NonceService {
    store: Arc<Store<AppState>>,
    storage: Arc<dyn SettingsStorage>,
    provider: Arc<dyn ChainProvider>,
}

impl NonceService {
    pub fn new(
        store: Arc<Store<AppState>>,
        storage: Arc<dyn SettingsStorage>,
        provider: Arc<dyn ChainProvider>,
    ) -> Self {
        Self {
            store,
            storage,
            provider,
        }
    }

    pub async fn load(&self) -> Result<()> {
        let key = StorageKey::global(keys::NONCE_MANAGER);
        let table: Option<NonceTable> =
            storage::load(&*self.storage, &key, versions::NONCE_MANAGER).await?;
        if let Some(table) = table {
            self.store.dispatch(Action::NoncesLoaded(table))?;
        }
        Ok(())
    }

    /// Record `nonce` as used, if it is ahead of what we know
    ///
    /// Returns whether the stored nonce moved.
    pub async fn increment(&self, account: &Address, nonce: i64, network: Network) -> Result<bool> {
        let current = self.store.state().nonces.get(account, network);
        if current.is_some_and(|current| nonce <= current) {
            debug!(
                "Ignoring nonce {} for {} on {}: already at {:?}",
                nonce, account, network, current
            );
            return Ok(false);
        }

        self.store.dispatch(Action::NonceIncremented {
            account: account.clone(),
            network,
            nonce,
        })?;
        self.persist().await;
        Ok(true)
    }

    /// Roll back after `nonce` was dropped or replaced
    ///
    /// Only applies when `nonce` is not ahead of the stored value; the stored
    /// value becomes `nonce - 1`.
    pub async fn decrement(&self, account: &Address, nonce: i64, network: Network) -> Result<bool> {
        let current = self.store.state().nonces.get(account, network);
        if !current.is_some_and(|current| nonce <= current) {
            return Ok(false);
        }

        self.store.dispatch(Action::NonceDecremented {
            account: account.clone(),
            network,
            nonce,
        })?;
        self.persist().await;
        Ok(true)
    }

    /// Seed from the provider's transaction count
    ///
    /// The count is the next nonce to use, so the last used one is one less.
    pub async fn refresh_from_provider(&self, account: &Address, network: Network) -> Result<bool> {
        let count = self.provider.transaction_count(account, network).await?;
        let nonce = i64::try_from(count).unwrap_or(i64::MAX) - 1;
        self.increment(account, nonce, network).await
    }

    async fn persist(&self) {
        let state = self.store.state();
        let key = StorageKey::global(keys::NONCE_MANAGER);
        if let Err(e) =
            storage::save(&*self.storage, &key, versions::NONCE_MANAGER, &state.nonces.accounts).await
        {
            warn!("Failed to persist nonces: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockProvider, OfflineProvider};
    use crate::storage::MemoryStorage;

    fn service_with(provider: Arc<dyn ChainProvider>) -> (NonceService, Arc<Store<AppState>>) {
        let store = Arc::new(Store::new(AppState::default()));
        let service = NonceService::new(Arc::clone(&store), Arc::new(MemoryStorage::new()), provider);
        (service, store)
    }

    fn service() -> (NonceService, Arc<Store<AppState>>) {
        service_with(Arc::new(OfflineProvider::default()))
    }

    fn account() -> Address {
        Address::new("0xAbC")
    }

    #[tokio::test]
    async fn test_increment_is_guarded() {
        let (service, store) = service();
        assert!(service.increment(&account(), 4, Network::Mainnet).await.unwrap());
        assert!(!service.increment(&account(), 4, Network::Mainnet).await.unwrap());
        assert!(!service.increment(&account(), 3, Network::Mainnet).await.unwrap());
        assert!(service.increment(&account(), 5, Network::Mainnet).await.unwrap());
        assert_eq!(store.state().nonces.get(&account(), Network::Mainnet), Some(5));
    }

    #[tokio::test]
    async fn test_decrement_is_guarded() {
        let (service, store) = service();
        assert!(!service.decrement(&account(), 1, Network::Mainnet).await.unwrap());

        service.increment(&account(), 6, Network::Mainnet).await.unwrap();
        assert!(!service.decrement(&account(), 7, Network::Mainnet).await.unwrap());
        assert!(service.decrement(&account(), 6, Network::Mainnet).await.unwrap());
        assert_eq!(store.state().nonces.get(&account(), Network::Mainnet), Some(5));
    }

    #[tokio::test]
    async fn test_refresh_from_provider() {
        let provider = Arc::new(MockProvider::with_transaction_count(&account(), Network::Goerli, 10));
        let (service, store) = service_with(provider.clone());

        assert!(service.refresh_from_provider(&account(), Network::Goerli).await.unwrap());
        assert_eq!(store.state().nonces.get(&account(), Network::Goerli), Some(9));
        assert_eq!(provider.count_call_count(), 1);

        // A lower count never moves the nonce back
        service.increment(&account(), 12, Network::Goerli).await.unwrap();
        assert!(!service.refresh_from_provider(&account(), Network::Goerli).await.unwrap());
        assert_eq!(store.state().nonces.get(&account(), Network::Goerli), Some(12));
    }

    #[tokio::test]
    async fn test_refresh_for_fresh_account_stores_minus_one() {
        let (service, store) = service();
        assert!(service.refresh_from_provider(&account(), Network::Mainnet).await.unwrap());
        assert_eq!(store.state().nonces.get(&account(), Network::Mainnet), Some(-1));
    }

    #[tokio::test]
    async fn test_refresh_failure_leaves_state() {
        let (service, store) = service_with(Arc::new(MockProvider::count_failure()));
        let before = store.state();
        assert!(service.refresh_from_provider(&account(), Network::Mainnet).await.is_err());
        assert!(Arc::ptr_eq(&before, &store.state()));
    }

    #[tokio::test]
    async fn test_nonces_survive_reload() {
        let storage = Arc::new(MemoryStorage::new());
        let store = Arc::new(Store::new(AppState::default()));
        let provider: Arc<dyn ChainProvider> = Arc::new(OfflineProvider::default());
        NonceService::new(Arc::clone(&store), storage.clone(), Arc::clone(&provider))
            .increment(&account(), 8, Network::Kovan)
            .await
            .unwrap();

        let fresh = Arc::new(Store::new(AppState::default()));
        NonceService::new(Arc::clone(&fresh), storage, provider)
            .load()
            .await
            .unwrap();
        assert_eq!(fresh.state().nonces.get(&account(), Network::Kovan), Some(8));
    }
}
