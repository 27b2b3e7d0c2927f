//! Settings action creators
//!
//! Preference changes are dispatched first and then written through, so the
//! UI reacts before storage does. The app icon is the exception: it is only
//! applied once it has been saved.

use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::state::AppState;
use crate::storage::{self, keys, versions, SettingsStorage, StorageKey};
use crate::store::{Action, Store};
use crate::types::{Address, Language, NativeCurrency};

#[derive(Clone)]
pub struct SettingsService {
    store: Arc<Store<AppState>>,
    storage: Arc<dyn SettingsStorage>,
}

impl SettingsService {
    pub fn new(store: Arc<Store<AppState>>, storage: Arc<dyn SettingsStorage>) -> Self {
        Self { store, storage }
    }

    /// Load app icon, native currency and the testnets preference
    ///
    /// Missing entries keep the current values.
    pub async fn load_state(&self) -> Result<()> {
        let native_currency: Option<NativeCurrency> =
            storage::load(&*self.storage, &StorageKey::global(keys::NATIVE_CURRENCY), versions::GLOBAL).await?;
        let testnets_enabled: Option<bool> =
            storage::load(&*self.storage, &StorageKey::global(keys::TESTNETS_ENABLED), versions::GLOBAL).await?;
        let app_icon: Option<String> =
            storage::load(&*self.storage, &StorageKey::global(keys::APP_ICON), versions::GLOBAL).await?;

        if let Some(app_icon) = app_icon {
            self.store.dispatch(Action::AppIconChanged(app_icon))?;
        }

        let current = self.store.state();
        self.store.dispatch(Action::AccountSettingsLoaded {
            native_currency: native_currency.unwrap_or(current.settings.native_currency),
            testnets_enabled: testnets_enabled.unwrap_or(current.settings.testnets_enabled),
        })?;
        Ok(())
    }

    pub async fn load_network(&self) -> Result<()> {
        let chain_id: Option<u64> =
            storage::load(&*self.storage, &StorageKey::global(keys::CHAIN_ID), versions::GLOBAL).await?;
        if let Some(chain_id) = chain_id {
            self.store.dispatch(Action::NetworkChanged { chain_id })?;
        }
        Ok(())
    }

    pub async fn load_language(&self) -> Result<()> {
        let language: Option<Language> =
            storage::load(&*self.storage, &StorageKey::global(keys::LANGUAGE), versions::GLOBAL).await?;
        if let Some(language) = language {
            self.store.dispatch(Action::LanguageChanged(language))?;
        }
        Ok(())
    }

    pub async fn change_testnets_enabled(&self, enabled: bool) -> Result<()> {
        self.store.dispatch(Action::TestnetsPrefChanged(enabled))?;
        storage::save(
            &*self.storage,
            &StorageKey::global(keys::TESTNETS_ENABLED),
            versions::GLOBAL,
            &enabled,
        )
        .await
    }

    pub async fn change_app_icon(&self, icon: &str) -> Result<()> {
        debug!("Changing app icon to {}", icon);
        storage::save(
            &*self.storage,
            &StorageKey::global(keys::APP_ICON),
            versions::GLOBAL,
            icon,
        )
        .await?;
        self.store.dispatch(Action::AppIconChanged(icon.to_string()))?;
        Ok(())
    }

    /// Switch the active account; nothing is persisted
    pub fn update_account_address(&self, address: Address) -> Result<()> {
        self.store.dispatch(Action::UpdateAccountAddress(address))?;
        Ok(())
    }

    pub async fn update_network(&self, chain_id: u64) -> Result<()> {
        self.store.dispatch(Action::NetworkChanged { chain_id })?;
        storage::save(
            &*self.storage,
            &StorageKey::global(keys::CHAIN_ID),
            versions::GLOBAL,
            &chain_id,
        )
        .await
    }

    pub async fn change_language(&self, language: Language) -> Result<()> {
        self.store.dispatch(Action::LanguageChanged(language))?;
        storage::save(
            &*self.storage,
            &StorageKey::global(keys::LANGUAGE),
            versions::GLOBAL,
            &language,
        )
        .await
    }

    pub async fn change_native_currency(&self, currency: NativeCurrency) -> Result<()> {
        self.store.dispatch(Action::NativeCurrencyChanged(currency))?;
        storage::save(
            &*self.storage,
            &StorageKey::global(keys::NATIVE_CURRENCY),
            versions::GLOBAL,
            &currency,
        )
        .await
    }
}
