//! User settings: account, network, display preferences

use serde::{Deserialize, Serialize};

use crate::config::DefaultsConfig;
use crate::store::{Action, Reduce};
use crate::types::{Address, Language, NativeCurrency, Network};

pub const DEFAULT_APP_ICON: &str = "og";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsState {
    pub account_address: Address,
    pub app_icon: String,
    pub chain_id: u64,
    pub language: Language,
    pub native_currency: NativeCurrency,
    pub network: Network,
    pub testnets_enabled: bool,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            account_address: Address::default(),
            app_icon: DEFAULT_APP_ICON.to_string(),
            chain_id: Network::Mainnet.chain_id(),
            language: Language::EnUs,
            native_currency: NativeCurrency::Usd,
            network: Network::Mainnet,
            testnets_enabled: false,
        }
    }
}

impl SettingsState {
    pub fn from_defaults(defaults: &DefaultsConfig) -> Self {
        Self {
            app_icon: defaults
                .app_icon
                .clone()
                .unwrap_or_else(|| DEFAULT_APP_ICON.to_string()),
            chain_id: defaults.network.chain_id(),
            language: defaults.language,
            native_currency: defaults.native_currency,
            network: defaults.network,
            ..Self::default()
        }
    }
}

impl Reduce for SettingsState {
    type Action = Action;

    fn reduce(&self, action: &Action) -> Option<Self> {
        match action {
            Action::UpdateAccountAddress(address) => Some(Self {
                account_address: address.clone(),
                ..self.clone()
            }),
            Action::NativeCurrencyChanged(currency) => Some(Self {
                native_currency: *currency,
                ..self.clone()
            }),
            Action::AppIconChanged(icon) => Some(Self {
                app_icon: icon.clone(),
                ..self.clone()
            }),
            Action::LanguageChanged(language) => Some(Self {
                language: *language,
                ..self.clone()
            }),
            // Chains we cannot name are ignored rather than half-applied
            Action::NetworkChanged { chain_id } => {
                Network::from_chain_id(*chain_id).map(|network| Self {
                    chain_id: *chain_id,
                    network,
                    ..self.clone()
                })
            }
            Action::TestnetsPrefChanged(enabled) => Some(Self {
                testnets_enabled: *enabled,
                ..self.clone()
            }),
            Action::AccountSettingsLoaded {
                native_currency,
                testnets_enabled,
            } => Some(Self {
                native_currency: *native_currency,
                testnets_enabled: *testnets_enabled,
                ..self.clone()
            }),
            _ => None,
        }
    }
}
