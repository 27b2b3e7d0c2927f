//! Known wallets, their display names and the selected wallet

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::store::{Action, Reduce};
use crate::types::{Wallet, WalletLoadingState};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletsState {
    pub is_wallet_loading: Option<WalletLoadingState>,
    pub selected: Option<Wallet>,
    /// Lowercase address to resolved display name
    pub wallet_names: BTreeMap<String, String>,
    /// Keyed by wallet id; `None` until the first load
    pub wallets: Option<BTreeMap<String, Wallet>>,
}

impl WalletsState {
    pub fn wallet(&self, id: &str) -> Option<&Wallet> {
        self.wallets.as_ref().and_then(|wallets| wallets.get(id))
    }
}

impl Reduce for WalletsState {
    type Action = Action;

    fn reduce(&self, action: &Action) -> Option<Self> {
        match action {
            Action::WalletsLoaded {
                selected,
                wallet_names,
                wallets,
            } => Some(Self {
                selected: selected.clone(),
                wallet_names: wallet_names.clone(),
                wallets: Some(wallets.clone()),
                ..self.clone()
            }),
            Action::WalletsUpdated(wallets) => Some(Self {
                wallets: Some(wallets.clone()),
                ..self.clone()
            }),
            Action::WalletNamesUpdated(names) => Some(Self {
                wallet_names: names.clone(),
                ..self.clone()
            }),
            Action::WalletLoadingSet(loading) => Some(Self {
                is_wallet_loading: *loading,
                ..self.clone()
            }),
            Action::WalletSelected(wallet) => Some(Self {
                selected: Some(wallet.clone()),
                ..self.clone()
            }),
            _ => None,
        }
    }
}
