//! Account assets and transactions with their loading flags
//!
//! A failed load only clears its loading flag; whatever was loaded before
//! stays in place. Pending transactions are the ones this wallet broadcast
//! that the indexer has not confirmed yet, newest first.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::store::{Action, Reduce};
use crate::types::{AccountAsset, Transaction};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataState {
    /// Keyed by asset unique id
    pub account_assets: BTreeMap<String, AccountAsset>,
    pub transactions: Vec<Transaction>,
    pub pending_transactions: Vec<Transaction>,
    pub is_loading_assets: bool,
    pub is_loading_transactions: bool,
}

impl Reduce for DataState {
    type Action = Action;

    fn reduce(&self, action: &Action) -> Option<Self> {
        match action {
            Action::AssetsLoadRequested => Some(Self {
                is_loading_assets: true,
                ..self.clone()
            }),
            Action::AssetsLoadSucceeded(assets) => Some(Self {
                account_assets: assets.clone(),
                is_loading_assets: false,
                ..self.clone()
            }),
            Action::AssetsLoadFailed => Some(Self {
                is_loading_assets: false,
                ..self.clone()
            }),
            Action::TransactionsLoadRequested => Some(Self {
                is_loading_transactions: true,
                ..self.clone()
            }),
            Action::TransactionsLoadSucceeded(transactions) => Some(Self {
                transactions: transactions.clone(),
                is_loading_transactions: false,
                ..self.clone()
            }),
            Action::TransactionsLoadFailed => Some(Self {
                is_loading_transactions: false,
                ..self.clone()
            }),
            Action::PendingTransactionsUpdated(pending) => Some(Self {
                pending_transactions: pending.clone(),
                ..self.clone()
            }),
            Action::DataCleared => Some(Self::default()),
            _ => None,
        }
    }
}
