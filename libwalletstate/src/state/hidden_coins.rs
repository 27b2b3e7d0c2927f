//! Hidden coin ids for the asset list
//!
//! Deprecated in favour of per-asset visibility flags. The asset list still
//! reads this slot, so it stays until that consumer moves.

use serde::{Deserialize, Serialize};

use crate::store::{Action, Reduce};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenCoinsState {
    /// Coin ids in the order they were hidden
    pub coins: Vec<String>,
}

impl HiddenCoinsState {
    pub fn contains(&self, coin: &str) -> bool {
        self.coins.iter().any(|c| c == coin)
    }
}

impl Reduce for HiddenCoinsState {
    type Action = Action;

    fn reduce(&self, action: &Action) -> Option<Self> {
        match action {
            Action::HiddenCoinsLoaded(coins) | Action::HiddenCoinsUpdated(coins) => Some(Self {
                coins: coins.clone(),
            }),
            _ => None,
        }
    }
}
