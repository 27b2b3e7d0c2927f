//! Last-used transaction nonce per account and network
//!
//! A stored nonce of `-1` means the account has not sent anything yet on that
//! network. Increments only move forward; a decrement (a dropped or replaced
//! transaction) rolls back to just below the given nonce, and only when that
//! nonce is not ahead of what we already know.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::store::{Action, Reduce};
use crate::types::{Address, Network};

/// Lowercased account address -> network -> last used nonce
pub type NonceTable = BTreeMap<String, BTreeMap<Network, i64>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceState {
    pub accounts: NonceTable,
}

impl NonceState {
    pub fn get(&self, account: &Address, network: Network) -> Option<i64> {
        self.accounts
            .get(&account.key())
            .and_then(|networks| networks.get(&network))
            .copied()
    }

    fn with(&self, account: &Address, network: Network, nonce: i64) -> Self {
        let mut accounts = self.accounts.clone();
        accounts.entry(account.key()).or_default().insert(network, nonce);
        Self { accounts }
    }
}

impl Reduce for NonceState {
    type Action = Action;

    fn reduce(&self, action: &Action) -> Option<Self> {
        match action {
            Action::NoncesLoaded(accounts) => Some(Self {
                accounts: accounts.clone(),
            }),
            Action::NonceIncremented {
                account,
                network,
                nonce,
            } => {
                let advances = self.get(account, *network).map_or(true, |current| *nonce > current);
                advances.then(|| self.with(account, *network, *nonce))
            }
            Action::NonceDecremented {
                account,
                network,
                nonce,
            } => {
                let behind = self.get(account, *network).is_some_and(|current| *nonce <= current);
                behind.then(|| self.with(account, *network, nonce - 1))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn increment(nonce: i64) -> Action {
        Action::NonceIncremented {
            account: Address::new("0xABC"),
            network: Network::Mainnet,
            nonce,
        }
    }

    fn decrement(nonce: i64) -> Action {
        Action::NonceDecremented {
            account: Address::new("0xabc"),
            network: Network::Mainnet,
            nonce,
        }
    }

    #[test]
    fn test_first_increment_applies() {
        let state = NonceState::default().transition(&increment(4));
        assert_eq!(state.get(&Address::new("0xabc"), Network::Mainnet), Some(4));
        assert_eq!(state.get(&Address::new("0xabc"), Network::Goerli), None);
    }

    #[test]
    fn test_increment_only_when_strictly_greater() {
        let state = NonceState::default().transition(&increment(4));
        assert!(state.reduce(&increment(4)).is_none());
        assert!(state.reduce(&increment(2)).is_none());

        let next = state.transition(&increment(5));
        assert_eq!(next.get(&Address::new("0xAbc"), Network::Mainnet), Some(5));
    }

    #[test]
    fn test_decrement_rolls_back_below_given_nonce() {
        let state = NonceState::default().transition(&increment(7));
        let next = state.transition(&decrement(6));
        assert_eq!(next.get(&Address::new("0xabc"), Network::Mainnet), Some(5));
    }

    #[test]
    fn test_decrement_ahead_of_current_is_noop() {
        let state = NonceState::default().transition(&increment(3));
        assert!(state.reduce(&decrement(4)).is_none());
        assert!(NonceState::default().reduce(&decrement(1)).is_none());
    }

    #[test]
    fn test_decrement_first_transaction_leaves_minus_one() {
        let state = NonceState::default().transition(&increment(0));
        let next = state.transition(&decrement(0));
        assert_eq!(next.get(&Address::new("0xabc"), Network::Mainnet), Some(-1));
    }

    #[test]
    fn test_networks_are_independent() {
        let state = NonceState::default()
            .transition(&increment(9))
            .transition(&Action::NonceIncremented {
                account: Address::new("0xabc"),
                network: Network::Goerli,
                nonce: 1,
            });
        assert_eq!(state.get(&Address::new("0xabc"), Network::Mainnet), Some(9));
        assert_eq!(state.get(&Address::new("0xabc"), Network::Goerli), Some(1));
    }

    #[test]
    fn test_table_wire_shape() {
        let state = NonceState::default().transition(&increment(2));
        let json = serde_json::to_value(&state.accounts).unwrap();
        assert_eq!(json, serde_json::json!({"0xabc": {"mainnet": 2}}));
    }

    #[test]
    fn test_ignores_foreign_actions() {
        assert!(NonceState::default().reduce(&Action::ModalOpened).is_none());
    }
}
