use serde::{Deserialize, Serialize};

use crate::store::{Action, Reduce};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessState {
    /// Wallet keys are loaded and the main screens may render
    pub wallet_ready: bool,
}

impl Reduce for ReadinessState {
    type Action = Action;

    fn reduce(&self, action: &Action) -> Option<Self> {
        match action {
            Action::WalletReadyChanged(ready) => Some(Self {
                wallet_ready: *ready,
            }),
            _ => None,
        }
    }
}
