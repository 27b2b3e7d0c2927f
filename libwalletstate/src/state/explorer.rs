use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{Action, Reduce};
use crate::types::Address;

/// Block-event listener status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerState {
    pub listening: bool,
    pub polling_interval_ms: Option<u64>,
    /// Account the listener was started for
    pub subscribed_address: Option<Address>,
    pub started_at: Option<DateTime<Utc>>,
}

impl Reduce for ExplorerState {
    type Action = Action;

    fn reduce(&self, action: &Action) -> Option<Self> {
        match action {
            Action::ExplorerStarted {
                polling_interval_ms,
                address,
                started_at,
            } => Some(Self {
                listening: true,
                polling_interval_ms: Some(*polling_interval_ms),
                subscribed_address: Some(address.clone()),
                started_at: Some(*started_at),
            }),
            Action::ExplorerStopped => Some(Self::default()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_and_stop() {
        let now = Utc::now();
        let started = ExplorerState::default().transition(&Action::ExplorerStarted {
            polling_interval_ms: 8000,
            address: Address::new("0xabc"),
            started_at: now,
        });
        assert!(started.listening);
        assert_eq!(started.polling_interval_ms, Some(8000));
        assert_eq!(started.started_at, Some(now));

        assert_eq!(
            started.transition(&Action::ExplorerStopped),
            ExplorerState::default()
        );
    }

    #[test]
    fn test_ignores_foreign_actions() {
        assert!(ExplorerState::default().reduce(&Action::ModalOpened).is_none());
    }
}
