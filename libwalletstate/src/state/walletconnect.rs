//! Wallet-connect sessions and pending session requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::store::{Action, Reduce};
use crate::types::{PendingSessionRequest, Session};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConnectState {
    /// Approved sessions keyed by peer id
    pub sessions: BTreeMap<String, Session>,
    /// Requests awaiting approval keyed by peer id
    pub pending_requests: BTreeMap<String, PendingSessionRequest>,
    /// The dapp asked to be returned to once the current request resolves
    pub pending_redirect: bool,
}

impl WalletConnectState {
    pub fn sessions_for_dapp<'a>(&'a self, dapp_url: &'a str) -> impl Iterator<Item = &'a Session> + 'a {
        self.sessions.values().filter(move |s| s.dapp_url == dapp_url)
    }
}

/// Sessions whose expiry is strictly after `now`
pub fn retain_unexpired(
    sessions: &BTreeMap<String, Session>,
    now: DateTime<Utc>,
) -> BTreeMap<String, Session> {
    sessions
        .iter()
        .filter(|(_, session)| session.is_live_at(now))
        .map(|(peer_id, session)| (peer_id.clone(), session.clone()))
        .collect()
}

impl Reduce for WalletConnectState {
    type Action = Action;

    fn reduce(&self, action: &Action) -> Option<Self> {
        match action {
            Action::SessionsLoaded(sessions) | Action::SessionsReplaced(sessions) => Some(Self {
                sessions: sessions.clone(),
                ..self.clone()
            }),
            Action::SessionAdded(session) => {
                let mut sessions = self.sessions.clone();
                sessions.insert(session.peer_id.clone(), session.clone());
                Some(Self {
                    sessions,
                    ..self.clone()
                })
            }
            Action::PendingRequestAdded(request) => {
                let mut pending_requests = self.pending_requests.clone();
                pending_requests.insert(request.peer_id.clone(), request.clone());
                Some(Self {
                    pending_requests,
                    ..self.clone()
                })
            }
            Action::PendingRequestRemoved { peer_id } => {
                let mut pending_requests = self.pending_requests.clone();
                pending_requests.remove(peer_id).map(|_| Self {
                    pending_requests,
                    ..self.clone()
                })
            }
            Action::PendingRedirectSet => Some(Self {
                pending_redirect: true,
                ..self.clone()
            }),
            Action::PendingRedirectRemoved => Some(Self {
                pending_redirect: false,
                ..self.clone()
            }),
            Action::WalletConnectCleared => Some(Self::default()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Address;
    use chrono::Duration;

    fn session(peer_id: &str, dapp_url: &str, expires_at: DateTime<Utc>) -> Session {
        Session {
            peer_id: peer_id.to_string(),
            client_id: format!("client-{}", peer_id),
            dapp_name: "Dapp".to_string(),
            dapp_url: dapp_url.to_string(),
            dapp_icon: None,
            account_address: Address::new("0xabc"),
            chain_id: 1,
            expires_at,
        }
    }

    fn request(peer_id: &str) -> PendingSessionRequest {
        PendingSessionRequest {
            peer_id: peer_id.to_string(),
            dapp_name: "Dapp".to_string(),
            dapp_url: "https://dapp.example".to_string(),
            dapp_icon: None,
            received_at: Utc::now(),
        }
    }

    #[test]
    fn test_retain_unexpired_keeps_strictly_future_entries() {
        let now = Utc::now();
        let mut sessions = BTreeMap::new();
        sessions.insert("past".to_string(), session("past", "a", now - Duration::hours(1)));
        sessions.insert("exact".to_string(), session("exact", "a", now));
        sessions.insert("future".to_string(), session("future", "a", now + Duration::hours(1)));

        let live = retain_unexpired(&sessions, now);
        assert_eq!(live.keys().collect::<Vec<_>>(), vec!["future"]);
        assert_eq!(sessions.len(), 3, "input must be untouched");
    }

    #[test]
    fn test_session_added_and_replaced() {
        let now = Utc::now();
        let state = WalletConnectState::default()
            .transition(&Action::SessionAdded(session("p1", "https://a", now)))
            .transition(&Action::SessionAdded(session("p2", "https://b", now)));
        assert_eq!(state.sessions.len(), 2);
        assert_eq!(state.sessions_for_dapp("https://a").count(), 1);

        let replaced = state.transition(&Action::SessionsReplaced(BTreeMap::new()));
        assert!(replaced.sessions.is_empty());
    }

    #[test]
    fn test_pending_requests() {
        let state = WalletConnectState::default()
            .transition(&Action::PendingRequestAdded(request("p1")));
        assert!(state.pending_requests.contains_key("p1"));

        let removed = state.transition(&Action::PendingRequestRemoved {
            peer_id: "p1".to_string(),
        });
        assert!(removed.pending_requests.is_empty());

        // Removing an unknown request changes nothing
        assert!(removed
            .reduce(&Action::PendingRequestRemoved {
                peer_id: "p1".to_string()
            })
            .is_none());
    }

    #[test]
    fn test_redirect_and_clear() {
        let state = WalletConnectState::default().transition(&Action::PendingRedirectSet);
        assert!(state.pending_redirect);
        assert!(!state.transition(&Action::PendingRedirectRemoved).pending_redirect);

        let cleared = state
            .transition(&Action::PendingRequestAdded(request("p9")))
            .transition(&Action::WalletConnectCleared);
        assert_eq!(cleared, WalletConnectState::default());
    }

    #[test]
    fn test_ignores_foreign_actions() {
        assert!(WalletConnectState::default().reduce(&Action::ModalOpened).is_none());
    }
}
