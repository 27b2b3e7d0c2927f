//! Wallet-connect session creators
//!
//! Session changes that outlive the process are saved before they are
//! published: a failed save leaves the store untouched and is returned to
//! the caller. Sessions are persisted as one map keyed by peer id.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{ConfigError, Result, WalletStateError};
use crate::state::walletconnect::retain_unexpired;
use crate::state::AppState;
use crate::storage::{self, keys, versions, SettingsStorage, StorageKey};
use crate::store::{Action, Store};
use crate::types::{Address, PendingSessionRequest, Session};
use crate::Config;

type Sessions = BTreeMap<String, Session>;

#[derive(Clone)]
pub struct WalletConnectService {
    store: Arc<Store<AppState>>,
    storage: Arc<dyn SettingsStorage>,
    config: Arc<Config>,
}

impl WalletConnectService {
    pub fn new(
        store: Arc<Store<AppState>>,
        storage: Arc<dyn SettingsStorage>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            store,
            storage,
            config,
        }
    }

    fn key() -> StorageKey {
        StorageKey::global(keys::WALLETCONNECT_SESSIONS)
    }

    async fn save(&self, sessions: &Sessions) -> Result<()> {
        storage::save(&*self.storage, &Self::key(), versions::WALLETCONNECT, sessions).await
    }

    /// Load persisted sessions, dropping those expired by `now`
    ///
    /// Nothing is dispatched when no live session remains.
    pub async fn load_state(&self, now: DateTime<Utc>) -> Result<()> {
        let stored: Option<Sessions> =
            storage::load(&*self.storage, &Self::key(), versions::WALLETCONNECT).await?;
        let Some(stored) = stored else {
            return Ok(());
        };

        let live = retain_unexpired(&stored, now);
        if live.len() != stored.len() {
            debug!("Dropping {} expired sessions", stored.len() - live.len());
            self.save(&live).await?;
        }
        if !live.is_empty() {
            self.store.dispatch(Action::SessionsLoaded(live))?;
        }
        Ok(())
    }

    /// Save the session map `derive` builds from the published state
    ///
    /// `derive` runs again on the state published after each save; if that
    /// differs from what was written, the fresh map is saved too. Sessions
    /// other creators published in the meantime are therefore kept.
    async fn save_derived<F>(&self, derive: F) -> Result<Sessions>
    where
        F: Fn(&AppState) -> Sessions,
    {
        let mut sessions = derive(&self.store.state());
        loop {
            self.save(&sessions).await?;
            let fresh = derive(&self.store.state());
            if fresh == sessions {
                return Ok(sessions);
            }
            sessions = fresh;
        }
    }

    async fn save_and_replace<F>(&self, derive: F) -> Result<()>
    where
        F: Fn(&AppState) -> Sessions,
    {
        let sessions = self.save_derived(derive).await?;
        self.store.dispatch(Action::SessionsReplaced(sessions))?;
        Ok(())
    }

    /// Drop sessions whose expiry is not after `now`; returns how many went
    pub async fn prune_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let current = self.store.state().walletconnect.sessions.clone();
        let removed = current.len() - retain_unexpired(&current, now).len();
        if removed == 0 {
            return Ok(0);
        }

        self.save_and_replace(|state| retain_unexpired(&state.walletconnect.sessions, now))
            .await?;
        Ok(removed)
    }

    pub fn add_pending_request(&self, request: PendingSessionRequest) -> Result<()> {
        debug!("Session request from {} ({})", request.dapp_name, request.peer_id);
        self.store.dispatch(Action::PendingRequestAdded(request))?;
        Ok(())
    }

    /// Approve a pending request for the current account and chain
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if no request from `peer_id` is pending, and a
    /// storage error if the session cannot be saved. Either way the store
    /// is left as it was.
    pub async fn approve_session(&self, peer_id: &str, now: DateTime<Utc>) -> Result<Session> {
        let ttl = self.config.walletconnect.session_ttl()?;
        let ttl = chrono::Duration::from_std(ttl).map_err(|e| ConfigError::InvalidValue {
            field: "walletconnect.session_ttl".to_string(),
            reason: e.to_string(),
        })?;

        let state = self.store.state();
        let request = state
            .walletconnect
            .pending_requests
            .get(peer_id)
            .ok_or_else(|| {
                WalletStateError::InvalidInput(format!("no pending session request from {}", peer_id))
            })?;

        let session = Session {
            peer_id: request.peer_id.clone(),
            client_id: uuid::Uuid::new_v4().to_string(),
            dapp_name: request.dapp_name.clone(),
            dapp_url: request.dapp_url.clone(),
            dapp_icon: request.dapp_icon.clone(),
            account_address: state.settings.account_address.clone(),
            chain_id: state.settings.chain_id,
            expires_at: now + ttl,
        };

        self.save_derived(|state| {
            let mut sessions = state.walletconnect.sessions.clone();
            sessions.insert(session.peer_id.clone(), session.clone());
            sessions
        })
        .await?;

        self.store.dispatch(Action::SessionAdded(session.clone()))?;
        self.store.dispatch(Action::PendingRequestRemoved {
            peer_id: peer_id.to_string(),
        })?;
        info!("Approved session with {}", session.dapp_url);
        Ok(session)
    }

    pub fn reject_session(&self, peer_id: &str) -> Result<()> {
        self.store.dispatch(Action::PendingRequestRemoved {
            peer_id: peer_id.to_string(),
        })?;
        Ok(())
    }

    /// Remove every session opened by `dapp_url`; returns how many went
    pub async fn disconnect_by_dapp_url(&self, dapp_url: &str) -> Result<usize> {
        let without_dapp = |state: &AppState| -> Sessions {
            state
                .walletconnect
                .sessions
                .iter()
                .filter(|(_, s)| s.dapp_url != dapp_url)
                .map(|(k, s)| (k.clone(), s.clone()))
                .collect()
        };

        let state = self.store.state();
        let removed = state.walletconnect.sessions.len() - without_dapp(&state).len();
        if removed == 0 {
            return Ok(0);
        }

        self.save_and_replace(without_dapp).await?;
        debug!("Disconnected {} sessions for {}", removed, dapp_url);
        Ok(removed)
    }

    /// Re-point every session at the current account and chain
    pub async fn update_sessions(&self) -> Result<()> {
        if self.store.state().walletconnect.sessions.is_empty() {
            return Ok(());
        }
        self.save_and_replace(|state| {
            retarget(
                &state.walletconnect.sessions,
                |_| true,
                &state.settings.account_address,
                state.settings.chain_id,
            )
        })
        .await?;
        Ok(())
    }

    /// Re-point the sessions opened by `dapp_url` at `account` on `chain_id`
    ///
    /// Other dapps' sessions are left alone. Returns how many sessions were
    /// re-pointed.
    pub async fn update_sessions_by_dapp_url(
        &self,
        dapp_url: &str,
        account: &Address,
        chain_id: u64,
    ) -> Result<usize> {
        let matching = self
            .store
            .state()
            .walletconnect
            .sessions
            .values()
            .filter(|s| s.dapp_url == dapp_url)
            .count();
        if matching == 0 {
            return Ok(0);
        }

        self.save_and_replace(|state| {
            retarget(
                &state.walletconnect.sessions,
                |s| s.dapp_url == dapp_url,
                account,
                chain_id,
            )
        })
        .await?;
        info!("Moved {} sessions for {} to chain {}", matching, dapp_url, chain_id);
        Ok(matching)
    }

    pub fn set_pending_redirect(&self) -> Result<()> {
        self.store.dispatch(Action::PendingRedirectSet)?;
        Ok(())
    }

    pub fn remove_pending_redirect(&self) -> Result<()> {
        self.store.dispatch(Action::PendingRedirectRemoved)?;
        Ok(())
    }

    /// Forget all in-memory wallet-connect state; saved sessions stay
    pub fn clear_state(&self) -> Result<()> {
        self.store.dispatch(Action::WalletConnectCleared)?;
        Ok(())
    }
}

/// Copy `sessions`, pointing those selected by `only` at `account` and
/// `chain_id`
fn retarget<P>(sessions: &Sessions, only: P, account: &Address, chain_id: u64) -> Sessions
where
    P: Fn(&Session) -> bool,
{
    sessions
        .iter()
        .map(|(peer_id, session)| {
            let session = if only(session) {
                Session {
                    account_address: account.clone(),
                    chain_id,
                    ..session.clone()
                }
            } else {
                session.clone()
            };
            (peer_id.clone(), session)
        })
        .collect()
}
