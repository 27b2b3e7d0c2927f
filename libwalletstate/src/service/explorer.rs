use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::error::Result;
use crate::provider::ChainProvider;
use crate::state::AppState;
use crate::store::{Action, Store};
use crate::Config;

/// Starts and stops block-event listening on the provider
///
/// The provider is always driven first; the store only records what the
/// provider accepted.
#[derive(Clone)]
pub struct ExplorerService {
    store: Arc<Store<AppState>>,
    provider: Arc<dyn ChainProvider>,
    config: Arc<Config>,
}

impl ExplorerService {
    pub fn new(
        store: Arc<Store<AppState>>,
        provider: Arc<dyn ChainProvider>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            store,
            provider,
            config,
        }
    }

    /// Start listening for the current account and network
    ///
    /// A listener that is already running is stopped first.
    pub async fn init(&self) -> Result<()> {
        if self.store.state().explorer.listening {
            self.clear().await?;
        }

        let interval = Duration::from_millis(self.config.provider.polling_interval_ms);
        self.provider.set_polling_interval(interval);

        let network = self.store.state().settings.network;
        self.provider.start_block_events(network).await?;

        let state = self.store.state();
        self.store.dispatch(Action::ExplorerStarted {
            polling_interval_ms: self.config.provider.polling_interval_ms,
            address: state.settings.account_address.clone(),
            started_at: Utc::now(),
        })?;
        info!(
            "Listening for blocks on {} via {} every {:?}",
            network,
            self.provider.name(),
            interval
        );
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        self.provider.stop_block_events().await?;
        self.store.dispatch(Action::ExplorerStopped)?;
        Ok(())
    }
}
