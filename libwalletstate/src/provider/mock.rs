//! Mock provider for testing
//!
//! Configurable failures, fixed transaction counts and call counters, so
//! integration tests can drive the nonce and explorer creators without a
//! node. Available in all builds.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use super::ChainProvider;
use crate::error::{ProviderError, Result};
use crate::types::{Address, Network};

#[derive(Debug, Clone)]
pub struct MockProviderConfig {
    pub name: String,

    /// Whether `start_block_events` should succeed
    pub start_succeeds: bool,

    /// Whether `transaction_count` should succeed
    pub count_succeeds: bool,

    /// Transaction counts keyed by (lowercase address, network); missing
    /// entries report zero
    pub transaction_counts: HashMap<(String, Network), u64>,

    /// Delay before `transaction_count` answers
    pub delay: Duration,

    /// Networks the mock serves; `None` serves every network
    pub networks: Option<Vec<Network>>,

    pub polling_interval: Arc<Mutex<Duration>>,
    pub listening: Arc<Mutex<bool>>,
    pub start_call_count: Arc<Mutex<usize>>,
    pub stop_call_count: Arc<Mutex<usize>>,
    pub count_call_count: Arc<Mutex<usize>>,
}

impl Default for MockProviderConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            start_succeeds: true,
            count_succeeds: true,
            transaction_counts: HashMap::new(),
            delay: Duration::from_millis(0),
            networks: None,
            polling_interval: Arc::new(Mutex::new(Duration::from_secs(15))),
            listening: Arc::new(Mutex::new(false)),
            start_call_count: Arc::new(Mutex::new(0)),
            stop_call_count: Arc::new(Mutex::new(0)),
            count_call_count: Arc::new(Mutex::new(0)),
        }
    }
}

pub struct MockProvider {
    config: MockProviderConfig,
}

impl MockProvider {
    pub fn new(config: MockProviderConfig) -> Self {
        Self { config }
    }

    pub fn success() -> Self {
        Self::new(MockProviderConfig::default())
    }

    /// Mock whose block subscription fails
    pub fn start_failure() -> Self {
        Self::new(MockProviderConfig {
            start_succeeds: false,
            ..Default::default()
        })
    }

    /// Mock whose transaction-count RPC fails
    pub fn count_failure() -> Self {
        Self::new(MockProviderConfig {
            count_succeeds: false,
            ..Default::default()
        })
    }

    /// Mock reporting `count` transactions for `address` on `network`
    pub fn with_transaction_count(address: &Address, network: Network, count: u64) -> Self {
        let mut config = MockProviderConfig::default();
        config
            .transaction_counts
            .insert((address.key(), network), count);
        Self::new(config)
    }

    /// Mock whose transaction-count RPC takes `delay` to answer
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.config.delay = delay;
        self
    }

    /// Restrict the mock to `networks`; calls for any other network fail
    /// with `ProviderError::UnsupportedNetwork`
    pub fn with_networks(mut self, networks: &[Network]) -> Self {
        self.config.networks = Some(networks.to_vec());
        self
    }

    fn check_network(&self, network: Network) -> Result<()> {
        match &self.config.networks {
            Some(networks) if !networks.contains(&network) => {
                Err(ProviderError::UnsupportedNetwork(network.to_string()).into())
            }
            _ => Ok(()),
        }
    }

    pub fn is_listening(&self) -> bool {
        *self.config.listening.lock().unwrap()
    }

    pub fn start_call_count(&self) -> usize {
        *self.config.start_call_count.lock().unwrap()
    }

    pub fn stop_call_count(&self) -> usize {
        *self.config.stop_call_count.lock().unwrap()
    }

    pub fn count_call_count(&self) -> usize {
        *self.config.count_call_count.lock().unwrap()
    }
}

#[async_trait]
impl ChainProvider for MockProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn polling_interval(&self) -> Duration {
        *self.config.polling_interval.lock().unwrap()
    }

    fn set_polling_interval(&self, interval: Duration) {
        *self.config.polling_interval.lock().unwrap() = interval;
    }

    async fn start_block_events(&self, network: Network) -> Result<()> {
        *self.config.start_call_count.lock().unwrap() += 1;
        self.check_network(network)?;

        if !self.config.start_succeeds {
            return Err(ProviderError::Subscription("mock subscription refused".to_string()).into());
        }
        *self.config.listening.lock().unwrap() = true;
        Ok(())
    }

    async fn stop_block_events(&self) -> Result<()> {
        *self.config.stop_call_count.lock().unwrap() += 1;
        *self.config.listening.lock().unwrap() = false;
        Ok(())
    }

    async fn transaction_count(&self, address: &Address, network: Network) -> Result<u64> {
        *self.config.count_call_count.lock().unwrap() += 1;

        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }

        self.check_network(network)?;
        if !self.config.count_succeeds {
            return Err(ProviderError::Rpc("mock eth_getTransactionCount failed".to_string()).into());
        }

        Ok(self
            .config
            .transaction_counts
            .get(&(address.key(), network))
            .copied()
            .unwrap_or(0))
    }
}
