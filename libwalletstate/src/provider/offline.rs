use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use super::ChainProvider;
use crate::error::Result;
use crate::types::{Address, Network};

/// Provider used when no RPC endpoint is wired in
///
/// Listening always succeeds and every account reports zero transactions.
#[derive(Debug)]
pub struct OfflineProvider {
    polling_interval_ms: AtomicU64,
    listening: AtomicBool,
}

impl OfflineProvider {
    pub fn new(polling_interval: Duration) -> Self {
        Self {
            polling_interval_ms: AtomicU64::new(polling_interval.as_millis() as u64),
            listening: AtomicBool::new(false),
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }
}

impl Default for OfflineProvider {
    fn default() -> Self {
        Self::new(Duration::from_secs(15))
    }
}

#[async_trait]
impl ChainProvider for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms.load(Ordering::SeqCst))
    }

    fn set_polling_interval(&self, interval: Duration) {
        self.polling_interval_ms
            .store(interval.as_millis() as u64, Ordering::SeqCst);
    }

    async fn start_block_events(&self, network: Network) -> Result<()> {
        tracing::debug!("offline provider: block events for {} are a no-op", network);
        self.listening.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop_block_events(&self) -> Result<()> {
        self.listening.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn transaction_count(&self, _address: &Address, _network: Network) -> Result<u64> {
        Ok(0)
    }
}
